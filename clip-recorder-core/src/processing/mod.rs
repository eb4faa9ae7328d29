pub mod clip_accumulator;
pub mod notice_board;
pub mod wav_format;
