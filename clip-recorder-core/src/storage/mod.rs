pub mod disk_writer;
pub mod paths;
pub mod wav_writer;
