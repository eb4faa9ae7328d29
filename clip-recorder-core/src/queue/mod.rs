pub mod clip_queue;
