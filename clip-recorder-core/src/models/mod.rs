pub mod audio_models;
pub mod clip;
pub mod config;
pub mod error;
pub mod state;
