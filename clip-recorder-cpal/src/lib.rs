//! # clip-recorder-cpal
//!
//! Cross-platform input backend for clip-recorder, built on `cpal`.
//!
//! Provides:
//! - `CpalProvider`: device enumeration and stream opening on the default host
//! - `CpalStream`: one running input stream, reporting device removal
//!
//! ## Usage
//! ```ignore
//! use clip_recorder_core::{RecorderConfig, ShutdownSignal, Supervisor};
//! use clip_recorder_cpal::CpalProvider;
//!
//! let config = RecorderConfig::load("config.yaml".as_ref())?;
//! let mut supervisor = Supervisor::new(config, CpalProvider::new, ShutdownSignal::new())?;
//! let report = supervisor.run()?;
//! ```

pub mod device_enumerator;
pub mod input_stream;

pub use device_enumerator::CpalProvider;
pub use input_stream::CpalStream;
