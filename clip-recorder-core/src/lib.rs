//! # clip-recorder-core
//!
//! Platform-agnostic continuous clip recorder.
//!
//! Captures audio from one input device, cuts it into fixed-length clips and
//! writes each clip as a WAV file under a date/hour directory tree. Survives
//! the device being absent at startup or unplugged mid-capture. Audio
//! backends implement the `CaptureProvider` trait and plug into the generic
//! `Supervisor`.
//!
//! ## Architecture
//!
//! ```text
//! clip-recorder-core (this crate)
//! ├── traits/       ← CaptureProvider, InputStream, ProviderFactory
//! ├── models/       ← RecorderError, SessionState, RecorderConfig, RawFrame, ClipBuffer
//! ├── processing/   ← ClipAccumulator, NoticeBoard, WAV header generation
//! ├── queue/        ← bounded ClipQueue with shutdown sentinel
//! ├── session/      ← DeviceLocator, CaptureSession, Supervisor, ShutdownSignal
//! └── storage/      ← DiskWriter, WAV file writer, output path layout
//! ```

pub mod models;
pub mod processing;
pub mod queue;
pub mod session;
pub mod storage;
pub mod traits;

// Re-export key types at crate root for convenience.
pub use models::audio_models::{CaptureDiagnostics, InputDevice, SampleWidth, StreamNotice};
pub use models::clip::{ClipBuffer, RawFrame};
pub use models::config::{AudioSettings, FormatSettings, LoggingSettings, PathSettings, RecorderConfig};
pub use models::error::RecorderError;
pub use models::state::SessionState;
pub use processing::notice_board::NoticeBoard;
pub use processing::wav_format::PcmFormat;
pub use queue::clip_queue::{clip_queue, ClipReceiver, ClipSender, QueueItem};
pub use session::device_locator::DeviceLocator;
pub use session::shutdown::ShutdownSignal;
pub use session::supervisor::{RunReport, Supervisor};
pub use storage::disk_writer::{DiskWriter, WriterStats};
pub use storage::paths::ClipLayout;
pub use traits::capture_provider::{CaptureProvider, FrameCallback, InputStream, ProviderFactory};
