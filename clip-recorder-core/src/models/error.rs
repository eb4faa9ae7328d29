use thiserror::Error;

/// Errors that can occur while recording clips.
///
/// Only `Configuration` and `WriterStopped` are fatal to a run. Everything
/// else is recovered from by the component that observes it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RecorderError {
    #[error("configuration invalid: {0}")]
    Configuration(String),

    #[error("no input device matching '{0}'")]
    DeviceNotFound(String),

    #[error("device enumeration failed: {0}")]
    DeviceEnumeration(String),

    #[error("input stream failed: {0}")]
    StreamFailed(String),

    #[error("clip queue closed")]
    QueueClosed,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("disk writer stopped unexpectedly")]
    WriterStopped,

    #[error("unknown error: {0}")]
    Unknown(String),
}

impl RecorderError {
    /// Whether the supervisor should go back to searching for a device
    /// rather than ending the run.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::DeviceNotFound(_) | Self::DeviceEnumeration(_) | Self::StreamFailed(_)
        )
    }
}
