use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Deserialize;

/// Bytes per PCM sample.
///
/// 8-bit samples are unsigned (WAV convention), wider samples are signed
/// little-endian integers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
#[serde(try_from = "u16")]
pub enum SampleWidth {
    One,
    #[default]
    Two,
    Four,
}

impl SampleWidth {
    pub fn bytes(self) -> usize {
        match self {
            Self::One => 1,
            Self::Two => 2,
            Self::Four => 4,
        }
    }

    pub fn bits(self) -> u16 {
        self.bytes() as u16 * 8
    }
}

impl TryFrom<u16> for SampleWidth {
    type Error = String;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            4 => Ok(Self::Four),
            other => Err(format!("unsupported sample width: {} bytes", other)),
        }
    }
}

/// An input-capable device as seen by one enumeration pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDevice {
    /// Position in the host's device list. Only meaningful until the
    /// topology changes.
    pub index: usize,
    pub name: String,
    pub max_input_channels: u16,
}

impl fmt::Display for InputDevice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{} '{}'", self.index, self.name)
    }
}

/// Out-of-band condition observed on the audio-delivery path.
///
/// Recorded without blocking and logged later by the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamNotice {
    /// Non-fatal warning reported by the audio backend (overrun, xrun, ...).
    Backend(String),
    /// A completed clip was dropped because the clip queue was full.
    QueueFull { sample_count: usize },
    /// The writer side went away; the clip could not be handed off.
    QueueClosed,
}

impl fmt::Display for StreamNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Backend(msg) => write!(f, "backend status: {}", msg),
            Self::QueueFull { sample_count } => {
                write!(f, "clip queue full, dropped clip of {} samples", sample_count)
            }
            Self::QueueClosed => write!(f, "clip queue closed, clip discarded"),
        }
    }
}

/// Counters shared by every capture session of one supervisor run.
///
/// Updated from the audio-delivery path, so everything is a relaxed atomic.
#[derive(Debug, Default)]
pub struct CaptureDiagnostics {
    frames_received: AtomicU64,
    clips_enqueued: AtomicU64,
    clips_dropped: AtomicU64,
    notices_lost: AtomicU64,
}

impl CaptureDiagnostics {
    pub fn record_frame(&self) {
        self.frames_received.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_enqueued(&self) {
        self.clips_enqueued.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_dropped(&self) {
        self.clips_dropped.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_notices_lost(&self, count: u64) {
        self.notices_lost.fetch_add(count, Ordering::Relaxed);
    }

    pub fn frames_received(&self) -> u64 {
        self.frames_received.load(Ordering::Relaxed)
    }

    pub fn clips_enqueued(&self) -> u64 {
        self.clips_enqueued.load(Ordering::Relaxed)
    }

    pub fn clips_dropped(&self) -> u64 {
        self.clips_dropped.load(Ordering::Relaxed)
    }

    pub fn notices_lost(&self) -> u64 {
        self.notices_lost.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_width_from_bytes() {
        assert_eq!(SampleWidth::try_from(1).unwrap(), SampleWidth::One);
        assert_eq!(SampleWidth::try_from(4).unwrap().bits(), 32);
        assert!(SampleWidth::try_from(3).is_err());
        assert_eq!(SampleWidth::default().bytes(), 2);
    }

    #[test]
    fn notice_messages_are_readable() {
        let notice = StreamNotice::QueueFull { sample_count: 480 };
        assert_eq!(notice.to_string(), "clip queue full, dropped clip of 480 samples");
    }
}
