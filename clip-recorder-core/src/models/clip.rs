use chrono::{DateTime, TimeZone, Utc};

/// One delivery of interleaved little-endian PCM from the audio backend.
///
/// Always an owned copy: the backend may reuse its buffer as soon as the
/// callback returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    data: Vec<u8>,
    sample_count: usize,
}

impl RawFrame {
    /// Copy `data`, which holds `sample_count` interleaved sample frames.
    pub fn copy_from(data: &[u8], sample_count: usize) -> Self {
        Self {
            data: data.to_vec(),
            sample_count,
        }
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Sample frames (per channel) carried by this delivery.
    pub fn sample_count(&self) -> usize {
        self.sample_count
    }
}

/// Frames accumulated for one output clip.
///
/// Owned by exactly one pipeline stage at a time: the capture callback while
/// filling, then the queue, then the disk writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClipBuffer {
    frames: Vec<RawFrame>,
    sample_count: usize,
    completed_at: Option<DateTime<Utc>>,
}

impl ClipBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, frame: RawFrame) {
        self.sample_count += frame.sample_count();
        self.frames.push(frame);
    }

    pub fn sample_count(&self) -> usize {
        self.sample_count
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[RawFrame] {
        &self.frames
    }

    /// Stamp the moment the clip reached its threshold. Output paths are
    /// derived from this, not from the time of writing.
    ///
    /// Stored as UTC: the capture callback must not consult the local zone.
    pub fn seal<Tz: TimeZone>(&mut self, at: DateTime<Tz>) {
        self.completed_at = Some(at.with_timezone(&Utc));
    }

    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Total payload size in bytes.
    pub fn byte_len(&self) -> usize {
        self.frames.iter().map(|f| f.data().len()).sum()
    }

    /// Concatenate all frames into one contiguous payload.
    pub fn to_payload(&self) -> Vec<u8> {
        let mut payload = Vec::with_capacity(self.byte_len());
        for frame in &self.frames {
            payload.extend_from_slice(frame.data());
        }
        payload
    }
}
