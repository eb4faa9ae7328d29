use std::mem;

use chrono::Utc;

use crate::models::clip::{ClipBuffer, RawFrame};

/// Accumulates raw frames into clips of a fixed sample length.
///
/// Lives inside the audio-delivery callback and is mutated only there, so it
/// needs no locking. Once the running count reaches the threshold the clip is
/// sealed and handed back to the caller; the next clip starts from zero and
/// any surplus stays with the clip that produced it.
#[derive(Debug)]
pub struct ClipAccumulator {
    samples_per_clip: usize,
    current: ClipBuffer,
}

impl ClipAccumulator {
    pub fn new(samples_per_clip: usize) -> Self {
        Self {
            samples_per_clip: samples_per_clip.max(1),
            current: ClipBuffer::new(),
        }
    }

    /// Append one frame. Returns the completed clip when the threshold is hit.
    pub fn push(&mut self, frame: RawFrame) -> Option<ClipBuffer> {
        self.current.push(frame);
        if self.current.sample_count() < self.samples_per_clip {
            return None;
        }

        let mut clip = mem::take(&mut self.current);
        clip.seal(Utc::now());
        Some(clip)
    }

    /// Samples collected toward the next clip.
    pub fn pending_samples(&self) -> usize {
        self.current.sample_count()
    }

    pub fn samples_per_clip(&self) -> usize {
        self.samples_per_clip
    }
}
