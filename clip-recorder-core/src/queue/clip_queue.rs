use std::time::Duration;

use crossbeam_channel::{bounded, Receiver, SendTimeoutError, Sender, TrySendError};

use crate::models::clip::ClipBuffer;
use crate::models::error::RecorderError;

/// One entry of the clip queue.
#[derive(Debug)]
pub enum QueueItem {
    Clip(ClipBuffer),
    /// No more clips follow; the writer exits after seeing this.
    Shutdown,
}

impl QueueItem {
    pub fn into_clip(self) -> Option<ClipBuffer> {
        match self {
            Self::Clip(clip) => Some(clip),
            Self::Shutdown => None,
        }
    }
}

/// Why a non-blocking push did not happen. The clip is handed back.
#[derive(Debug)]
pub enum TryPushError {
    Full(ClipBuffer),
    Closed(ClipBuffer),
}

/// Create a bounded FIFO clip queue of `capacity` entries.
///
/// The sentinel occupies a slot like any clip, so it lands behind whatever is
/// already queued.
pub fn clip_queue(capacity: usize) -> (ClipSender, ClipReceiver) {
    let (tx, rx) = bounded(capacity.max(1));
    (ClipSender { tx }, ClipReceiver { rx })
}

/// Producer half. Cheap to clone; one clone lives in each capture callback.
#[derive(Debug, Clone)]
pub struct ClipSender {
    tx: Sender<QueueItem>,
}

impl ClipSender {
    /// Non-blocking push for the audio-delivery path.
    pub fn try_push(&self, clip: ClipBuffer) -> Result<(), TryPushError> {
        self.tx
            .try_send(QueueItem::Clip(clip))
            .map_err(|err| match err {
                TrySendError::Full(item) => TryPushError::Full(item.into_clip().unwrap_or_default()),
                TrySendError::Disconnected(item) => {
                    TryPushError::Closed(item.into_clip().unwrap_or_default())
                }
            })
    }

    /// Enqueue the shutdown sentinel, waiting up to `timeout` for a free slot.
    ///
    /// Returns `Ok(false)` on timeout so the caller can re-check the consumer
    /// before waiting again.
    pub fn push_shutdown(&self, timeout: Duration) -> Result<bool, RecorderError> {
        match self.tx.send_timeout(QueueItem::Shutdown, timeout) {
            Ok(()) => Ok(true),
            Err(SendTimeoutError::Timeout(_)) => Ok(false),
            Err(SendTimeoutError::Disconnected(_)) => Err(RecorderError::QueueClosed),
        }
    }

    pub fn len(&self) -> usize {
        self.tx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.tx.capacity().unwrap_or(0)
    }
}

/// Consumer half, owned by the disk writer.
#[derive(Debug)]
pub struct ClipReceiver {
    rx: Receiver<QueueItem>,
}

impl ClipReceiver {
    /// Block until an item is available. `None` once every sender is gone
    /// and the queue is empty.
    pub fn pop(&self) -> Option<QueueItem> {
        self.rx.recv().ok()
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
