use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::Mutex;

use crate::models::audio_models::StreamNotice;

/// Default number of notices held between two supervisor polls.
pub const DEFAULT_NOTICE_CAPACITY: usize = 64;

/// Bounded hand-off of status notices from the audio-delivery path to the
/// supervisor's logging path.
///
/// `record` never blocks: it uses `try_lock`, and if the lock is contended or
/// the board is full the notice is counted as lost instead. `drain` runs on
/// the supervisor thread once per poll.
#[derive(Debug)]
pub struct NoticeBoard {
    pending: Mutex<Vec<StreamNotice>>,
    capacity: usize,
    lost: AtomicU64,
}

impl NoticeBoard {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            pending: Mutex::new(Vec::with_capacity(capacity)),
            capacity,
            lost: AtomicU64::new(0),
        }
    }

    pub fn record(&self, notice: StreamNotice) {
        match self.pending.try_lock() {
            Some(mut pending) if pending.len() < self.capacity => pending.push(notice),
            _ => {
                self.lost.fetch_add(1, Ordering::Relaxed);
            }
        }
    }

    /// Take every pending notice plus the number lost since the last drain.
    pub fn drain(&self) -> (Vec<StreamNotice>, u64) {
        let notices = std::mem::take(&mut *self.pending.lock());
        let lost = self.lost.swap(0, Ordering::Relaxed);
        (notices, lost)
    }
}

impl Default for NoticeBoard {
    fn default() -> Self {
        Self::new(DEFAULT_NOTICE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_returns_in_record_order() {
        let board = NoticeBoard::new(4);
        board.record(StreamNotice::Backend("xrun".into()));
        board.record(StreamNotice::QueueFull { sample_count: 10 });

        let (notices, lost) = board.drain();
        assert_eq!(
            notices,
            vec![
                StreamNotice::Backend("xrun".into()),
                StreamNotice::QueueFull { sample_count: 10 },
            ]
        );
        assert_eq!(lost, 0);
        assert!(board.drain().0.is_empty());
    }

    #[test]
    fn overflow_is_counted_not_stored() {
        let board = NoticeBoard::new(2);
        for _ in 0..5 {
            board.record(StreamNotice::QueueClosed);
        }
        let (notices, lost) = board.drain();
        assert_eq!(notices.len(), 2);
        assert_eq!(lost, 3);
        assert_eq!(board.drain().1, 0);
    }

    #[test]
    fn contended_record_does_not_block() {
        let board = NoticeBoard::new(4);
        let guard = board.pending.lock();
        board.record(StreamNotice::QueueClosed);
        drop(guard);

        let (notices, lost) = board.drain();
        assert!(notices.is_empty());
        assert_eq!(lost, 1);
    }
}
