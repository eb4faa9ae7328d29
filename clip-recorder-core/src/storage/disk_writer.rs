use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use chrono::Local;

use crate::models::clip::ClipBuffer;
use crate::models::error::RecorderError;
use crate::processing::wav_format::PcmFormat;
use crate::queue::clip_queue::{ClipReceiver, QueueItem};
use crate::storage::paths::ClipLayout;
use crate::storage::wav_writer;

/// Counters maintained by the writer thread.
#[derive(Debug, Default)]
struct WriterCounters {
    clips_written: AtomicU64,
    bytes_written: AtomicU64,
    write_failures: AtomicU64,
}

/// Snapshot of the writer's progress.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriterStats {
    pub clips_written: u64,
    pub bytes_written: u64,
    pub write_failures: u64,
}

/// The single consumer of the clip queue and the only component that
/// touches the file system.
///
/// Clips are written synchronously, one at a time, in queue order. A failed
/// write is logged and skipped; only the shutdown sentinel (or every sender
/// going away) ends the loop.
pub struct DiskWriter {
    handle: Option<thread::JoinHandle<()>>,
    counters: Arc<WriterCounters>,
}

impl DiskWriter {
    pub fn spawn(
        receiver: ClipReceiver,
        layout: ClipLayout,
        format: PcmFormat,
    ) -> Result<Self, RecorderError> {
        let counters = Arc::new(WriterCounters::default());
        let thread_counters = Arc::clone(&counters);

        let handle = thread::Builder::new()
            .name("clip-disk-writer".into())
            .spawn(move || writer_loop(receiver, layout, format, thread_counters))
            .map_err(|e| RecorderError::Unknown(format!("failed to spawn writer thread: {}", e)))?;

        Ok(Self {
            handle: Some(handle),
            counters,
        })
    }

    /// Whether the writer thread is still running.
    pub fn is_alive(&self) -> bool {
        self.handle.as_ref().map_or(false, |h| !h.is_finished())
    }

    pub fn stats(&self) -> WriterStats {
        WriterStats {
            clips_written: self.counters.clips_written.load(Ordering::Relaxed),
            bytes_written: self.counters.bytes_written.load(Ordering::Relaxed),
            write_failures: self.counters.write_failures.load(Ordering::Relaxed),
        }
    }

    /// Wait for the writer thread to exit.
    ///
    /// Returns `WriterStopped` if the thread panicked.
    pub fn join(mut self) -> Result<WriterStats, RecorderError> {
        if let Some(handle) = self.handle.take() {
            handle.join().map_err(|_| RecorderError::WriterStopped)?;
        }
        Ok(self.stats())
    }
}

fn writer_loop(
    receiver: ClipReceiver,
    layout: ClipLayout,
    format: PcmFormat,
    counters: Arc<WriterCounters>,
) {
    log::debug!("Disk writer started, root {}", layout.root().display());
    loop {
        let clip = match receiver.pop() {
            Some(QueueItem::Clip(clip)) => clip,
            Some(QueueItem::Shutdown) => {
                if !receiver.is_empty() {
                    log::warn!(
                        "{} item(s) queued behind the shutdown sentinel, discarding",
                        receiver.len()
                    );
                }
                log::info!("Disk writer received shutdown, exiting");
                break;
            }
            None => {
                log::warn!("Clip queue closed without shutdown sentinel, disk writer exiting");
                break;
            }
        };

        match write_clip(&layout, &format, &clip) {
            Ok(path) => {
                counters.clips_written.fetch_add(1, Ordering::Relaxed);
                counters
                    .bytes_written
                    .fetch_add(clip.byte_len() as u64, Ordering::Relaxed);
                log::info!(
                    "Saved {} ({} samples, {} bytes)",
                    path.display(),
                    clip.sample_count(),
                    clip.byte_len()
                );
            }
            Err(e) => {
                counters.write_failures.fetch_add(1, Ordering::Relaxed);
                log::error!("Write failed, skipping clip: {}", e);
            }
        }
    }
}

/// Serialize one clip under the layout's day/hour directory.
pub fn write_clip(
    layout: &ClipLayout,
    format: &PcmFormat,
    clip: &ClipBuffer,
) -> Result<PathBuf, RecorderError> {
    let at = clip
        .completed_at()
        .map_or_else(Local::now, |utc| utc.with_timezone(&Local));
    let dir = layout.directory_for(&at)?;
    let stem = layout.file_stem_for(&at)?;
    wav_writer::write_wav_file(&dir, &stem, format, &clip.to_payload())
}
