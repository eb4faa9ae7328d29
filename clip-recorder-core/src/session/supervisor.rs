use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use log::Level;

use crate::models::audio_models::{CaptureDiagnostics, InputDevice};
use crate::models::config::RecorderConfig;
use crate::models::error::RecorderError;
use crate::models::state::SessionState;
use crate::processing::wav_format::PcmFormat;
use crate::queue::clip_queue::{clip_queue, ClipSender};
use crate::session::capture_session::CaptureSession;
use crate::session::device_locator::DeviceLocator;
use crate::session::shutdown::ShutdownSignal;
use crate::storage::disk_writer::{DiskWriter, WriterStats};
use crate::storage::paths::ClipLayout;
use crate::traits::capture_provider::ProviderFactory;

/// How often a streaming session is checked for liveness.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Every Nth consecutive miss is logged at info instead of debug.
const NOT_FOUND_REMINDER_EVERY: u32 = 12;

/// Slice used while waiting for room for the shutdown sentinel.
const SENTINEL_WAIT: Duration = Duration::from_millis(200);

/// Totals for one supervisor run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    pub sessions_started: u64,
    pub frames_received: u64,
    pub clips_enqueued: u64,
    pub clips_dropped: u64,
    pub notices_lost: u64,
    pub writer: WriterStats,
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} session(s), {} frames, {} clips enqueued, {} dropped, {} written ({} bytes), {} write failure(s)",
            self.sessions_started,
            self.frames_received,
            self.clips_enqueued,
            self.clips_dropped,
            self.writer.clips_written,
            self.writer.bytes_written,
            self.writer.write_failures
        )
    }
}

/// Outer control loop: find the device, stream from it, start over when it
/// goes away, and drain the disk writer on shutdown.
///
/// ```text
/// [ProviderFactory] → [DeviceLocator] → [CaptureSession] → [ClipQueue] → [DiskWriter]
///         ↑                                   │
///         └──── recoverable failure ──────────┘
/// ```
///
/// Owns the clip queue and the writer thread for the whole run. A provider
/// is acquired per search and released when that search, or the session it
/// started, ends.
pub struct Supervisor<F: ProviderFactory> {
    config: RecorderConfig,
    factory: F,
    shutdown: ShutdownSignal,
    poll_interval: Duration,
    retry_interval: Duration,
    state: SessionState,
    diagnostics: Arc<CaptureDiagnostics>,
    sessions_started: u64,
}

impl<F: ProviderFactory> Supervisor<F> {
    pub fn new(
        config: RecorderConfig,
        factory: F,
        shutdown: ShutdownSignal,
    ) -> Result<Self, RecorderError> {
        config.validate()?;
        let retry_interval = config.audio.retry_interval();
        Ok(Self {
            config,
            factory,
            shutdown,
            poll_interval: DEFAULT_POLL_INTERVAL,
            retry_interval,
            state: SessionState::Searching,
            diagnostics: Arc::new(CaptureDiagnostics::default()),
            sessions_started: 0,
        })
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_retry_interval(mut self, interval: Duration) -> Self {
        self.retry_interval = interval;
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn diagnostics(&self) -> Arc<CaptureDiagnostics> {
        Arc::clone(&self.diagnostics)
    }

    /// Record until shutdown is requested, then flush every queued clip.
    ///
    /// Returns an error only for failures that make further recording
    /// pointless: a dead disk writer or an unrecoverable backend error.
    pub fn run(&mut self) -> Result<RunReport, RecorderError> {
        let (queue, receiver) = clip_queue(self.config.audio.max_queue_size);
        let layout = ClipLayout::from_config(&self.config);
        log::info!(
            "Recording '{}' clips of {}s into {}",
            self.config.audio.device_match,
            self.config.audio.duration_sec,
            layout.root().display()
        );
        let writer = DiskWriter::spawn(receiver, layout, PcmFormat::from(&self.config.audio))?;

        self.state = SessionState::Searching;
        let outcome = self.supervise(&queue, &writer);
        self.state = SessionState::Shutdown;

        match outcome {
            Ok(()) => self.finish(queue, writer),
            Err(e) => {
                log::error!("Supervisor stopping: {}", e);
                drop(queue);
                if let Err(join_err) = writer.join() {
                    log::error!("Disk writer did not exit cleanly: {}", join_err);
                }
                Err(e)
            }
        }
    }

    fn supervise(&mut self, queue: &ClipSender, writer: &DiskWriter) -> Result<(), RecorderError> {
        let locator = DeviceLocator::new(self.config.audio.device_match.clone());
        let mut misses: u32 = 0;

        while !self.shutdown.is_requested() {
            ensure_writer(writer)?;

            let found = match self.factory.acquire() {
                Ok(provider) => locator.locate(&provider).map(|device| (provider, device)),
                Err(e) => {
                    log::debug!("Audio subsystem unavailable: {}", e);
                    None
                }
            };

            let Some((provider, device)) = found else {
                misses += 1;
                self.log_not_found(&locator, misses);
                if self.shutdown.wait(self.retry_interval) {
                    break;
                }
                continue;
            };

            if misses > 0 {
                log::info!("Found {} after {} failed search(es)", device, misses);
            }
            misses = 0;

            match self.stream(&provider, device, queue, writer) {
                Ok(()) => {}
                Err(e) if e.is_recoverable() => {
                    self.state = SessionState::Searching;
                    log::warn!(
                        "Stream error: {}. Searching again in {:?}",
                        e,
                        self.retry_interval
                    );
                    if self.shutdown.wait(self.retry_interval) {
                        break;
                    }
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Stream from `device` until shutdown (`Ok`) or failure (`Err`).
    /// The session is closed before this returns.
    fn stream(
        &mut self,
        provider: &F::Provider,
        device: InputDevice,
        queue: &ClipSender,
        writer: &DiskWriter,
    ) -> Result<(), RecorderError> {
        let session = CaptureSession::start(
            provider,
            device,
            &self.config.audio,
            queue.clone(),
            Arc::clone(&self.diagnostics),
        )?;
        self.sessions_started += 1;
        self.state = SessionState::Streaming {
            device_index: session.device().index,
        };
        log::debug!("State: {}", self.state.label());

        while !self.shutdown.wait(self.poll_interval) {
            session.report_notices();
            ensure_writer(writer)?;
            session.check()?;
        }
        session.report_notices();
        Ok(())
    }

    fn log_not_found(&self, locator: &DeviceLocator, misses: u32) {
        match not_found_level(misses) {
            Level::Warn => log::warn!(
                "No input device matching '{}', retrying every {:?}",
                locator.device_match(),
                self.retry_interval
            ),
            level => log::log!(
                level,
                "Still searching for '{}' ({} attempts)",
                locator.device_match(),
                misses
            ),
        }
    }

    /// Queue the sentinel behind any pending clips and wait for the writer.
    fn finish(&self, queue: ClipSender, writer: DiskWriter) -> Result<RunReport, RecorderError> {
        if queue.is_empty() {
            log::info!("Shutting down, clip queue empty");
        } else {
            log::info!(
                "Shutting down, {} of {} queued clip(s) waiting for the disk writer",
                queue.len(),
                queue.capacity()
            );
        }
        while writer.is_alive() {
            match queue.push_shutdown(SENTINEL_WAIT) {
                Ok(true) => break,
                Ok(false) => continue,
                Err(e) => {
                    log::error!("Could not queue shutdown: {}", e);
                    break;
                }
            }
        }
        drop(queue);

        let writer_stats = writer.join()?;
        Ok(RunReport {
            sessions_started: self.sessions_started,
            frames_received: self.diagnostics.frames_received(),
            clips_enqueued: self.diagnostics.clips_enqueued(),
            clips_dropped: self.diagnostics.clips_dropped(),
            notices_lost: self.diagnostics.notices_lost(),
            writer: writer_stats,
        })
    }
}

/// Loud on the first miss of a search, quiet after that, with a periodic
/// reminder.
fn not_found_level(misses: u32) -> Level {
    if misses <= 1 {
        Level::Warn
    } else if misses % NOT_FOUND_REMINDER_EVERY == 0 {
        Level::Info
    } else {
        Level::Debug
    }
}

fn ensure_writer(writer: &DiskWriter) -> Result<(), RecorderError> {
    if writer.is_alive() {
        return Ok(());
    }
    log::error!("Disk writer thread has exited");
    Err(RecorderError::WriterStopped)
}
