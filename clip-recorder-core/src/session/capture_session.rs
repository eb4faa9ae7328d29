use std::sync::Arc;

use crate::models::audio_models::{CaptureDiagnostics, InputDevice, StreamNotice};
use crate::models::clip::RawFrame;
use crate::models::config::AudioSettings;
use crate::models::error::RecorderError;
use crate::processing::clip_accumulator::ClipAccumulator;
use crate::processing::notice_board::NoticeBoard;
use crate::queue::clip_queue::{ClipSender, TryPushError};
use crate::traits::capture_provider::{CaptureProvider, FrameCallback, InputStream};

/// One open input stream feeding the clip queue.
///
/// Data flow:
/// ```text
/// [backend thread] → on_frame → [ClipAccumulator] → try_push → [ClipQueue]
///                       └──────── status ────────→ [NoticeBoard] → supervisor log
/// ```
/// The session never retries. When the stream fails, `check` reports it and
/// the owner tears the session down. Dropping the session closes the stream
/// and discards the partially filled clip.
pub struct CaptureSession {
    device: InputDevice,
    stream: Box<dyn InputStream>,
    notices: Arc<NoticeBoard>,
    diagnostics: Arc<CaptureDiagnostics>,
}

impl CaptureSession {
    pub fn start<P: CaptureProvider + ?Sized>(
        provider: &P,
        device: InputDevice,
        audio: &AudioSettings,
        queue: ClipSender,
        diagnostics: Arc<CaptureDiagnostics>,
    ) -> Result<Self, RecorderError> {
        let samples_per_clip = audio
            .samples_per_clip()
            .map_err(RecorderError::Configuration)?;
        let notices = Arc::new(NoticeBoard::default());

        let on_frame = frame_handler(
            samples_per_clip,
            queue,
            Arc::clone(&notices),
            Arc::clone(&diagnostics),
        );
        let stream = provider.open_stream(&device, audio, on_frame, Arc::clone(&notices))?;

        log::info!(
            "Capturing from {} ({} Hz, {} ch, {}-bit, {} samples per clip)",
            device,
            audio.rate,
            audio.channels,
            audio.sample_width.bits(),
            samples_per_clip
        );

        Ok(Self {
            device,
            stream,
            notices,
            diagnostics,
        })
    }

    pub fn device(&self) -> &InputDevice {
        &self.device
    }

    /// `Err(StreamFailed)` once the stream is no longer delivering audio.
    pub fn check(&self) -> Result<(), RecorderError> {
        self.stream.check()
    }

    /// Notices recorded since the last drain, plus the count lost to overflow.
    pub fn drain_notices(&self) -> (Vec<StreamNotice>, u64) {
        self.notices.drain()
    }

    /// Log everything recorded on the audio path since the last call.
    pub fn report_notices(&self) {
        let (notices, lost) = self.drain_notices();
        for notice in notices {
            log::warn!("Audio status warning: {}", notice);
        }
        if lost > 0 {
            self.diagnostics.record_notices_lost(lost);
            log::warn!("{} audio status notice(s) lost", lost);
        }
    }
}

/// Build the per-buffer callback run on the backend's delivery thread.
///
/// Owns the accumulator outright; nothing here blocks or logs.
pub fn frame_handler(
    samples_per_clip: usize,
    queue: ClipSender,
    notices: Arc<NoticeBoard>,
    diagnostics: Arc<CaptureDiagnostics>,
) -> FrameCallback {
    let mut accumulator = ClipAccumulator::new(samples_per_clip);
    Box::new(move |data: &[u8], sample_count: usize| {
        diagnostics.record_frame();
        let Some(clip) = accumulator.push(RawFrame::copy_from(data, sample_count)) else {
            return;
        };
        match queue.try_push(clip) {
            Ok(()) => diagnostics.record_enqueued(),
            Err(TryPushError::Full(clip)) => {
                diagnostics.record_dropped();
                notices.record(StreamNotice::QueueFull {
                    sample_count: clip.sample_count(),
                });
            }
            Err(TryPushError::Closed(_)) => {
                diagnostics.record_dropped();
                notices.record(StreamNotice::QueueClosed);
            }
        }
    })
}
