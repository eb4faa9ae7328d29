//! Running `cpal` input stream feeding the core frame callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cpal::traits::{DeviceTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, SizedSample, StreamConfig, StreamError};
use parking_lot::Mutex;

use clip_recorder_core::models::audio_models::{SampleWidth, StreamNotice};
use clip_recorder_core::models::config::AudioSettings;
use clip_recorder_core::models::error::RecorderError;
use clip_recorder_core::processing::notice_board::NoticeBoard;
use clip_recorder_core::traits::capture_provider::{FrameCallback, InputStream};

/// Reason the stream stopped delivering audio, set from the error callback.
type FailureSlot = Arc<Mutex<Option<String>>>;

/// Detects a stream that has silently stopped calling back.
///
/// The data callback bumps `delivered`; each `check` compares it with the
/// value seen at the previous check. The first check only records a
/// baseline. Must be polled less often than the device's buffer period.
#[derive(Debug)]
struct DeliveryWatch {
    delivered: Arc<AtomicU64>,
    last_seen: AtomicU64,
}

const NOT_YET_CHECKED: u64 = u64::MAX;

impl DeliveryWatch {
    fn new() -> Self {
        Self {
            delivered: Arc::new(AtomicU64::new(0)),
            last_seen: AtomicU64::new(NOT_YET_CHECKED),
        }
    }

    fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.delivered)
    }

    fn check(&self) -> Result<(), RecorderError> {
        let now = self.delivered.load(Ordering::Relaxed);
        let previous = self.last_seen.swap(now, Ordering::Relaxed);
        if previous == now {
            return Err(RecorderError::StreamFailed(
                "no audio delivered since the last check".into(),
            ));
        }
        Ok(())
    }
}

/// One open input stream. Dropping it stops capture.
pub struct CpalStream {
    _stream: cpal::Stream,
    failure: FailureSlot,
    watch: DeliveryWatch,
}

impl CpalStream {
    /// Build and start a stream delivering the configured sample width.
    ///
    /// | width | cpal sample | WAV encoding      |
    /// |-------|-------------|-------------------|
    /// | 1     | `u8`        | unsigned 8-bit    |
    /// | 2     | `i16`       | signed 16-bit LE  |
    /// | 4     | `i32`       | signed 32-bit LE  |
    pub fn open(
        device: &cpal::Device,
        audio: &AudioSettings,
        on_frame: FrameCallback,
        notices: Arc<NoticeBoard>,
    ) -> Result<Self, RecorderError> {
        let config = StreamConfig {
            channels: audio.channels,
            sample_rate: SampleRate(audio.rate),
            buffer_size: BufferSize::Default,
        };
        let failure: FailureSlot = Arc::new(Mutex::new(None));
        let watch = DeliveryWatch::new();
        let channels = usize::from(audio.channels);
        let sink = FrameSink {
            on_frame,
            channels,
            delivered: watch.counter(),
        };

        let stream = match audio.sample_width {
            SampleWidth::One => {
                build::<u8>(device, &config, sink, Arc::clone(&failure), notices)
            }
            SampleWidth::Two => {
                build::<i16>(device, &config, sink, Arc::clone(&failure), notices)
            }
            SampleWidth::Four => {
                build::<i32>(device, &config, sink, Arc::clone(&failure), notices)
            }
        }
        .map_err(|e| RecorderError::StreamFailed(format!("cannot open input stream: {}", e)))?;

        stream
            .play()
            .map_err(|e| RecorderError::StreamFailed(format!("cannot start input stream: {}", e)))?;

        Ok(Self {
            _stream: stream,
            failure,
            watch,
        })
    }
}

impl InputStream for CpalStream {
    fn check(&self) -> Result<(), RecorderError> {
        if let Some(reason) = self.failure.lock().as_ref() {
            return Err(RecorderError::StreamFailed(reason.clone()));
        }
        self.watch.check()
    }
}

/// Everything the data callback owns.
struct FrameSink {
    on_frame: FrameCallback,
    channels: usize,
    delivered: Arc<AtomicU64>,
}

fn build<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut sink: FrameSink,
    failure: FailureSlot,
    notices: Arc<NoticeBoard>,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample + PcmSample,
{
    let mut scratch: Vec<u8> = Vec::new();
    device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            sink.delivered.fetch_add(1, Ordering::Relaxed);
            encode_le(data, &mut scratch);
            (sink.on_frame)(&scratch, data.len() / sink.channels.max(1));
        },
        move |err| handle_stream_error(err, &failure, &notices),
        None,
    )
}

/// Device removal ends the stream; anything else is only reported. A host
/// that reports removal some other way is caught by `DeliveryWatch`.
fn handle_stream_error(err: StreamError, failure: &FailureSlot, notices: &NoticeBoard) {
    match err {
        StreamError::DeviceNotAvailable => {
            failure
                .lock()
                .get_or_insert_with(|| "input device no longer available".to_string());
        }
        other => notices.record(StreamNotice::Backend(other.to_string())),
    }
}

/// Sample types the stream can deliver, with their WAV byte encoding.
trait PcmSample: Copy {
    fn write_le(self, out: &mut Vec<u8>);
}

impl PcmSample for u8 {
    fn write_le(self, out: &mut Vec<u8>) {
        out.push(self);
    }
}

impl PcmSample for i16 {
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

impl PcmSample for i32 {
    fn write_le(self, out: &mut Vec<u8>) {
        out.extend_from_slice(&self.to_le_bytes());
    }
}

/// Replace `out` with the little-endian encoding of `samples`.
fn encode_le<T: PcmSample>(samples: &[T], out: &mut Vec<u8>) {
    out.clear();
    out.reserve(std::mem::size_of_val(samples));
    for &sample in samples {
        sample.write_le(out);
    }
}
