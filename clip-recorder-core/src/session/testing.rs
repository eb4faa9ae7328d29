//! Scripted audio backend for exercising the pipeline without hardware.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use parking_lot::Mutex;

use crate::models::audio_models::{InputDevice, StreamNotice};
use crate::models::config::AudioSettings;
use crate::models::error::RecorderError;
use crate::processing::notice_board::NoticeBoard;
use crate::traits::capture_provider::{CaptureProvider, FrameCallback, InputStream};

pub(crate) fn device(index: usize, name: &str, max_input_channels: u16) -> InputDevice {
    InputDevice {
        index,
        name: name.into(),
        max_input_channels,
    }
}

/// What one opened stream does.
#[derive(Debug, Clone)]
pub(crate) struct StreamPlan {
    pub frames: usize,
    pub samples_per_frame: usize,
    /// Report the stream inactive after delivering every frame.
    pub then_fail: bool,
    /// Emit one backend notice before the first frame.
    pub warn: Option<String>,
}

#[derive(Default)]
struct Script {
    enumerations: VecDeque<Result<Vec<InputDevice>, RecorderError>>,
    streams: VecDeque<StreamPlan>,
    opened: Vec<usize>,
}

/// Shared script plus live-stream bookkeeping. Clone it into the factory.
#[derive(Clone, Default)]
pub(crate) struct ScriptedBackend {
    script: Arc<Mutex<Script>>,
    live_streams: Arc<AtomicUsize>,
}

impl ScriptedBackend {
    /// Queue the result of the next enumeration. The last one repeats.
    pub fn enumerate(&self, result: Result<Vec<InputDevice>, RecorderError>) -> &Self {
        self.script.lock().enumerations.push_back(result);
        self
    }

    pub fn stream(&self, plan: StreamPlan) -> &Self {
        self.script.lock().streams.push_back(plan);
        self
    }

    /// Device indices passed to `open_stream`, in order.
    pub fn opened(&self) -> Vec<usize> {
        self.script.lock().opened.clone()
    }

    pub fn live_streams(&self) -> usize {
        self.live_streams.load(Ordering::SeqCst)
    }

    pub fn provider(&self) -> ScriptedProvider {
        ScriptedProvider {
            backend: self.clone(),
        }
    }
}

pub(crate) struct ScriptedProvider {
    backend: ScriptedBackend,
}

impl CaptureProvider for ScriptedProvider {
    fn input_devices(&self) -> Result<Vec<InputDevice>, RecorderError> {
        let mut script = self.backend.script.lock();
        match script.enumerations.len() {
            0 => Ok(Vec::new()),
            1 => script.enumerations[0].clone(),
            _ => script.enumerations.pop_front().unwrap_or(Ok(Vec::new())),
        }
    }

    fn open_stream(
        &self,
        device: &InputDevice,
        audio: &AudioSettings,
        mut on_frame: FrameCallback,
        notices: Arc<NoticeBoard>,
    ) -> Result<Box<dyn InputStream>, RecorderError> {
        let plan = {
            let mut script = self.backend.script.lock();
            script.opened.push(device.index);
            script
                .streams
                .pop_front()
                .ok_or_else(|| RecorderError::StreamFailed("no scripted stream".into()))?
        };

        let failed = Arc::new(AtomicBool::new(false));
        let stop = Arc::new(AtomicBool::new(false));
        let live = Arc::clone(&self.backend.live_streams);
        live.fetch_add(1, Ordering::SeqCst);

        let bytes_per_frame = audio.bytes_per_frame();
        let thread_failed = Arc::clone(&failed);
        let thread_stop = Arc::clone(&stop);
        let handle = thread::spawn(move || {
            if let Some(warning) = plan.warn {
                notices.record(StreamNotice::Backend(warning));
            }
            let mut counter: u8 = 0;
            for _ in 0..plan.frames {
                if thread_stop.load(Ordering::SeqCst) {
                    return;
                }
                let data = vec![counter; plan.samples_per_frame * bytes_per_frame];
                on_frame(&data, plan.samples_per_frame);
                counter = counter.wrapping_add(1);
                thread::sleep(Duration::from_millis(1));
            }
            if plan.then_fail {
                thread_failed.store(true, Ordering::SeqCst);
            }
            while !thread_stop.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(1));
            }
        });

        Ok(Box::new(ScriptedStream {
            failed,
            stop,
            handle: Some(handle),
            live,
        }))
    }
}

struct ScriptedStream {
    failed: Arc<AtomicBool>,
    stop: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
    live: Arc<AtomicUsize>,
}

impl InputStream for ScriptedStream {
    fn check(&self) -> Result<(), RecorderError> {
        if self.failed.load(Ordering::SeqCst) {
            return Err(RecorderError::StreamFailed(
                "stream became inactive, device likely detached".into(),
            ));
        }
        Ok(())
    }
}

impl Drop for ScriptedStream {
    fn drop(&mut self) {
        self.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}
