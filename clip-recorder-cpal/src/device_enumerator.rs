//! Input device enumeration and stream opening via `cpal`.

use std::sync::Arc;

use cpal::traits::{DeviceTrait, HostTrait};

use clip_recorder_core::models::audio_models::InputDevice;
use clip_recorder_core::models::config::AudioSettings;
use clip_recorder_core::models::error::RecorderError;
use clip_recorder_core::processing::notice_board::NoticeBoard;
use clip_recorder_core::traits::capture_provider::{CaptureProvider, FrameCallback, InputStream};

use crate::input_stream::CpalStream;

/// Audio subsystem handle for one device search.
///
/// Wraps the default `cpal::Host`. Device indices are positions in the
/// host's input device list and are only meaningful to the provider that
/// produced them.
pub struct CpalProvider {
    host: cpal::Host,
}

impl CpalProvider {
    pub fn new() -> Result<Self, RecorderError> {
        let host = cpal::default_host();
        log::debug!("Using audio host {:?}", host.id());
        Ok(Self { host })
    }

    fn devices(&self) -> Result<Vec<cpal::Device>, RecorderError> {
        self.host
            .input_devices()
            .map(|devices| devices.collect())
            .map_err(|e| RecorderError::DeviceEnumeration(e.to_string()))
    }
}

impl CaptureProvider for CpalProvider {
    fn input_devices(&self) -> Result<Vec<InputDevice>, RecorderError> {
        let devices = self.devices()?;
        Ok(devices
            .iter()
            .enumerate()
            .map(|(index, device)| InputDevice {
                index,
                name: device
                    .name()
                    .unwrap_or_else(|_| "unknown input device".to_string()),
                max_input_channels: max_input_channels(device),
            })
            .collect())
    }

    fn open_stream(
        &self,
        device: &InputDevice,
        audio: &AudioSettings,
        on_frame: FrameCallback,
        notices: Arc<NoticeBoard>,
    ) -> Result<Box<dyn InputStream>, RecorderError> {
        let cpal_device = self
            .devices()?
            .into_iter()
            .nth(device.index)
            .ok_or_else(|| RecorderError::StreamFailed(format!("{} is gone", device)))?;

        // Topology may have shifted between locate and open.
        let name = cpal_device
            .name()
            .map_err(|e| RecorderError::StreamFailed(e.to_string()))?;
        if name != device.name {
            return Err(RecorderError::StreamFailed(format!(
                "device #{} is now '{}', expected '{}'",
                device.index, name, device.name
            )));
        }

        let stream = CpalStream::open(&cpal_device, audio, on_frame, notices)?;
        Ok(Box::new(stream))
    }
}

/// Largest channel count among the device's supported input configs.
/// Devices that cannot report their configs count as having no inputs.
fn max_input_channels(device: &cpal::Device) -> u16 {
    match device.supported_input_configs() {
        Ok(configs) => configs.map(|c| c.channels()).max().unwrap_or(0),
        Err(e) => {
            log::debug!("Cannot query input configs: {}", e);
            0
        }
    }
}
