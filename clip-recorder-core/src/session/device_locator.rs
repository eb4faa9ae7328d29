use crate::models::audio_models::InputDevice;
use crate::traits::capture_provider::CaptureProvider;

/// Finds the configured input device by name substring.
///
/// Stateless between calls: every `locate` enumerates afresh, since devices
/// come and go with hot-plug.
#[derive(Debug, Clone)]
pub struct DeviceLocator {
    device_match: String,
}

impl DeviceLocator {
    pub fn new(device_match: impl Into<String>) -> Self {
        Self {
            device_match: device_match.into(),
        }
    }

    pub fn device_match(&self) -> &str {
        &self.device_match
    }

    /// First device whose name contains the match string and that has at
    /// least one input channel. Enumeration errors count as "not found".
    pub fn locate<P: CaptureProvider + ?Sized>(&self, provider: &P) -> Option<InputDevice> {
        match provider.input_devices() {
            Ok(devices) => self.select(devices),
            Err(e) => {
                log::debug!("Device enumeration failed: {}", e);
                None
            }
        }
    }

    pub fn select(&self, devices: Vec<InputDevice>) -> Option<InputDevice> {
        devices.into_iter().find(|d| self.matches(d))
    }

    pub fn matches(&self, device: &InputDevice) -> bool {
        device.max_input_channels > 0 && device.name.contains(&self.device_match)
    }
}
