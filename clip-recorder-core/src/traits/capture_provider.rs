use std::sync::Arc;

use crate::models::audio_models::InputDevice;
use crate::models::config::AudioSettings;
use crate::models::error::RecorderError;
use crate::processing::notice_board::NoticeBoard;

/// Callback invoked for every buffer the audio backend delivers.
///
/// Parameters:
/// - `data`: Interleaved little-endian PCM in the configured sample width.
/// - `sample_count`: Sample frames (per channel) contained in `data`.
///
/// Runs on a thread owned by the backend: it must return quickly and must
/// not block.
pub type FrameCallback = Box<dyn FnMut(&[u8], usize) + Send + 'static>;

/// A connection to the platform audio subsystem.
///
/// Implemented by:
/// - `CpalProvider` (clip-recorder-cpal)
///
/// A provider is acquired fresh for every device search and dropped when the
/// search or the stream it opened ends, so device topology is never cached
/// across hot-plug events.
pub trait CaptureProvider {
    /// Enumerate every device currently visible to the subsystem.
    fn input_devices(&self) -> Result<Vec<InputDevice>, RecorderError>;

    /// Open and start one input stream on `device`.
    ///
    /// `notices` receives non-fatal status reported by the backend.
    fn open_stream(
        &self,
        device: &InputDevice,
        audio: &AudioSettings,
        on_frame: FrameCallback,
        notices: Arc<NoticeBoard>,
    ) -> Result<Box<dyn InputStream>, RecorderError>;
}

/// An open, running input stream. Dropping it closes the stream.
pub trait InputStream {
    /// `Err(StreamFailed)` once the stream has become inactive, typically
    /// because the device was removed.
    fn check(&self) -> Result<(), RecorderError>;
}

/// Produces a fresh `CaptureProvider` for each device search.
pub trait ProviderFactory {
    type Provider: CaptureProvider;

    fn acquire(&self) -> Result<Self::Provider, RecorderError>;
}

impl<F, P> ProviderFactory for F
where
    F: Fn() -> Result<P, RecorderError>,
    P: CaptureProvider,
{
    type Provider = P;

    fn acquire(&self) -> Result<P, RecorderError> {
        self()
    }
}
