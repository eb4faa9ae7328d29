//! WAV file format utilities.
//!
//! Generates the standard 44-byte RIFF header for uncompressed PCM. Clips
//! are written in one pass with the payload size known up front, so the
//! header never needs patching afterwards.

use crate::models::audio_models::SampleWidth;
use crate::models::config::AudioSettings;
use crate::models::error::RecorderError;

/// Size of the standard WAV RIFF header in bytes.
pub const WAV_HEADER_SIZE: usize = 44;

/// Largest payload whose sizes still fit the 32-bit RIFF fields.
pub const MAX_DATA_SIZE: u64 = u32::MAX as u64 - 36;

/// Channel layout, rate and sample width of a PCM payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PcmFormat {
    pub sample_rate: u32,
    pub channels: u16,
    pub sample_width: SampleWidth,
}

impl PcmFormat {
    pub fn bits_per_sample(&self) -> u16 {
        self.sample_width.bits()
    }

    /// Bytes per interleaved frame, `None` if it does not fit the u16 field.
    pub fn block_align(&self) -> Option<u16> {
        self.channels.checked_mul(self.sample_width.bytes() as u16)
    }

    /// Bytes per second, `None` if it does not fit the u32 field.
    pub fn byte_rate(&self) -> Option<u32> {
        self.block_align()
            .and_then(|align| self.sample_rate.checked_mul(u32::from(align)))
    }

    /// Whether every header field is representable.
    pub fn validate(&self) -> Result<(), String> {
        if self.channels == 0 || self.sample_rate == 0 {
            return Err("channels and sample rate must be positive".into());
        }
        if self.byte_rate().is_none() {
            return Err(format!(
                "{} Hz x {} ch x {} bytes exceeds the WAV byte-rate field",
                self.sample_rate,
                self.channels,
                self.sample_width.bytes()
            ));
        }
        Ok(())
    }
}

impl From<&AudioSettings> for PcmFormat {
    fn from(audio: &AudioSettings) -> Self {
        Self {
            sample_rate: audio.rate,
            channels: audio.channels,
            sample_width: audio.sample_width,
        }
    }
}

/// Generate a 44-byte WAV RIFF header.
///
/// Format: PCM (format code 1), little-endian.
///
/// Layout:
/// ```text
/// [0-3]    "RIFF"
/// [4-7]    36 + data_size
/// [8-11]   "WAVE"
/// [12-15]  "fmt "
/// [16-19]  16 (PCM format chunk size)
/// [20-21]  1 (PCM format code)
/// [22-23]  channels
/// [24-27]  sample_rate
/// [28-31]  byte_rate = sample_rate * block_align
/// [32-33]  block_align = channels * bytes_per_sample
/// [34-35]  bits_per_sample
/// [36-39]  "data"
/// [40-43]  data_size
/// ```
///
/// Fails with `Storage` when a size or rate field would overflow.
pub fn generate_wav_header(
    format: &PcmFormat,
    data_size: u32,
) -> Result<[u8; WAV_HEADER_SIZE], RecorderError> {
    let chunk_size = data_size
        .checked_add(36)
        .ok_or_else(|| RecorderError::Storage(format!("data size {} too large", data_size)))?;
    format.validate().map_err(RecorderError::Storage)?;
    let block_align = format.block_align().unwrap_or_default();
    let byte_rate = format.byte_rate().unwrap_or_default();

    let mut header = [0u8; WAV_HEADER_SIZE];

    // RIFF chunk descriptor
    header[0..4].copy_from_slice(b"RIFF");
    header[4..8].copy_from_slice(&chunk_size.to_le_bytes());
    header[8..12].copy_from_slice(b"WAVE");

    // fmt sub-chunk
    header[12..16].copy_from_slice(b"fmt ");
    header[16..20].copy_from_slice(&16u32.to_le_bytes());
    header[20..22].copy_from_slice(&1u16.to_le_bytes());
    header[22..24].copy_from_slice(&format.channels.to_le_bytes());
    header[24..28].copy_from_slice(&format.sample_rate.to_le_bytes());
    header[28..32].copy_from_slice(&byte_rate.to_le_bytes());
    header[32..34].copy_from_slice(&block_align.to_le_bytes());
    header[34..36].copy_from_slice(&format.bits_per_sample().to_le_bytes());

    // data sub-chunk
    header[36..40].copy_from_slice(b"data");
    header[40..44].copy_from_slice(&data_size.to_le_bytes());

    Ok(header)
}
