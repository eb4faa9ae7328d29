use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::audio_models::SampleWidth;
use super::error::RecorderError;
use crate::processing::wav_format::PcmFormat;
use crate::storage::paths::is_valid_pattern;

/// Complete recorder configuration, loaded once at startup.
///
/// Treated as read-only for the lifetime of a run.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RecorderConfig {
    pub audio: AudioSettings,
    pub paths: PathSettings,
    #[serde(default)]
    pub formats: FormatSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

/// Capture parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AudioSettings {
    /// Sample rate in Hz.
    pub rate: u32,

    /// Input channels (1 or 2).
    pub channels: u16,

    /// Length of each output clip in seconds.
    pub duration_sec: u32,

    /// Bytes per sample (1, 2 or 4).
    #[serde(default)]
    pub sample_width: SampleWidth,

    /// Completed clips that may wait for the disk writer.
    #[serde(default = "default_max_queue_size")]
    pub max_queue_size: usize,

    /// Substring matched against input device names.
    pub device_match: String,

    /// Seconds between device searches.
    #[serde(default = "default_retry_sec")]
    pub retry_sec: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PathSettings {
    /// Root of the `<date>/<hour>/<time>.wav` hierarchy.
    pub recordings: PathBuf,

    /// Directory receiving the log file.
    pub logging: PathBuf,
}

/// chrono strftime patterns used to build output paths.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    pub date: String,
    pub hour: String,
    pub time: String,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            date: "%Y-%m-%d".into(),
            hour: "%H".into(),
            time: "%H-%M-%S".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Level filter used when neither the CLI nor `RUST_LOG` set one.
    pub level: String,

    /// Log file name inside `paths.logging`.
    pub file: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".into(),
            file: "app.log".into(),
        }
    }
}

fn default_max_queue_size() -> usize {
    10
}

fn default_retry_sec() -> u32 {
    5
}

impl RecorderConfig {
    /// Read and validate a YAML configuration file.
    pub fn load(path: &Path) -> Result<Self, RecorderError> {
        let raw = fs::read_to_string(path).map_err(|e| {
            RecorderError::Configuration(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&raw)
    }

    /// Parse and validate configuration from YAML text.
    pub fn from_yaml(raw: &str) -> Result<Self, RecorderError> {
        let config: Self = serde_yaml::from_str(raw)
            .map_err(|e| RecorderError::Configuration(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RecorderError> {
        self.audio.validate().map_err(RecorderError::Configuration)?;
        for (name, pattern) in [
            ("date", &self.formats.date),
            ("hour", &self.formats.hour),
            ("time", &self.formats.time),
        ] {
            if pattern.trim().is_empty() {
                return Err(RecorderError::Configuration(format!(
                    "formats.{} must not be empty",
                    name
                )));
            }
            if !is_valid_pattern(pattern) {
                return Err(RecorderError::Configuration(format!(
                    "formats.{} is not a valid strftime pattern: '{}'",
                    name, pattern
                )));
            }
            if pattern.contains('/') || pattern.contains('\\') {
                return Err(RecorderError::Configuration(format!(
                    "formats.{} must not contain path separators",
                    name
                )));
            }
        }
        if self.logging.file.trim().is_empty() {
            return Err(RecorderError::Configuration("logging.file must not be empty".into()));
        }
        Ok(())
    }
}

impl AudioSettings {
    pub fn validate(&self) -> Result<(), String> {
        if self.rate == 0 {
            return Err("sample rate must be positive".into());
        }
        if ![1, 2].contains(&self.channels) {
            return Err(format!("unsupported channel count: {}", self.channels));
        }
        if self.duration_sec == 0 {
            return Err("clip duration must be positive".into());
        }
        if self.max_queue_size == 0 {
            return Err("max_queue_size must be positive".into());
        }
        if self.device_match.is_empty() {
            return Err("device_match must not be empty".into());
        }
        if self.retry_sec == 0 {
            return Err("retry_sec must be positive".into());
        }
        self.samples_per_clip()?;
        PcmFormat::from(self).validate()?;
        Ok(())
    }

    /// Sample frames (per channel) in one clip: `rate × duration_sec`.
    pub fn samples_per_clip(&self) -> Result<usize, String> {
        (self.rate as usize)
            .checked_mul(self.duration_sec as usize)
            .filter(|n| *n > 0)
            .ok_or_else(|| {
                format!(
                    "clip of {}s at {} Hz is not representable",
                    self.duration_sec, self.rate
                )
            })
    }

    /// Bytes in one interleaved sample frame.
    pub fn bytes_per_frame(&self) -> usize {
        self.channels as usize * self.sample_width.bytes()
    }

    pub fn retry_interval(&self) -> Duration {
        Duration::from_secs(u64::from(self.retry_sec))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
audio:
  rate: 44100
  channels: 1
  duration_sec: 60
  device_match: "USB Audio Device"
paths:
  recordings: Recordings
  logging: logs
"#;

    #[test]
    fn parses_with_defaults() {
        let config = RecorderConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.audio.rate, 44100);
        assert_eq!(config.audio.sample_width, SampleWidth::Two);
        assert_eq!(config.audio.max_queue_size, 10);
        assert_eq!(config.audio.retry_sec, 5);
        assert_eq!(config.formats, FormatSettings::default());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.paths.recordings, PathBuf::from("Recordings"));
    }

    #[test]
    fn samples_per_clip_is_rate_times_duration() {
        let config = RecorderConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.audio.samples_per_clip().unwrap(), 44100 * 60);
        assert_eq!(config.audio.bytes_per_frame(), 2);
    }

    #[test]
    fn rejects_three_channels() {
        let raw = SAMPLE.replace("channels: 1", "channels: 3");
        let err = RecorderConfig::from_yaml(&raw).unwrap_err();
        assert!(matches!(err, RecorderError::Configuration(_)));
    }

    #[test]
    fn rejects_unsupported_sample_width() {
        let raw = SAMPLE.replace("channels: 1", "channels: 1\n  sample_width: 3");
        assert!(RecorderConfig::from_yaml(&raw).is_err());
    }

    #[test]
    fn rejects_zero_rate_and_empty_match() {
        let raw = SAMPLE.replace("rate: 44100", "rate: 0");
        assert!(RecorderConfig::from_yaml(&raw).is_err());

        let raw = SAMPLE.replace("\"USB Audio Device\"", "\"\"");
        assert!(RecorderConfig::from_yaml(&raw).is_err());
    }

    #[test]
    fn rejects_missing_section() {
        let raw = "audio:\n  rate: 8000\n";
        assert!(matches!(
            RecorderConfig::from_yaml(raw),
            Err(RecorderError::Configuration(_))
        ));
    }

    #[test]
    fn rejects_separator_in_time_format() {
        let raw = format!("{}formats:\n  time: \"%H/%M\"\n", SAMPLE);
        assert!(RecorderConfig::from_yaml(&raw).is_err());
    }

    #[test]
    fn rejects_unknown_strftime_specifier() {
        let raw = format!("{}formats:\n  date: \"%Q\"\n", SAMPLE);
        assert!(RecorderConfig::from_yaml(&raw).is_err());
    }

    #[test]
    fn missing_file_is_configuration_error() {
        let err = RecorderConfig::load(Path::new("/definitely/not/here.yaml")).unwrap_err();
        assert!(matches!(err, RecorderError::Configuration(_)));
    }

    #[test]
    fn bundled_config_is_valid() {
        let config = RecorderConfig::from_yaml(include_str!("../../../config.yaml")).unwrap();
        assert_eq!(config.audio.samples_per_clip().unwrap(), 44100 * 60);
        assert_eq!(config.logging.file, "app.log");
    }

    #[test]
    fn rejects_byte_rate_beyond_wav_limit() {
        let raw = SAMPLE
            .replace("rate: 44100", "rate: 600000000\n  sample_width: 4")
            .replace("channels: 1", "channels: 2");
        let err = RecorderConfig::from_yaml(&raw).unwrap_err();
        assert!(matches!(err, RecorderError::Configuration(msg) if msg.contains("byte-rate")));
    }
}
