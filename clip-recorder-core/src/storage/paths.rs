use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, Local};

use crate::models::config::{FormatSettings, RecorderConfig};
use crate::models::error::RecorderError;

/// Maps a clip timestamp to `<root>/<date>/<hour>/<time>.wav`.
#[derive(Debug, Clone, PartialEq)]
pub struct ClipLayout {
    root: PathBuf,
    formats: FormatSettings,
}

impl ClipLayout {
    pub fn new(root: impl Into<PathBuf>, formats: FormatSettings) -> Self {
        Self {
            root: root.into(),
            formats,
        }
    }

    pub fn from_config(config: &RecorderConfig) -> Self {
        Self::new(config.paths.recordings.clone(), config.formats.clone())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Day/hour directory for a clip completed at `at`.
    pub fn directory_for(&self, at: &DateTime<Local>) -> Result<PathBuf, RecorderError> {
        Ok(self
            .root
            .join(render(at, &self.formats.date)?)
            .join(render(at, &self.formats.hour)?))
    }

    /// File stem (no extension) for a clip completed at `at`, second resolution.
    pub fn file_stem_for(&self, at: &DateTime<Local>) -> Result<String, RecorderError> {
        render(at, &self.formats.time)
    }

    pub fn clip_path(&self, at: &DateTime<Local>) -> Result<PathBuf, RecorderError> {
        Ok(self
            .directory_for(at)?
            .join(format!("{}.wav", self.file_stem_for(at)?)))
    }
}

/// Whether a strftime pattern is accepted by chrono.
pub fn is_valid_pattern(pattern: &str) -> bool {
    !StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error))
}

fn render(at: &DateTime<Local>, pattern: &str) -> Result<String, RecorderError> {
    let mut out = String::new();
    write!(out, "{}", at.format(pattern)).map_err(|_| {
        RecorderError::Storage(format!("cannot format timestamp with '{}'", pattern))
    })?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn at() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 7, 9, 5, 42).unwrap()
    }

    #[test]
    fn default_layout_is_day_hour_time() {
        let layout = ClipLayout::new("Recordings", FormatSettings::default());
        assert_eq!(
            layout.clip_path(&at()).unwrap(),
            PathBuf::from("Recordings/2024-03-07/09/09-05-42.wav")
        );
        assert_eq!(
            layout.directory_for(&at()).unwrap(),
            PathBuf::from("Recordings/2024-03-07/09")
        );
    }

    #[test]
    fn custom_patterns_apply() {
        let formats = FormatSettings {
            date: "%Y%m%d".into(),
            hour: "h%H".into(),
            time: "%H%M%S".into(),
        };
        let layout = ClipLayout::new("/data", formats);
        assert_eq!(
            layout.clip_path(&at()).unwrap(),
            PathBuf::from("/data/20240307/h09/090542.wav")
        );
    }

    #[test]
    fn pattern_validation() {
        assert!(is_valid_pattern("%Y-%m-%d"));
        assert!(!is_valid_pattern("%Q"));
    }
}
