use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::models::error::RecorderError;
use crate::processing::wav_format::{self, PcmFormat, MAX_DATA_SIZE};

/// Upper bound on `_N` suffixes tried before giving up on a file name.
const MAX_NAME_ATTEMPTS: u32 = 1000;

/// Write one complete WAV file into `dir`, named `<stem>.wav`.
///
/// ## File Format
/// ```text
/// [44-byte WAV header]
/// [raw little-endian PCM payload]
/// ```
///
/// Creates `dir` (and parents) if absent. Never overwrites: when the name is
/// taken, `_1`, `_2`, ... are appended to the stem. Returns the final path.
pub fn write_wav_file(
    dir: &Path,
    stem: &str,
    format: &PcmFormat,
    payload: &[u8],
) -> Result<PathBuf, RecorderError> {
    if payload.len() as u64 > MAX_DATA_SIZE {
        return Err(RecorderError::Storage(format!(
            "payload of {} bytes exceeds the WAV size limit",
            payload.len()
        )));
    }
    let block_align = format.block_align().map_or(0, usize::from);
    if block_align == 0 || payload.len() % block_align != 0 {
        return Err(RecorderError::Storage(format!(
            "payload of {} bytes is not a whole number of {}-byte frames",
            payload.len(),
            block_align
        )));
    }

    let header = wav_format::generate_wav_header(format, payload.len() as u32)?;

    if !dir.is_dir() {
        fs::create_dir_all(dir)
            .map_err(|e| RecorderError::Storage(format!("failed to create directory: {}", e)))?;
        log::info!("Folder created: {}", dir.display());
    }

    let (file, path) = create_unique(dir, stem)?;

    if let Err(e) = write_parts(BufWriter::new(file), &header, payload) {
        // Leave no truncated clip behind.
        let _ = fs::remove_file(&path);
        return Err(RecorderError::Storage(format!(
            "write failed for {}: {}",
            path.display(),
            e
        )));
    }

    Ok(path)
}

fn write_parts(mut out: BufWriter<File>, header: &[u8], payload: &[u8]) -> io::Result<()> {
    out.write_all(header)?;
    out.write_all(payload)?;
    out.flush()
}

fn create_unique(dir: &Path, stem: &str) -> Result<(File, PathBuf), RecorderError> {
    for attempt in 0..MAX_NAME_ATTEMPTS {
        let name = if attempt == 0 {
            format!("{}.wav", stem)
        } else {
            format!("{}_{}.wav", stem, attempt)
        };
        let path = dir.join(name);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((file, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => {
                return Err(RecorderError::Storage(format!(
                    "failed to create {}: {}",
                    path.display(),
                    e
                )))
            }
        }
    }
    Err(RecorderError::Storage(format!(
        "no free file name for '{}' in {}",
        stem,
        dir.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::audio_models::SampleWidth;

    fn format(channels: u16, sample_width: SampleWidth) -> PcmFormat {
        PcmFormat {
            sample_rate: 16000,
            channels,
            sample_width,
        }
    }

    #[test]
    fn round_trip_16bit_stereo() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<i16> = vec![0, 1, -1, i16::MAX, i16::MIN, 1234];
        let payload: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let path = write_wav_file(dir.path(), "clip", &format(2, SampleWidth::Two), &payload).unwrap();
        assert_eq!(path, dir.path().join("clip.wav"));

        let mut reader = hound::WavReader::open(&path).unwrap();
        let spec = reader.spec();
        assert_eq!(spec.channels, 2);
        assert_eq!(spec.sample_rate, 16000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, hound::SampleFormat::Int);
        let read: Vec<i16> = reader.samples::<i16>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn round_trip_32bit_mono() {
        let dir = tempfile::tempdir().unwrap();
        let samples: Vec<i32> = vec![i32::MIN, -5, 0, 5, i32::MAX];
        let payload: Vec<u8> = samples.iter().flat_map(|s| s.to_le_bytes()).collect();

        let path = write_wav_file(dir.path(), "clip", &format(1, SampleWidth::Four), &payload).unwrap();

        let mut reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 32);
        assert_eq!(reader.spec().channels, 1);
        let read: Vec<i32> = reader.samples::<i32>().map(|s| s.unwrap()).collect();
        assert_eq!(read, samples);
    }

    #[test]
    fn round_trip_8bit_keeps_raw_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let payload = vec![0u8, 128, 255, 64];

        let path = write_wav_file(dir.path(), "clip", &format(1, SampleWidth::One), &payload).unwrap();

        let reader = hound::WavReader::open(&path).unwrap();
        assert_eq!(reader.spec().bits_per_sample, 8);
        assert_eq!(reader.len(), 4);

        let bytes = fs::read(&path).unwrap();
        assert_eq!(&bytes[wav_format::WAV_HEADER_SIZE..], payload.as_slice());
    }

    #[test]
    fn existing_name_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let fmt = format(1, SampleWidth::Two);
        let first = write_wav_file(dir.path(), "10-00-00", &fmt, &[1, 0]).unwrap();
        let second = write_wav_file(dir.path(), "10-00-00", &fmt, &[2, 0]).unwrap();

        assert_eq!(first, dir.path().join("10-00-00.wav"));
        assert_eq!(second, dir.path().join("10-00-00_1.wav"));
        assert_eq!(&fs::read(&first).unwrap()[44..], &[1u8, 0]);
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("2024-01-01").join("13");
        write_wav_file(&nested, "13-00-00", &format(1, SampleWidth::Two), &[]).unwrap();
        assert!(nested.join("13-00-00.wav").is_file());
    }

    #[test]
    fn ragged_payload_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = write_wav_file(dir.path(), "x", &format(2, SampleWidth::Two), &[0, 0, 0]).unwrap_err();
        assert!(matches!(err, RecorderError::Storage(_)));
        assert!(!dir.path().join("x.wav").exists());
    }

    #[test]
    fn directory_blocked_by_file_is_storage_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"not a dir").unwrap();

        let err = write_wav_file(&blocker.join("13"), "x", &format(1, SampleWidth::Two), &[0, 0])
            .unwrap_err();
        assert!(matches!(err, RecorderError::Storage(_)));
    }

    #[test]
    fn unrepresentable_format_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let huge = PcmFormat {
            sample_rate: 600_000_000,
            channels: 2,
            sample_width: SampleWidth::Four,
        };
        let err = write_wav_file(dir.path(), "x", &huge, &[0; 8]).unwrap_err();
        assert!(matches!(err, RecorderError::Storage(_)));
        assert!(!dir.path().join("x.wav").exists());
    }
}
