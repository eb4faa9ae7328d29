//! Log sink: `env_logger` teed to stdout and a log file.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use env_logger::{Builder, Target};

use clip_recorder_core::models::config::RecorderConfig;

/// Writes every log line to stdout and to the log file.
struct Tee {
    file: File,
}

impl Write for Tee {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

/// Filter precedence: command line, then `RUST_LOG`, then the config file.
pub fn resolve_filter(cli: Option<&str>, env: Option<String>, configured: &str) -> String {
    cli.map(str::to_string)
        .or_else(|| env.filter(|f| !f.trim().is_empty()))
        .unwrap_or_else(|| configured.to_string())
}

/// `[YYYY-MM-DD HH:MM:SS] <target> - <LEVEL> <message>`
pub fn write_line(
    out: &mut impl Write,
    at: DateTime<Local>,
    record: &log::Record<'_>,
) -> io::Result<()> {
    writeln!(
        out,
        "[{}] {} - {} {}",
        at.format("%Y-%m-%d %H:%M:%S"),
        record.target(),
        record.level(),
        record.args()
    )
}

/// Install the global logger. Returns the log file path when file logging
/// is active; falls back to console-only if the file cannot be opened.
pub fn init(config: &RecorderConfig, cli_filter: Option<&str>) -> Option<PathBuf> {
    let filter = resolve_filter(
        cli_filter,
        std::env::var("RUST_LOG").ok(),
        &config.logging.level,
    );

    let mut builder = Builder::new();
    builder
        .parse_filters(&filter)
        .format(|buf, record| write_line(buf, Local::now(), record));

    let path = config.paths.logging.join(&config.logging.file);
    let file_path = match open_log_file(&config.paths.logging, &path) {
        Ok(file) => {
            builder.target(Target::Pipe(Box::new(Tee { file })));
            Some(path)
        }
        Err(e) => {
            eprintln!(
                "warning: cannot open log file {} ({}), logging to console only",
                path.display(),
                e
            );
            builder.target(Target::Stdout);
            None
        }
    };

    if let Err(e) = builder.try_init() {
        eprintln!("warning: logger already initialised: {}", e);
    }
    file_path
}

fn open_log_file(dir: &Path, path: &Path) -> io::Result<File> {
    fs::create_dir_all(dir)?;
    OpenOptions::new().create(true).append(true).open(path)
}
