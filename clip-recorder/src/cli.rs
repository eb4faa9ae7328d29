//! Command-line options.

use std::path::PathBuf;

use clap::Parser;

/// Continuously records an input device into fixed-length WAV clips.
#[derive(Debug, Parser, Clone)]
#[command(name = "clip-recorder", about, version)]
pub struct Cli {
    /// Path to the YAML configuration file
    #[arg(long, short = 'c', env = "CLIP_RECORDER_CONFIG", default_value = "config.yaml")]
    pub config: PathBuf,

    /// Print visible input devices and exit
    #[arg(long = "list-devices", default_value_t = false)]
    pub list_devices: bool,

    /// Log filter (overrides RUST_LOG and logging.level), e.g. "debug"
    #[arg(long = "log-level", value_name = "FILTER")]
    pub log_level: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_config_yaml() {
        let cli = Cli::parse_from(["clip-recorder"]);
        assert_eq!(cli.config, PathBuf::from("config.yaml"));
        assert!(!cli.list_devices);
        assert_eq!(cli.log_level, None);
    }

    #[test]
    fn parses_every_flag() {
        let cli = Cli::parse_from([
            "clip-recorder",
            "--config",
            "/etc/recorder.yaml",
            "--list-devices",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.config, PathBuf::from("/etc/recorder.yaml"));
        assert!(cli.list_devices);
        assert_eq!(cli.log_level.as_deref(), Some("debug"));
    }

    #[test]
    fn rejects_unknown_flags() {
        assert!(Cli::try_parse_from(["clip-recorder", "--bogus"]).is_err());
    }
}
