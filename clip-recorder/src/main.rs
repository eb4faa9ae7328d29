mod cli;
mod logging;

use std::io;
use std::process::ExitCode;

use clap::Parser;
use signal_hook::consts::{SIGINT, SIGTERM};

use clip_recorder_core::{CaptureProvider, DeviceLocator, RecorderConfig, ShutdownSignal, Supervisor};
use clip_recorder_cpal::CpalProvider;

use cli::Cli;

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match RecorderConfig::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("clip-recorder: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let log_file = logging::init(&config, cli.log_level.as_deref());
    log::info!(
        "clip-recorder {} starting (config {}, log {})",
        env!("CARGO_PKG_VERSION"),
        cli.config.display(),
        log_file.map_or_else(|| "console only".to_string(), |p| p.display().to_string())
    );

    if cli.list_devices {
        return list_devices(&config);
    }

    let shutdown = ShutdownSignal::new();
    if let Err(e) = install_signal_handlers(&shutdown) {
        log::error!("Cannot install signal handlers: {}", e);
        return ExitCode::FAILURE;
    }

    let mut supervisor = match Supervisor::new(config, CpalProvider::new, shutdown) {
        Ok(supervisor) => supervisor,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    match supervisor.run() {
        Ok(report) => {
            log::info!("Recorder stopped: {}", report);
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("Recorder failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// First SIGINT/SIGTERM requests a graceful stop; a second one exits at once.
fn install_signal_handlers(shutdown: &ShutdownSignal) -> io::Result<()> {
    for signal in [SIGINT, SIGTERM] {
        // Runs before the flag is set, so it only fires on a repeat signal.
        signal_hook::flag::register_conditional_shutdown(signal, 1, shutdown.flag())?;
        signal_hook::flag::register(signal, shutdown.flag())?;
    }
    Ok(())
}

fn list_devices(config: &RecorderConfig) -> ExitCode {
    let devices = match CpalProvider::new().and_then(|provider| provider.input_devices()) {
        Ok(devices) => devices,
        Err(e) => {
            log::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    let locator = DeviceLocator::new(config.audio.device_match.clone());
    if devices.is_empty() {
        println!("No input devices found");
    }
    for device in &devices {
        let marker = if locator.matches(device) { "  <- device_match" } else { "" };
        println!(
            "{:>3}  {}  ({} input channel(s)){}",
            device.index, device.name, device.max_input_channels, marker
        );
    }
    ExitCode::SUCCESS
}
