//! CLI entry point for the transcode watchdog.
//!
//! Parses command line arguments, loads the configuration, runs the tool
//! availability checks, and drives one full batch run over the configured
//! libraries.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use transcode_watchdog::{
    run_startup_checks, Config, FfprobeProber, HandBrakeEncoder, LogSink, RsyncCopier, Watchdog,
};

/// Transcode Watchdog - batch re-encode of media libraries to a target codec
#[derive(Parser, Debug)]
#[command(name = "transcode-watchdog")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the configuration file (config.toml)
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    log::info!("Transcode watchdog starting");
    log::info!("Config file: {}", args.config.display());

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    if let Err(e) = run_startup_checks() {
        eprintln!("Startup check failed: {}", e);
        return ExitCode::FAILURE;
    }

    let prober = FfprobeProber;
    let encoder = HandBrakeEncoder;
    let copier = RsyncCopier;
    let sink = LogSink;

    let mut watchdog = match Watchdog::new(&config, &prober, &encoder, &copier, &sink) {
        Ok(watchdog) => watchdog,
        Err(e) => {
            eprintln!("Failed to initialize: {}", e);
            return ExitCode::FAILURE;
        }
    };

    // Per-file failures are logged and counted; only a failure to start at
    // all changes the exit status.
    let summary = watchdog.run();
    log::info!(
        "Finished: {} discovered, {} replaced, {} failed",
        summary.discovered,
        summary.replaced,
        summary.failed
    );

    ExitCode::SUCCESS
}
