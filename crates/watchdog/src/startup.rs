//! Startup checks: verify required external tools before processing.
//!
//! A missing tool aborts the entire run with a non-zero exit; every later
//! failure is per-file and never changes the run's exit status.

use std::process::{Command, Stdio};
use thiserror::Error;

/// External tools the pipeline depends on, with the flag that makes each
/// print its version and exit.
const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("ffprobe", "-version"),
    ("HandBrakeCLI", "--version"),
    ("rsync", "--version"),
];

/// Error type for startup checks.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Missing required tools: {0}")]
    ToolsMissing(String),
}

/// Check whether one tool responds to its version invocation.
fn tool_available(tool: &str, version_flag: &str) -> bool {
    Command::new(tool)
        .arg(version_flag)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map(|status| status.success())
        .unwrap_or(false)
}

fn missing_tools(tools: &[(&'static str, &'static str)]) -> Vec<&'static str> {
    tools
        .iter()
        .filter(|(tool, flag)| !tool_available(tool, flag))
        .map(|(tool, _)| *tool)
        .collect()
}

/// Verify that ffprobe, HandBrakeCLI and rsync are all present.
///
/// Run once before any file processing begins. There is no way to bypass
/// this; a missing tool always fails the run.
pub fn run_startup_checks() -> Result<(), StartupError> {
    let missing = missing_tools(REQUIRED_TOOLS);

    if missing.is_empty() {
        log::info!("All required CLI tools found: ffprobe, HandBrakeCLI, rsync");
        Ok(())
    } else {
        Err(StartupError::ToolsMissing(missing.join(", ")))
    }
}
