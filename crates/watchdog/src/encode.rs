//! External encoder capability.
//!
//! The real implementation spawns HandBrakeCLI with an imported preset.
//! Only the exit status is consulted here; the Transcoder additionally
//! requires the output file to exist on disk.

use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Error type for encoding operations.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Encoder exited with non-zero status.
    #[error("Encoder failed with exit code: {0}")]
    EncoderFailed(i32),

    /// Encoder process was terminated by signal.
    #[error("Encoder process was terminated by signal")]
    EncoderTerminated,

    /// Encoder reported success but produced no output file.
    #[error("Encoder produced no output at {0}")]
    MissingOutput(String),

    /// IO error during encoding.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability for invoking the external encoder.
pub trait Encoder {
    /// Encode `input` to `output` using the named preset. Exit status zero
    /// is the only success signal consulted.
    fn encode(
        &self,
        preset_file: &Path,
        preset_name: &str,
        input: &Path,
        output: &Path,
    ) -> Result<(), EncodeError>;
}

/// Build the HandBrakeCLI command for one encode.
pub fn build_handbrake_command(
    preset_file: &Path,
    preset_name: &str,
    input: &Path,
    output: &Path,
) -> Command {
    let mut cmd = Command::new("HandBrakeCLI");
    cmd.arg("--preset-import-file").arg(preset_file);
    cmd.arg("-i").arg(input);
    cmd.arg("-o").arg(output);
    cmd.arg("--preset").arg(preset_name);
    cmd
}

/// Encoder implementation that spawns HandBrakeCLI.
#[derive(Debug, Default)]
pub struct HandBrakeEncoder;

impl Encoder for HandBrakeEncoder {
    fn encode(
        &self,
        preset_file: &Path,
        preset_name: &str,
        input: &Path,
        output: &Path,
    ) -> Result<(), EncodeError> {
        let mut cmd = build_handbrake_command(preset_file, preset_name, input, output);
        log::debug!(
            "Running: HandBrakeCLI --preset-import-file {} -i {} -o {} --preset {}",
            preset_file.display(),
            input.display(),
            output.display(),
            preset_name
        );

        let status = cmd.status()?;

        if status.success() {
            Ok(())
        } else {
            match status.code() {
                Some(code) => Err(EncodeError::EncoderFailed(code)),
                None => Err(EncodeError::EncoderTerminated),
            }
        }
    }
}
