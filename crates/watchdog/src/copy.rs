//! Remote copy capability.
//!
//! The library lives on durable (often network-mounted) storage; staging
//! and publishing both go through rsync. On failure the destination state
//! is unspecified and must not be trusted.

use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Error type for copy operations.
#[derive(Debug, Error)]
pub enum CopyError {
    /// rsync exited with non-zero status.
    #[error("Copy failed with exit code {code}: {detail}")]
    CopyFailed { code: i32, detail: String },

    /// rsync process was terminated by signal.
    #[error("Copy process was terminated by signal")]
    CopyTerminated,

    /// IO error spawning the copy process.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Capability for copying a file between paths.
pub trait Copier {
    fn copy(&self, src: &Path, dst: &Path) -> Result<(), CopyError>;
}

/// Copier implementation that spawns rsync.
#[derive(Debug, Default)]
pub struct RsyncCopier;

impl Copier for RsyncCopier {
    fn copy(&self, src: &Path, dst: &Path) -> Result<(), CopyError> {
        log::debug!(
            "Running: rsync -avh --progress {} {}",
            src.display(),
            dst.display()
        );
        let output = Command::new("rsync")
            .args(["-avh", "--progress"])
            .arg(src)
            .arg(dst)
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            match output.status.code() {
                Some(code) => Err(CopyError::CopyFailed {
                    code,
                    detail: String::from_utf8_lossy(&output.stderr).trim().to_string(),
                }),
                None => Err(CopyError::CopyTerminated),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_copy_error_display_includes_code_and_detail() {
        let err = CopyError::CopyFailed {
            code: 23,
            detail: "partial transfer".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("23"));
        assert!(msg.contains("partial transfer"));
    }
}
