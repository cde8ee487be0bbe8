//! Transcoder: stages a queued file locally and produces a candidate.
//!
//! A job exists only while one queued file is being processed; its local
//! files are deleted at job end regardless of outcome.

use crate::copy::{Copier, CopyError};
use crate::encode::{EncodeError, Encoder};
use std::fs;
use std::path::{Path, PathBuf};

/// Local staging state for one queued file.
#[derive(Debug, Clone)]
pub struct TranscodeJob {
    /// Path of the original on durable storage.
    pub source_path: PathBuf,
    /// Staged copy of the source in the local temp dir.
    pub local_source: PathBuf,
    /// Candidate output path in the local temp dir.
    pub local_output: PathBuf,
}

impl TranscodeJob {
    /// Derive the job paths for a source file. The candidate is named
    /// `<stem>.av1.mkv` next to the staged source.
    pub fn new(source_path: &Path, temp_dir: &Path) -> Self {
        let file_name = source_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        let stem = source_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("output");

        Self {
            source_path: source_path.to_path_buf(),
            local_source: temp_dir.join(&file_name),
            local_output: temp_dir.join(format!("{}.av1.mkv", stem)),
        }
    }

    /// Copy the source into the staging directory.
    ///
    /// A failed copy aborts the job; the destination is untrusted, so any
    /// partial staged file is removed before returning.
    pub fn stage(&self, copier: &dyn Copier) -> Result<(), CopyError> {
        if let Err(e) = copier.copy(&self.source_path, &self.local_source) {
            let _ = fs::remove_file(&self.local_source);
            return Err(e);
        }
        Ok(())
    }

    /// Run the encoder against the staged source.
    ///
    /// Success requires exit status zero AND the output file existing on
    /// disk; any partially written output is deleted before aborting.
    pub fn encode(
        &self,
        encoder: &dyn Encoder,
        preset_file: &Path,
        preset_name: &str,
    ) -> Result<(), EncodeError> {
        let result = encoder.encode(preset_file, preset_name, &self.local_source, &self.local_output);

        match result {
            Ok(()) => {
                if self.local_output.exists() {
                    Ok(())
                } else {
                    Err(EncodeError::MissingOutput(
                        self.local_output.display().to_string(),
                    ))
                }
            }
            Err(e) => {
                if self.local_output.exists() {
                    let _ = fs::remove_file(&self.local_output);
                }
                Err(e)
            }
        }
    }

    /// Delete the candidate output, keeping the staged source. Used when a
    /// downstream stage rejects the candidate.
    pub fn discard_candidate(&self) {
        if self.local_output.exists() {
            if let Err(e) = fs::remove_file(&self.local_output) {
                log::warn!(
                    "Failed to delete candidate {}: {}",
                    self.local_output.display(),
                    e
                );
            }
        }
    }

    /// Delete all local files for this job. Errors are logged, not
    /// propagated; stray temp files are reclaimed by external housekeeping.
    pub fn cleanup(&self) {
        for path in [&self.local_source, &self.local_output] {
            if path.exists() {
                if let Err(e) = fs::remove_file(path) {
                    log::warn!("Failed to delete temp file {}: {}", path.display(), e);
                }
            }
        }
    }
}
