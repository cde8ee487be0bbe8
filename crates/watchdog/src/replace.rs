//! Replacer: atomic-swap transaction publishing a candidate at the
//! original's durable path.
//!
//! Rename is atomic only within one directory on one filesystem and copy
//! is not atomic at all, so the transaction stages the candidate as
//! `<name>.tmp` in the original's directory, moves the original aside to
//! `<name>.old`, renames the temp into place, and finally deletes the
//! `.old`. Between the two renames there is a real window during which
//! the original path does not exist; a concurrent reader of that exact
//! path observes absence. Accepted: replaces are rare relative to reads
//! and a true cross-directory atomic publish is not available on all
//! target filesystems.

use crate::copy::{Copier, CopyError};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors that can occur during file replacement.
#[derive(Debug, Error)]
pub enum ReplaceError {
    /// Copying the candidate to the temp path failed; the original is
    /// untouched.
    #[error("Failed to write temp copy: {0}")]
    TempCopy(#[from] CopyError),

    /// Moving the original aside failed; the original is untouched, a
    /// `.tmp` file may remain for cleanup.
    #[error("Failed to move original aside: {0}")]
    Backup(std::io::Error),

    /// Publishing the candidate failed and the pre-transaction state was
    /// restored.
    #[error("Failed to publish candidate (rolled back): {0}")]
    PublishRolledBack(std::io::Error),

    /// Publishing failed and rollback also failed; the original path is
    /// left missing. The one case that needs operator attention.
    #[error("Failed to publish candidate and rollback failed; {path} is missing: {detail}")]
    Unrecoverable { path: PathBuf, detail: String },
}

/// State of one replace transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplaceState {
    Pending,
    TempWritten,
    Swapped,
    Committed,
    RolledBack,
    Failed,
}

/// One replace transaction over a single source path.
///
/// Owns the three derived path names for the duration of one file's
/// replace step. Not safe for two concurrent runs to share.
#[derive(Debug)]
pub struct ReplaceTransaction {
    original: PathBuf,
    temp: PathBuf,
    old: PathBuf,
    state: ReplaceState,
}

fn sibling_path(original: &Path, suffix: &str) -> PathBuf {
    let mut path = original.as_os_str().to_owned();
    path.push(suffix);
    PathBuf::from(path)
}

impl ReplaceTransaction {
    /// Derive `<name>.tmp` and `<name>.old` next to the original.
    pub fn new(original: &Path) -> Self {
        Self {
            original: original.to_path_buf(),
            temp: sibling_path(original, ".tmp"),
            old: sibling_path(original, ".old"),
            state: ReplaceState::Pending,
        }
    }

    pub fn state(&self) -> ReplaceState {
        self.state
    }

    /// Execute the transaction: stage, swap, commit.
    ///
    /// On success the candidate content is published at the original path
    /// and the `.old` backup is deleted (a failed delete is logged, not
    /// fatal). On failure the original ends up either untouched or fully
    /// restored, except for [`ReplaceError::Unrecoverable`].
    pub fn run(&mut self, copier: &dyn Copier, candidate: &Path) -> Result<(), ReplaceError> {
        // Step 1: stage the candidate next to the original.
        if let Err(e) = copier.copy(candidate, &self.temp) {
            self.state = ReplaceState::Failed;
            return Err(ReplaceError::TempCopy(e));
        }
        self.state = ReplaceState::TempWritten;

        // Step 2: move the original aside. On failure the original is
        // still at its path; the stray .tmp is left for cleanup.
        if let Err(e) = fs::rename(&self.original, &self.old) {
            self.state = ReplaceState::Failed;
            return Err(ReplaceError::Backup(e));
        }
        self.state = ReplaceState::Swapped;

        // Step 3: publish. The original path is briefly absent here.
        if let Err(e) = fs::rename(&self.temp, &self.original) {
            return Err(self.roll_back(e));
        }
        self.state = ReplaceState::Committed;

        // Step 4: drop the backup. The new content is already published,
        // so a stray .old is a cleanup nuisance, not a correctness
        // violation.
        if let Err(e) = fs::remove_file(&self.old) {
            log::warn!(
                "Replaced {} but could not delete backup {}: {}",
                self.original.display(),
                self.old.display(),
                e
            );
        }

        Ok(())
    }

    /// Best-effort restoration after a failed publish rename.
    ///
    /// Prefers renaming `.old` back into place, which restores the
    /// pre-transaction content; falls back to renaming `.tmp` into place
    /// so the original path is at least never left dangling.
    fn roll_back(&mut self, publish_err: std::io::Error) -> ReplaceError {
        if !self.original.exists() && self.old.exists() {
            if fs::rename(&self.old, &self.original).is_ok() {
                if self.temp.exists() {
                    let _ = fs::remove_file(&self.temp);
                }
                self.state = ReplaceState::RolledBack;
                return ReplaceError::PublishRolledBack(publish_err);
            }
        }

        if !self.original.exists() && self.temp.exists() {
            if fs::rename(&self.temp, &self.original).is_ok() {
                self.state = ReplaceState::RolledBack;
                return ReplaceError::PublishRolledBack(publish_err);
            }
        }

        self.state = ReplaceState::Failed;
        log::error!(
            "CRITICAL: replace of {} left no file at the original path",
            self.original.display()
        );
        ReplaceError::Unrecoverable {
            path: self.original.clone(),
            detail: publish_err.to_string(),
        }
    }
}
