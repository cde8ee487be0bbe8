//! Per-file pipeline driver and run loop.
//!
//! Strictly single-threaded: one file is carried to full completion
//! (success, rejection, or failure) before the next starts. Every stage
//! reports an explicit outcome; one file's failure never aborts the
//! batch. The run context carries the policy, the injectable tool
//! capabilities and the event sink, so there is no hidden global state.

use crate::copy::{Copier, CopyError};
use crate::encode::{EncodeError, Encoder};
use crate::events::{Event, EventSink};
use crate::inspect::{inspect, Verdict};
use crate::inspected_log::{InspectedLog, LogError};
use crate::probe::Prober;
use crate::replace::{ReplaceError, ReplaceTransaction};
use crate::scan::scan_media_files;
use crate::size_gate::is_efficient;
use crate::transcode::TranscodeJob;
use crate::verify::verify;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use transcode_watchdog_config::Config;

/// A failure confined to one file's job. The run continues with the next
/// file.
#[derive(Debug, Error)]
pub enum JobError {
    #[error("Copy failed: {0}")]
    Copy(#[from] CopyError),

    #[error("Encode failed: {0}")]
    Encode(#[from] EncodeError),

    #[error("Verification failed: {0}")]
    Verification(String),

    #[error("Replace failed: {0}")]
    Replace(#[from] ReplaceError),

    #[error("Inspected log error: {0}")]
    Log(#[from] LogError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal outcome for one file within a run.
#[derive(Debug)]
pub enum FileOutcome {
    /// Already satisfied policy; recorded in the inspected log.
    Passed,
    /// Present in the inspected log before the run; not probed.
    AlreadyHandled,
    /// Candidate verified, smaller, and published at the original path.
    Replaced { saved_bytes: u64 },
    /// Candidate verified but not strictly smaller; original untouched.
    NotSmaller {
        original_bytes: u64,
        candidate_bytes: u64,
    },
    /// A pipeline stage failed; original untouched unless the error says
    /// otherwise.
    Failed(JobError),
}

/// Counters for one full run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub discovered: usize,
    pub already_handled: usize,
    pub passed: usize,
    pub queued: usize,
    pub replaced: usize,
    pub rejected_not_smaller: usize,
    pub failed: usize,
}

/// The pipeline run context: policy plus injected tool capabilities and
/// event sink.
pub struct Watchdog<'a> {
    config: &'a Config,
    prober: &'a dyn Prober,
    encoder: &'a dyn Encoder,
    copier: &'a dyn Copier,
    sink: &'a dyn EventSink,
    inspected: InspectedLog,
}

impl<'a> Watchdog<'a> {
    /// Build the run context: load the inspected log and make sure the
    /// staging directory exists.
    pub fn new(
        config: &'a Config,
        prober: &'a dyn Prober,
        encoder: &'a dyn Encoder,
        copier: &'a dyn Copier,
        sink: &'a dyn EventSink,
    ) -> Result<Self, JobError> {
        let inspected = InspectedLog::load(&config.state.inspected_log)?;
        log::info!("Loaded {} previously inspected files", inspected.len());
        fs::create_dir_all(&config.staging.temp_dir)?;

        Ok(Self {
            config,
            prober,
            encoder,
            copier,
            sink,
            inspected,
        })
    }

    /// One full pass over the configured libraries.
    pub fn run(&mut self) -> RunSummary {
        let mut summary = RunSummary::default();

        let files = scan_media_files(
            &self.config.library.media_dirs,
            &self.config.library.extensions,
        );
        summary.discovered = files.len();
        log::info!("Discovered {} candidate files before filtering", files.len());

        let mut queue: Vec<PathBuf> = Vec::new();
        for path in files {
            if self.inspected.contains(&path) {
                self.sink.emit(Event::AlreadyHandled { path });
                summary.already_handled += 1;
                continue;
            }

            match inspect(
                self.prober,
                &mut self.inspected,
                &self.config.policy,
                self.sink,
                &path,
            ) {
                Ok(Verdict::Pass) => summary.passed += 1,
                Ok(Verdict::Queue { .. }) => queue.push(path),
                Err(e) => {
                    self.sink.emit(Event::JobFailed {
                        path,
                        error: e.to_string(),
                    });
                    summary.failed += 1;
                }
            }
        }

        summary.queued = queue.len();
        log::info!("Queue length: {}", queue.len());

        for path in queue {
            match self.process_queued(&path) {
                FileOutcome::Replaced { saved_bytes } => {
                    self.sink.emit(Event::Replaced {
                        path,
                        saved_bytes,
                    });
                    summary.replaced += 1;
                }
                FileOutcome::NotSmaller {
                    original_bytes,
                    candidate_bytes,
                } => {
                    self.sink.emit(Event::NotSmaller {
                        path,
                        original_bytes,
                        candidate_bytes,
                    });
                    summary.rejected_not_smaller += 1;
                }
                FileOutcome::Failed(e) => {
                    self.sink.emit(Event::JobFailed {
                        path,
                        error: e.to_string(),
                    });
                    summary.failed += 1;
                }
                // Pass and AlreadyHandled are decided before queueing.
                FileOutcome::Passed | FileOutcome::AlreadyHandled => {}
            }
        }

        log::info!(
            "Run complete: {} replaced, {} passed, {} skipped, {} rejected, {} failed",
            summary.replaced,
            summary.passed,
            summary.already_handled,
            summary.rejected_not_smaller,
            summary.failed
        );
        summary
    }

    /// Process one queued file to a terminal outcome, deleting the local
    /// staging files at job end regardless of what happened.
    fn process_queued(&mut self, path: &Path) -> FileOutcome {
        let job = TranscodeJob::new(path, &self.config.staging.temp_dir);
        let outcome = self.run_job(&job);
        job.cleanup();
        outcome
    }

    fn run_job(&mut self, job: &TranscodeJob) -> FileOutcome {
        if let Err(e) = job.stage(self.copier) {
            return FileOutcome::Failed(e.into());
        }

        if let Err(e) = job.encode(
            self.encoder,
            &self.config.encoder.preset_file,
            &self.config.encoder.preset_name,
        ) {
            return FileOutcome::Failed(e.into());
        }

        match verify(self.prober, self.sink, &job.local_source, &job.local_output) {
            Ok(report) if report.passed() => {}
            Ok(_) => {
                job.discard_candidate();
                return FileOutcome::Failed(JobError::Verification(
                    "duration or stream-count mismatch".to_string(),
                ));
            }
            Err(e) => {
                job.discard_candidate();
                return FileOutcome::Failed(JobError::Verification(e.to_string()));
            }
        }

        let (original_bytes, candidate_bytes) =
            match (fs::metadata(&job.local_source), fs::metadata(&job.local_output)) {
                (Ok(orig), Ok(cand)) => (orig.len(), cand.len()),
                (Err(e), _) | (_, Err(e)) => {
                    job.discard_candidate();
                    return FileOutcome::Failed(e.into());
                }
            };

        if !is_efficient(original_bytes, candidate_bytes) {
            job.discard_candidate();
            return FileOutcome::NotSmaller {
                original_bytes,
                candidate_bytes,
            };
        }

        let mut tx = ReplaceTransaction::new(&job.source_path);
        if let Err(e) = tx.run(self.copier, &job.local_output) {
            job.discard_candidate();
            return FileOutcome::Failed(e.into());
        }

        // Mark the original as handled only after the swap committed.
        if let Err(e) = self.inspected.append(&job.source_path) {
            return FileOutcome::Failed(e.into());
        }

        FileOutcome::Replaced {
            saved_bytes: original_bytes - candidate_bytes,
        }
    }
}
