//! Structured pipeline events.
//!
//! Audit-relevant outcomes are emitted through an explicit [`EventSink`]
//! carried by the run context instead of a process-wide logger, so each
//! stage can be tested in isolation and nothing audit-worthy is silently
//! dropped.

use std::path::PathBuf;
use std::sync::Mutex;

/// An audit-relevant pipeline event.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// Path was found in the inspected log; no probe performed.
    AlreadyHandled { path: PathBuf },
    /// File already satisfies policy; recorded in the inspected log.
    Passed { path: PathBuf },
    /// File queued for transcoding, with one reason per failing condition.
    Queued { path: PathBuf, reasons: Vec<String> },
    /// Subtitle track count differs between original and candidate.
    /// Allowed, but recorded for audit.
    SubtitleCountChanged {
        path: PathBuf,
        original: usize,
        candidate: usize,
    },
    /// Candidate was not strictly smaller than the original. A policy
    /// outcome, not an error.
    NotSmaller {
        path: PathBuf,
        original_bytes: u64,
        candidate_bytes: u64,
    },
    /// Candidate published at the original path.
    Replaced { path: PathBuf, saved_bytes: u64 },
    /// A per-file stage failed; the run continues with the next file.
    JobFailed { path: PathBuf, error: String },
}

/// Destination for pipeline events.
pub trait EventSink {
    fn emit(&self, event: Event);
}

/// Sink that forwards events to the `log` facade.
#[derive(Debug, Default)]
pub struct LogSink;

impl EventSink for LogSink {
    fn emit(&self, event: Event) {
        match event {
            Event::AlreadyHandled { path } => {
                log::info!("SKIP inspected: {}", path.display());
            }
            Event::Passed { path } => {
                log::info!("PASS: {}", path.display());
            }
            Event::Queued { path, reasons } => {
                log::info!("QUEUE: {} (reasons: {})", path.display(), reasons.join(", "));
            }
            Event::SubtitleCountChanged {
                path,
                original,
                candidate,
            } => {
                log::info!(
                    "Subtitle track count changed for {}: {} -> {} (allowed)",
                    path.display(),
                    original,
                    candidate
                );
            }
            Event::NotSmaller {
                path,
                original_bytes,
                candidate_bytes,
            } => {
                log::info!(
                    "Not space-efficient for {} (new {} >= orig {}); skipping replace",
                    path.display(),
                    candidate_bytes,
                    original_bytes
                );
            }
            Event::Replaced { path, saved_bytes } => {
                log::info!(
                    "SUCCESS: Replaced {} (saved {} bytes)",
                    path.display(),
                    saved_bytes
                );
            }
            Event::JobFailed { path, error } => {
                log::error!("Job failed for {}: {}", path.display(), error);
            }
        }
    }
}

/// Sink that collects events in memory. Used by tests and by embedding
/// consumers that want to inspect run outcomes programmatically.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<Event>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all events emitted so far.
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().expect("event sink poisoned").clone()
    }
}

impl EventSink for MemorySink {
    fn emit(&self, event: Event) {
        self.events.lock().expect("event sink poisoned").push(event);
    }
}
