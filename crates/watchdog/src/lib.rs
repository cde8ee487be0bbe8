//! Transcode Watchdog
//!
//! Batch pipeline that walks media libraries, re-encodes files that miss the
//! codec or size policy, verifies each candidate against its original, and
//! atomically swaps verified smaller candidates into place.

pub mod copy;
pub mod encode;
pub mod events;
pub mod inspect;
pub mod inspected_log;
pub mod pipeline;
pub mod probe;
pub mod replace;
pub mod scan;
pub mod size_gate;
pub mod startup;
pub mod transcode;
pub mod verify;

pub use copy::{Copier, CopyError, RsyncCopier};
pub use encode::{build_handbrake_command, EncodeError, Encoder, HandBrakeEncoder};
pub use events::{Event, EventSink, LogSink, MemorySink};
pub use inspect::{inspect, size_limit_bytes, Verdict};
pub use inspected_log::{InspectedLog, LogError};
pub use pipeline::{FileOutcome, JobError, RunSummary, Watchdog};
pub use probe::{FfprobeProber, MediaInfo, ProbeError, Prober, StreamCounts, StreamInfo, StreamKind};
pub use replace::{ReplaceError, ReplaceState, ReplaceTransaction};
pub use scan::{is_media_file, scan_media_files};
pub use size_gate::is_efficient;
pub use startup::{run_startup_checks, StartupError};
pub use transcode::TranscodeJob;
pub use verify::{verify, VerificationReport};

pub use transcode_watchdog_config as config;
pub use transcode_watchdog_config::Config;
