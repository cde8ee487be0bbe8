//! Inspector: decides whether a file already meets the encoding policy.
//!
//! A file passes when its first video stream uses the target codec and the
//! container is strictly under the size limit. Probe failures fail open
//! toward re-encoding; a file is never silently skipped because its
//! metadata could not be read.

use crate::events::{Event, EventSink};
use crate::inspected_log::{InspectedLog, LogError};
use crate::probe::Prober;
use std::path::Path;
use transcode_watchdog_config::PolicyConfig;

/// Inspection verdict for one file.
#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    /// File satisfies policy; it has been recorded in the inspected log.
    Pass,
    /// File is a transcode candidate.
    Queue { reasons: Vec<String> },
}

/// Size limit in bytes for a threshold in gigabytes, truncated.
pub fn size_limit_bytes(max_file_size_gb: f64) -> u64 {
    (max_file_size_gb * (1024u64.pow(3) as f64)) as u64
}

/// Inspect one file against the policy.
///
/// On `Pass` the path is appended to the inspected log before this
/// returns; the commit is independent of whatever later pipeline stages
/// do for other files.
pub fn inspect(
    prober: &dyn Prober,
    log: &mut InspectedLog,
    policy: &PolicyConfig,
    sink: &dyn EventSink,
    path: &Path,
) -> Result<Verdict, LogError> {
    let info = match prober.probe(path) {
        Ok(info) => info,
        Err(e) => {
            log::info!(
                "Inspection failed to read metadata for {}: {}",
                path.display(),
                e
            );
            let reasons = vec!["metadata unavailable".to_string()];
            sink.emit(Event::Queued {
                path: path.to_path_buf(),
                reasons: reasons.clone(),
            });
            return Ok(Verdict::Queue { reasons });
        }
    };

    let video_codec = info.video_codec();
    let limit = size_limit_bytes(policy.max_file_size_gb);
    let codec_ok = video_codec == Some(policy.target_codec.as_str());
    let size_ok = info.size_bytes < limit;

    if codec_ok && size_ok {
        log.append(path)?;
        sink.emit(Event::Passed {
            path: path.to_path_buf(),
        });
        return Ok(Verdict::Pass);
    }

    let mut reasons = Vec::new();
    if !codec_ok {
        reasons.push(format!("codec is {}", video_codec.unwrap_or("none")));
    }
    if !size_ok {
        reasons.push("file size exceeds limit".to_string());
    }
    if reasons.is_empty() {
        reasons.push("unknown".to_string());
    }

    sink.emit(Event::Queued {
        path: path.to_path_buf(),
        reasons: reasons.clone(),
    });
    Ok(Verdict::Queue { reasons })
}
