//! Verifier: checks a candidate against its original before replacement.
//!
//! Order matters: a cheap decode-level health probe on the candidate
//! alone, then full probes of both files. Verification fails closed on
//! any unreadable metadata.

use crate::events::{Event, EventSink};
use crate::probe::{ProbeError, Prober, StreamCounts};
use std::path::Path;

/// Maximum tolerated duration difference between original and candidate.
const DURATION_TOLERANCE_SECS: f64 = 1.0;

/// Comparison of a candidate against its original. Derived per
/// verification, never persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct VerificationReport {
    /// Absolute duration difference in seconds.
    pub duration_delta: f64,
    pub source_counts: StreamCounts,
    pub candidate_counts: StreamCounts,
}

impl VerificationReport {
    /// Subtitle track count change (candidate minus original). Never
    /// fatal on its own.
    pub fn subtitle_delta(&self) -> i64 {
        self.candidate_counts.subtitle as i64 - self.source_counts.subtitle as i64
    }

    /// Whether the candidate is an acceptable stand-in for the original.
    pub fn passed(&self) -> bool {
        self.duration_delta <= DURATION_TOLERANCE_SECS
            && (self.source_counts.video, self.source_counts.audio)
                == (self.candidate_counts.video, self.candidate_counts.audio)
    }
}

/// Verify a candidate against the staged original.
///
/// An `Err` means metadata could not be read or the candidate failed the
/// health probe; both fail verification. A subtitle-count change is
/// recorded on the event sink but does not fail the report.
pub fn verify(
    prober: &dyn Prober,
    sink: &dyn EventSink,
    original: &Path,
    candidate: &Path,
) -> Result<VerificationReport, ProbeError> {
    prober.health_check(candidate)?;

    let original_info = prober.probe(original)?;
    let candidate_info = prober.probe(candidate)?;

    let report = VerificationReport {
        duration_delta: (original_info.duration_secs - candidate_info.duration_secs).abs(),
        source_counts: original_info.stream_counts(),
        candidate_counts: candidate_info.stream_counts(),
    };

    if report.subtitle_delta() != 0 {
        sink.emit(Event::SubtitleCountChanged {
            path: candidate.to_path_buf(),
            original: report.source_counts.subtitle,
            candidate: report.candidate_counts.subtitle,
        });
    }

    if !report.passed() {
        log::error!(
            "Verification mismatch for {}: duration delta {:.3}s, orig(v{},a{}) vs new(v{},a{})",
            candidate.display(),
            report.duration_delta,
            report.source_counts.video,
            report.source_counts.audio,
            report.candidate_counts.video,
            report.candidate_counts.audio
        );
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MemorySink;
    use crate::probe::{MediaInfo, StreamInfo, StreamKind};
    use std::collections::HashMap;
    use std::path::PathBuf;

    /// Prober fake keyed by path.
    struct MapProber {
        infos: HashMap<PathBuf, MediaInfo>,
        healthy: bool,
    }

    impl Prober for MapProber {
        fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
            self.infos
                .get(path)
                .cloned()
                .ok_or_else(|| ProbeError::FfprobeFailed("no such file".to_string()))
        }

        fn health_check(&self, path: &Path) -> Result<(), ProbeError> {
            if self.healthy {
                Ok(())
            } else {
                Err(ProbeError::HealthCheckFailed(path.display().to_string()))
            }
        }
    }

    fn make_info(duration: f64, video: usize, audio: usize, subtitle: usize) -> MediaInfo {
        let mut streams = Vec::new();
        for _ in 0..video {
            streams.push(StreamInfo {
                kind: StreamKind::Video,
                codec_name: Some("av1".to_string()),
            });
        }
        for _ in 0..audio {
            streams.push(StreamInfo {
                kind: StreamKind::Audio,
                codec_name: Some("opus".to_string()),
            });
        }
        for _ in 0..subtitle {
            streams.push(StreamInfo {
                kind: StreamKind::Subtitle,
                codec_name: Some("subrip".to_string()),
            });
        }
        MediaInfo {
            streams,
            duration_secs: duration,
            size_bytes: 1_000_000,
        }
    }

    fn make_prober(original: MediaInfo, candidate: MediaInfo) -> MapProber {
        let mut infos = HashMap::new();
        infos.insert(PathBuf::from("/tmp/orig.mkv"), original);
        infos.insert(PathBuf::from("/tmp/cand.mkv"), candidate);
        MapProber {
            infos,
            healthy: true,
        }
    }

    fn run(prober: &MapProber, sink: &MemorySink) -> Result<VerificationReport, ProbeError> {
        verify(
            prober,
            sink,
            Path::new("/tmp/orig.mkv"),
            Path::new("/tmp/cand.mkv"),
        )
    }

    #[test]
    fn test_duration_within_tolerance_passes() {
        let prober = make_prober(make_info(3600.0, 1, 2, 0), make_info(3600.9, 1, 2, 0));
        let report = run(&prober, &MemorySink::new()).unwrap();
        assert!(report.passed());
    }

    #[test]
    fn test_duration_over_tolerance_fails() {
        let prober = make_prober(make_info(3600.0, 1, 2, 0), make_info(3601.1, 1, 2, 0));
        let report = run(&prober, &MemorySink::new()).unwrap();
        assert!(!report.passed());
    }

    #[test]
    fn test_subtitle_only_change_passes_but_is_recorded() {
        let prober = make_prober(make_info(3600.0, 1, 2, 3), make_info(3600.0, 1, 2, 0));
        let sink = MemorySink::new();
        let report = run(&prober, &sink).unwrap();

        assert!(report.passed());
        assert_eq!(report.subtitle_delta(), -3);

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert!(matches!(
            events[0],
            Event::SubtitleCountChanged {
                original: 3,
                candidate: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_audio_count_change_fails() {
        let prober = make_prober(make_info(3600.0, 1, 2, 3), make_info(3600.0, 1, 1, 3));
        let report = run(&prober, &MemorySink::new()).unwrap();
        assert!(!report.passed());
    }

    #[test]
    fn test_video_count_change_fails() {
        let prober = make_prober(make_info(3600.0, 1, 2, 0), make_info(3600.0, 0, 2, 0));
        let report = run(&prober, &MemorySink::new()).unwrap();
        assert!(!report.passed());
    }

    #[test]
    fn test_health_check_failure_is_an_error() {
        let mut prober = make_prober(make_info(10.0, 1, 1, 0), make_info(10.0, 1, 1, 0));
        prober.healthy = false;

        let result = run(&prober, &MemorySink::new());
        assert!(matches!(result, Err(ProbeError::HealthCheckFailed(_))));
    }

    #[test]
    fn test_unreadable_metadata_is_an_error() {
        // Candidate probe is missing from the map entirely.
        let mut infos = HashMap::new();
        infos.insert(PathBuf::from("/tmp/orig.mkv"), make_info(10.0, 1, 1, 0));
        let prober = MapProber {
            infos,
            healthy: true,
        };

        let result = run(&prober, &MemorySink::new());
        assert!(result.is_err());
    }

    #[test]
    fn test_matching_subtitles_emit_no_event() {
        let prober = make_prober(make_info(3600.0, 1, 2, 2), make_info(3600.0, 1, 2, 2));
        let sink = MemorySink::new();
        let report = run(&prober, &sink).unwrap();

        assert!(report.passed());
        assert!(sink.events().is_empty());
    }
}
