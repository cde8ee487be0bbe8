//! Metadata prober for media files.
//!
//! Wraps ffprobe behind the [`Prober`] trait so the pipeline's decision
//! logic can be exercised with fakes. The real implementation runs
//! `ffprobe -v quiet -print_format json -show_format -show_streams` and
//! parses the JSON output.

use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use thiserror::Error;

/// Error type for probe operations.
#[derive(Debug, Error)]
pub enum ProbeError {
    /// ffprobe exited with a non-zero status.
    #[error("ffprobe failed: {0}")]
    FfprobeFailed(String),

    /// Failed to parse ffprobe JSON output.
    #[error("Failed to parse ffprobe output: {0}")]
    ParseError(String),

    /// Health probe reported a corrupt file.
    #[error("Health check failed for {0}")]
    HealthCheckFailed(String),

    /// IO error during probe.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Kind of a media stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamKind {
    Video,
    Audio,
    Subtitle,
    Other,
}

/// A single stream reported by the prober.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamInfo {
    pub kind: StreamKind,
    /// Codec name, when the prober reports one.
    pub codec_name: Option<String>,
}

/// Per-kind stream counts of a probed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StreamCounts {
    pub video: usize,
    pub audio: usize,
    pub subtitle: usize,
}

/// Metadata of a probed media file. Recomputed on every probe, never
/// persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaInfo {
    /// Streams in container order.
    pub streams: Vec<StreamInfo>,
    /// Container duration in seconds.
    pub duration_secs: f64,
    /// Container size in bytes.
    pub size_bytes: u64,
}

impl MediaInfo {
    /// Codec of the first video stream, if any.
    pub fn video_codec(&self) -> Option<&str> {
        self.streams
            .iter()
            .find(|s| s.kind == StreamKind::Video)
            .and_then(|s| s.codec_name.as_deref())
    }

    /// Counts streams per kind.
    pub fn stream_counts(&self) -> StreamCounts {
        let mut counts = StreamCounts::default();
        for stream in &self.streams {
            match stream.kind {
                StreamKind::Video => counts.video += 1,
                StreamKind::Audio => counts.audio += 1,
                StreamKind::Subtitle => counts.subtitle += 1,
                StreamKind::Other => {}
            }
        }
        counts
    }
}

/// Capability for probing media metadata.
///
/// The pipeline only ever talks to this trait; [`FfprobeProber`] is the
/// production implementation.
pub trait Prober {
    /// Full metadata probe. Non-zero exit or unparseable output is an error.
    fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError>;

    /// Cheap decode-level health probe. An error means the file is
    /// considered corrupt.
    fn health_check(&self, path: &Path) -> Result<(), ProbeError>;
}

/// Raw ffprobe JSON structures for parsing.
mod ffprobe_json {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct FfprobeOutput {
        pub streams: Option<Vec<Stream>>,
        pub format: Option<Format>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Stream {
        pub codec_type: Option<String>,
        pub codec_name: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Format {
        pub duration: Option<super::StringOrNumber>,
        pub size: Option<super::StringOrNumber>,
    }
}

/// ffprobe emits numeric format fields as strings, but other probers (and
/// older builds) emit bare numbers. Accept both.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum StringOrNumber {
    String(String),
    Number(f64),
}

impl StringOrNumber {
    fn as_f64(&self) -> Option<f64> {
        match self {
            StringOrNumber::String(s) => s.parse().ok(),
            StringOrNumber::Number(n) => Some(*n),
        }
    }

    /// Exact integer reading. The string branch goes through `u64`
    /// directly; sizes above 2^53 bytes would lose precision in `f64`.
    fn as_u64(&self) -> Option<u64> {
        match self {
            StringOrNumber::String(s) => s.parse().ok(),
            StringOrNumber::Number(n) => Some(*n as u64),
        }
    }
}

/// Parses ffprobe JSON output into a [`MediaInfo`].
pub fn parse_ffprobe_output(json_str: &str) -> Result<MediaInfo, ProbeError> {
    let ffprobe: ffprobe_json::FfprobeOutput =
        serde_json::from_str(json_str).map_err(|e| ProbeError::ParseError(e.to_string()))?;

    let format = ffprobe.format.ok_or_else(|| {
        ProbeError::ParseError("Missing format information in ffprobe output".to_string())
    })?;

    let streams = ffprobe
        .streams
        .unwrap_or_default()
        .into_iter()
        .map(|stream| {
            let kind = match stream.codec_type.as_deref() {
                Some("video") => StreamKind::Video,
                Some("audio") => StreamKind::Audio,
                Some("subtitle") => StreamKind::Subtitle,
                _ => StreamKind::Other,
            };
            StreamInfo {
                kind,
                codec_name: stream.codec_name,
            }
        })
        .collect();

    let duration_secs = format
        .duration
        .as_ref()
        .and_then(StringOrNumber::as_f64)
        .unwrap_or(0.0);

    let size_bytes = format
        .size
        .as_ref()
        .and_then(StringOrNumber::as_u64)
        .unwrap_or(0);

    Ok(MediaInfo {
        streams,
        duration_secs,
        size_bytes,
    })
}

/// Prober implementation that spawns ffprobe.
#[derive(Debug, Default)]
pub struct FfprobeProber;

impl Prober for FfprobeProber {
    fn probe(&self, path: &Path) -> Result<MediaInfo, ProbeError> {
        log::debug!("Running: ffprobe -v quiet -print_format json -show_format -show_streams {}", path.display());
        let output = Command::new("ffprobe")
            .args([
                "-v",
                "quiet",
                "-print_format",
                "json",
                "-show_format",
                "-show_streams",
            ])
            .arg(path)
            .output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(ProbeError::FfprobeFailed(format!(
                "ffprobe exited with status {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_ffprobe_output(&stdout)
    }

    fn health_check(&self, path: &Path) -> Result<(), ProbeError> {
        log::debug!("Running: ffprobe -v error -hide_banner {}", path.display());
        let output = Command::new("ffprobe")
            .args(["-v", "error", "-hide_banner"])
            .arg(path)
            .output()?;

        if !output.status.success() {
            return Err(ProbeError::HealthCheckFailed(
                path.display().to_string(),
            ));
        }

        Ok(())
    }
}
