//! Core configuration structures and loading logic

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Error type for configuration operations
#[derive(Debug)]
pub enum ConfigError {
    /// IO error reading config file
    Io(std::io::Error),
    /// TOML parsing error
    Parse(toml::de::Error),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(e) => write!(f, "Failed to read config file: {}", e),
            ConfigError::Parse(e) => write!(f, "Failed to parse config: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::Io(e)
    }
}

impl From<toml::de::Error> for ConfigError {
    fn from(e: toml::de::Error) -> Self {
        ConfigError::Parse(e)
    }
}

/// Media library configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LibraryConfig {
    /// Directories to scan for media files
    #[serde(default)]
    pub media_dirs: Vec<PathBuf>,
    /// Recognized file extensions, matched case-insensitively
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
}

fn default_extensions() -> Vec<String> {
    [".mkv", ".mp4", ".avi", ".mov", ".webm"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            media_dirs: Vec::new(),
            extensions: default_extensions(),
        }
    }
}

/// Local staging configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StagingConfig {
    /// Local directory used for staged sources and candidate outputs
    #[serde(default = "default_temp_dir")]
    pub temp_dir: PathBuf,
}

fn default_temp_dir() -> PathBuf {
    PathBuf::from("/tmp/transcoding")
}

impl Default for StagingConfig {
    fn default() -> Self {
        Self {
            temp_dir: default_temp_dir(),
        }
    }
}

/// External encoder preset configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EncoderConfig {
    /// Path to the HandBrake preset file
    #[serde(default = "default_preset_file")]
    pub preset_file: PathBuf,
    /// Name of the preset inside the preset file
    #[serde(default = "default_preset_name")]
    pub preset_name: String,
}

fn default_preset_file() -> PathBuf {
    PathBuf::from("AV1_MKV_Stereo.json")
}

fn default_preset_name() -> String {
    "AV1_MKV_Stereo".to_string()
}

impl Default for EncoderConfig {
    fn default() -> Self {
        Self {
            preset_file: default_preset_file(),
            preset_name: default_preset_name(),
        }
    }
}

/// Encoding policy thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PolicyConfig {
    /// Size threshold in gigabytes; files at or above it are queued
    #[serde(default = "default_max_file_size_gb")]
    pub max_file_size_gb: f64,
    /// Video codec considered already compliant
    #[serde(default = "default_target_codec")]
    pub target_codec: String,
}

fn default_max_file_size_gb() -> f64 {
    25.0
}

fn default_target_codec() -> String {
    "av1".to_string()
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            max_file_size_gb: default_max_file_size_gb(),
            target_codec: default_target_codec(),
        }
    }
}

/// Durable state configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateConfig {
    /// Path of the append-only inspected-files log
    #[serde(default = "default_inspected_log")]
    pub inspected_log: PathBuf,
}

fn default_inspected_log() -> PathBuf {
    PathBuf::from("inspected_files.log")
}

impl Default for StateConfig {
    fn default() -> Self {
        Self {
            inspected_log: default_inspected_log(),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub library: LibraryConfig,
    #[serde(default)]
    pub staging: StagingConfig,
    #[serde(default)]
    pub encoder: EncoderConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
    #[serde(default)]
    pub state: StateConfig,
}

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Missing optional fields and sections fall back to defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::parse_toml(&content)
    }

    /// Parse configuration from a TOML string
    pub fn parse_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    ///
    /// Overrides the following values if environment variables are set:
    /// - WATCHDOG_TEMP_DIR -> staging.temp_dir
    /// - WATCHDOG_TARGET_CODEC -> policy.target_codec
    /// - WATCHDOG_MAX_FILE_SIZE_GB -> policy.max_file_size_gb
    /// - WATCHDOG_INSPECTED_LOG -> state.inspected_log
    pub fn apply_env_overrides(&mut self) {
        if let Ok(val) = env::var("WATCHDOG_TEMP_DIR") {
            if !val.is_empty() {
                self.staging.temp_dir = PathBuf::from(val);
            }
        }

        if let Ok(val) = env::var("WATCHDOG_TARGET_CODEC") {
            if !val.is_empty() {
                self.policy.target_codec = val;
            }
        }

        if let Ok(val) = env::var("WATCHDOG_MAX_FILE_SIZE_GB") {
            if let Ok(gb) = val.parse::<f64>() {
                self.policy.max_file_size_gb = gb;
            }
        }

        if let Ok(val) = env::var("WATCHDOG_INSPECTED_LOG") {
            if !val.is_empty() {
                self.state.inspected_log = PathBuf::from(val);
            }
        }
    }

    /// Load configuration from file and apply environment overrides
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut config = Self::load_from_file(path)?;
        config.apply_env_overrides();
        Ok(config)
    }
}
