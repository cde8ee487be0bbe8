//! Configuration for the transcode watchdog
//!
//! Loads the policy configuration from a TOML file once at startup and
//! applies environment variable overrides.

pub mod config;

pub use config::{
    Config, ConfigError, EncoderConfig, LibraryConfig, PolicyConfig, StagingConfig, StateConfig,
};
