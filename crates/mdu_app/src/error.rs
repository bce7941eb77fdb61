//! Error types for mdu_app

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading page configuration
///
/// Configuration is read before the page session starts, so this is the only
/// error type that reaches the host.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the configuration file
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML for this schema
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Values parsed but are out of range or inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Result type for mdu_app operations
pub type Result<T> = std::result::Result<T, ConfigError>;
