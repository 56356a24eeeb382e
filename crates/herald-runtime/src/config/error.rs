//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating configuration.
///
/// All of these are startup-time failures and abort process start.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The connection token is absent or empty.
    #[error("connection token is not set; set `token` in herald.toml or the HERALD_TOKEN environment variable")]
    MissingToken,

    /// An explicitly requested configuration file does not exist.
    #[error("configuration file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// The configuration sources could not be parsed or merged.
    #[error("failed to parse configuration: {0}")]
    Parse(String),

    /// The merged configuration is semantically invalid.
    #[error("invalid configuration: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Creates a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;
