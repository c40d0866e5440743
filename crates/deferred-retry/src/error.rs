//! Configuration error types.
//!
//! The retry engine has no error type of its own: a session that gives up
//! returns the operation's last error unchanged.

use thiserror::Error;

/// Result type for configuration operations
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors produced while loading or validating a [`RetryConfig`](crate::RetryConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The TOML document could not be parsed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// The JSON document could not be parsed
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// The configuration parsed but its values are inconsistent
    #[error("Invalid retry configuration: {0}")]
    Invalid(String),
}
