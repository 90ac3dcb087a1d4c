//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("Failed to read config file '{}': {source}", path.display())]
    FileRead {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse the TOML configuration.
    #[error("Failed to parse TOML config: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// Failed to write configuration file (for init command).
    #[error("Failed to write config file '{}': {source}", path.display())]
    FileWrite {
        /// Path to the config file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// A source URL is not an absolute http(s) URL.
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl {
        /// The invalid URL string
        url: String,
        /// Reason for invalidity
        reason: String,
    },

    /// Invalid duration value (zero or too large).
    #[error("Invalid duration for {field}: {reason}")]
    InvalidDuration {
        /// Name of the field
        field: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Jitter bounds given in the wrong order.
    #[error("Invalid jitter range: jitter_min ({min}s) must be <= jitter_max ({max}s)")]
    InvalidJitter {
        /// Lower bound in seconds
        min: i64,
        /// Upper bound in seconds
        max: i64,
    },

    /// A text field that must not be empty was empty.
    #[error("{field} must not be empty")]
    EmptyValue {
        /// Name of the field
        field: &'static str,
    },

    /// Invalid notification template (Handlebars syntax error).
    #[error("Invalid notification template: {reason}")]
    InvalidTemplate {
        /// Reason for invalidity
        reason: String,
    },
}
