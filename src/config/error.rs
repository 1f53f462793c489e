//! Error types for configuration parsing and validation.

use std::path::PathBuf;

use thiserror::Error;

/// Error type for configuration operations.
///
/// Covers errors from parsing, validation, and file operations, as well as
/// malformed command arguments.
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

    /// Missing required field that must be provided by CLI or config file.
    #[error("Missing required field: {field}. {hint}")]
    MissingRequired {
        /// Name of the missing field
        field: &'static str,
        /// Hint for how to provide the value
        hint: &'static str,
    },

    /// Invalid URL provided.
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

    /// Invalid retry configuration.
    #[error("Invalid retry configuration: {0}")]
    InvalidRetry(String),

    /// Invalid worker thread count.
    #[error("Invalid worker thread count: must be greater than 0")]
    InvalidWorkerThreads,

    /// A command argument that should hold JSON does not.
    #[error("Invalid JSON for {field}: {reason}")]
    InvalidJson {
        /// Name of the argument
        field: &'static str,
        /// Parser message
        reason: String,
    },

    /// A command argument that should hold an RFC 3339 timestamp does not.
    #[error("Invalid timestamp for {field} '{value}': {reason}")]
    InvalidTimestamp {
        /// Name of the argument
        field: &'static str,
        /// The rejected value
        value: String,
        /// Parser message
        reason: String,
    },
}

/// Well-known field names for `MissingRequired` errors.
///
/// Use these constants for compile-time safety when matching field names.
pub mod field {
    /// The event server access key.
    pub const ACCESS_KEY: &str = "access_key";
    /// Event properties (`--properties`).
    pub const PROPERTIES: &str = "properties";
    /// Engine query (`query`).
    pub const QUERY: &str = "query";
    /// Event time (`--event-time`).
    pub const EVENT_TIME: &str = "event_time";
    /// Query window start (`--start-time`).
    pub const START_TIME: &str = "start_time";
    /// Query window end (`--until-time`).
    pub const UNTIL_TIME: &str = "until_time";
}

impl ConfigError {
    /// Creates a `MissingRequired` error for a required field.
    #[must_use]
    pub const fn missing(field: &'static str, hint: &'static str) -> Self {
        Self::MissingRequired { field, hint }
    }
}
