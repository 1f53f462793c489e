//! TOML configuration file parsing.
//!
//! Defines the structure of the configuration file with serde.

use std::path::Path;

use serde::Deserialize;

use super::ConfigError;

/// Root configuration structure from TOML file.
///
/// All fields are optional to allow partial configuration
/// that can be merged with CLI arguments.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    /// Event server section
    #[serde(default)]
    pub server: ServerSection,

    /// Engine section
    #[serde(default)]
    pub engine: EngineSection,

    /// Connection tuning
    #[serde(default)]
    pub connection: ConnectionSection,

    /// Retry policy configuration
    #[serde(default)]
    pub retry: RetrySection,
}

/// Event server section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerSection {
    /// Event server URL
    pub url: Option<String>,

    /// Access key of the app
    pub access_key: Option<String>,
}

/// Engine section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EngineSection {
    /// Engine URL
    pub url: Option<String>,
}

/// Connection tuning section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConnectionSection {
    /// Per-request timeout in seconds
    pub timeout: Option<u64>,

    /// Worker threads of the connection runtime
    pub worker_threads: Option<usize>,
}

/// Retry policy configuration section.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetrySection {
    /// Maximum number of attempts
    pub max_attempts: Option<u32>,

    /// Initial retry delay in milliseconds
    pub initial_delay: Option<u64>,

    /// Maximum retry delay in milliseconds
    pub max_delay: Option<u64>,

    /// Backoff multiplier
    pub multiplier: Option<f64>,
}

impl TomlConfig {
    /// Loads configuration from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.to_path_buf(),
            source: e,
        })?;

        Self::parse(&content)
    }

    /// Parses configuration from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns an error if the TOML is invalid.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(ConfigError::from)
    }
}

/// Generates a default configuration file with comments.
#[must_use]
pub fn default_config_template() -> String {
    r#"# pio configuration file

[server]
# Event server URL (default: http://localhost:7070)
# url = "http://localhost:7070"

# Access key of the app events are recorded for
# (required by create-event, delete-event, get-event, find-events)
# access_key = "your-access-key"

[engine]
# Engine URL (default: http://localhost:8000)
# url = "http://localhost:8000"

[connection]
# Per-request timeout in seconds (default: 10)
timeout = 10

# Worker threads used to run requests (default: 1)
# worker_threads = 1

[retry]
# Maximum number of attempts per request, the first one included (default: 3)
# max_attempts = 3

# Initial retry delay in milliseconds (default: 200)
# initial_delay = 200

# Maximum retry delay in milliseconds (default: 5000)
# max_delay = 5000

# Backoff multiplier (default: 2.0)
# multiplier = 2.0
"#
    .to_string()
}
