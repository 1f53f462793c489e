//! Validated configuration after merging CLI and TOML sources.
//!
//! This module contains the final, validated configuration that is used
//! by the application. All validation is performed during construction.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use url::Url;

use crate::error::Error;
use crate::transport::{Connection, ConnectionBuilder, ReqwestClient, RetryPolicy};

use super::cli::Cli;
use super::defaults;
use super::error::{ConfigError, field};
use super::toml::TomlConfig;

/// Fully validated configuration ready for use by the application.
///
/// # Construction
///
/// Use [`ValidatedConfig::from_raw`] to create from CLI args and optional TOML config.
/// The function validates all inputs and returns errors for invalid configurations.
#[derive(Debug)]
pub struct ValidatedConfig {
    /// Event server URL
    pub event_url: Url,

    /// Engine URL
    pub engine_url: Url,

    /// Access key; only event commands need one
    pub access_key: Option<String>,

    /// Per-request timeout
    pub timeout: Duration,

    /// Worker threads of each connection runtime
    pub worker_threads: usize,

    /// Retry policy for transport failures
    pub retry_policy: RetryPolicy,

    /// Verbose logging enabled
    pub verbose: bool,
}

impl fmt::Display for ValidatedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Config {{ url: {}, engine_url: {}, access_key: {}, timeout: {}s, workers: {}, \
             retry: {}x/{}ms }}",
            self.event_url,
            self.engine_url,
            if self.access_key.is_some() { "set" } else { "none" },
            self.timeout.as_secs(),
            self.worker_threads,
            self.retry_policy.max_attempts,
            self.retry_policy.initial_delay.as_millis(),
        )
    }
}

impl ValidatedConfig {
    /// Creates a validated configuration from CLI arguments and optional TOML config.
    ///
    /// CLI arguments take precedence over TOML config values, which take
    /// precedence over built-in defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - A URL is invalid
    /// - The timeout is zero
    /// - The worker thread count is zero
    /// - Retry values are out of range
    pub fn from_raw(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Self, ConfigError> {
        let event_url = resolve_url(
            cli.url.as_deref(),
            toml.and_then(|t| t.server.url.as_deref()),
            defaults::EVENT_URL,
        )?;

        let engine_url = resolve_url(
            cli.engine_url.as_deref(),
            toml.and_then(|t| t.engine.url.as_deref()),
            defaults::ENGINE_URL,
        )?;

        let access_key = cli
            .access_key
            .clone()
            .or_else(|| toml.and_then(|t| t.server.access_key.clone()))
            .filter(|key| !key.trim().is_empty());

        let timeout = Self::resolve_timeout(cli, toml)?;
        let worker_threads = Self::resolve_worker_threads(toml)?;
        let retry_policy = Self::build_retry_policy(cli, toml)?;

        Ok(Self {
            event_url,
            engine_url,
            access_key,
            timeout,
            worker_threads,
            retry_policy,
            verbose: cli.verbose,
        })
    }

    /// Loads and merges configuration from CLI and optional config file.
    ///
    /// If `cli.config` is set, loads the TOML file from that path. A leading
    /// `~` in the path is expanded to the home directory.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The config file cannot be read or parsed
    /// - The merged configuration is invalid
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let toml = if let Some(ref path) = cli.config {
            Some(TomlConfig::load(&expand_home(path))?)
        } else {
            None
        };

        Self::from_raw(cli, toml.as_ref())
    }

    /// Returns the access key or explains how to provide one.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::MissingRequired`] if no access key was given.
    pub fn require_access_key(&self) -> Result<&str, ConfigError> {
        self.access_key.as_deref().ok_or_else(|| {
            ConfigError::missing(
                field::ACCESS_KEY,
                "Use --access-key or set server.access_key in config file",
            )
        })
    }

    /// Opens a connection to the event server.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Transport`] if the HTTP client cannot be built and
    /// [`Error::Runtime`] if the runtime cannot be started.
    pub fn event_connection(&self) -> Result<Connection, Error> {
        self.connection(self.event_url.clone())
    }

    /// Opens a connection to the engine.
    ///
    /// # Errors
    ///
    /// Same as [`event_connection`](Self::event_connection).
    pub fn engine_connection(&self) -> Result<Connection, Error> {
        self.connection(self.engine_url.clone())
    }

    fn connection(&self, base_url: Url) -> Result<Connection, Error> {
        let client = ReqwestClient::with_timeout(self.timeout)?;

        ConnectionBuilder::new(client, base_url)
            .with_retry_policy(self.retry_policy.clone())
            .with_worker_threads(self.worker_threads)
            .build()
    }

    fn resolve_timeout(cli: &Cli, toml: Option<&TomlConfig>) -> Result<Duration, ConfigError> {
        // Priority: CLI explicit > TOML > default
        let seconds = cli
            .timeout
            .or_else(|| toml.and_then(|t| t.connection.timeout))
            .unwrap_or(defaults::TIMEOUT_SECS);

        if seconds == 0 {
            return Err(ConfigError::InvalidDuration {
                field: "timeout",
                reason: "must be greater than 0".to_string(),
            });
        }

        Ok(Duration::from_secs(seconds))
    }

    fn resolve_worker_threads(toml: Option<&TomlConfig>) -> Result<usize, ConfigError> {
        let workers = toml
            .and_then(|t| t.connection.worker_threads)
            .unwrap_or(defaults::WORKER_THREADS);

        if workers == 0 {
            return Err(ConfigError::InvalidWorkerThreads);
        }

        Ok(workers)
    }

    fn build_retry_policy(
        cli: &Cli,
        toml: Option<&TomlConfig>,
    ) -> Result<RetryPolicy, ConfigError> {
        let retry = toml.map(|t| &t.retry);

        // Priority: CLI explicit > TOML > default
        let max_attempts = cli
            .retry_max
            .or_else(|| retry.and_then(|r| r.max_attempts))
            .unwrap_or(defaults::RETRY_MAX_ATTEMPTS);

        let initial_delay_ms = cli
            .retry_delay
            .or_else(|| retry.and_then(|r| r.initial_delay))
            .unwrap_or(defaults::RETRY_INITIAL_DELAY_MS);

        let max_delay_ms = retry
            .and_then(|r| r.max_delay)
            .unwrap_or(defaults::RETRY_MAX_DELAY_MS);

        let multiplier = retry
            .and_then(|r| r.multiplier)
            .unwrap_or(defaults::RETRY_MULTIPLIER);

        if max_attempts == 0 {
            return Err(ConfigError::InvalidRetry(
                "max_attempts must be greater than 0".to_string(),
            ));
        }

        if multiplier <= 0.0 || !multiplier.is_finite() {
            return Err(ConfigError::InvalidRetry(
                "multiplier must be a positive finite number".to_string(),
            ));
        }

        if max_delay_ms < initial_delay_ms {
            return Err(ConfigError::InvalidRetry(format!(
                "max_delay ({max_delay_ms}ms) must be >= initial_delay ({initial_delay_ms}ms)"
            )));
        }

        Ok(RetryPolicy::new()
            .with_max_attempts(max_attempts)
            .with_initial_delay(Duration::from_millis(initial_delay_ms))
            .with_max_delay(Duration::from_millis(max_delay_ms))
            .with_multiplier(multiplier))
    }
}

/// Writes the default configuration template to a file.
///
/// A leading `~` in `path` is expanded to the home directory.
///
/// # Errors
///
/// Returns an error if the file cannot be written.
pub fn write_default_config(path: &Path) -> Result<(), ConfigError> {
    let path = expand_home(path);
    let template = super::toml::default_config_template();
    std::fs::write(&path, template).map_err(|e| ConfigError::FileWrite { path, source: e })
}

/// Replaces a leading `~` component with the user's home directory.
///
/// Paths without one, or systems without a home directory, are returned
/// unchanged.
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Ok(rest) = path.strip_prefix("~") else {
        return path.to_path_buf();
    };

    dirs::home_dir().map_or_else(|| path.to_path_buf(), |home| home.join(rest))
}

fn resolve_url(
    cli: Option<&str>,
    toml: Option<&str>,
    default: &'static str,
) -> Result<Url, ConfigError> {
    let url_str = cli.or(toml).unwrap_or(default);

    let url = Url::parse(url_str).map_err(|e| ConfigError::InvalidUrl {
        url: url_str.to_string(),
        reason: e.to_string(),
    })?;

    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConfigError::InvalidUrl {
            url: url_str.to_string(),
            reason: "scheme must be http or https".to_string(),
        });
    }

    Ok(url)
}
