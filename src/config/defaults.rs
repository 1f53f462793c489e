//! Default values for configuration options.
//!
//! Centralized constants to avoid magic numbers scattered across the codebase.

use std::time::Duration;

use crate::transport::{DEFAULT_WORKER_THREADS, RetryPolicy};

/// Default event server URL.
pub const EVENT_URL: &str = crate::DEFAULT_EVENT_URL;

/// Default engine URL.
pub const ENGINE_URL: &str = crate::DEFAULT_ENGINE_URL;

/// Default per-request timeout in seconds.
pub const TIMEOUT_SECS: u64 = 10;

/// Default number of connection worker threads.
pub const WORKER_THREADS: usize = DEFAULT_WORKER_THREADS;

/// Default maximum number of attempts.
pub const RETRY_MAX_ATTEMPTS: u32 = RetryPolicy::new().max_attempts;

/// Default initial retry delay in milliseconds.
pub const RETRY_INITIAL_DELAY_MS: u64 = 200;

/// Default maximum retry delay in milliseconds.
pub const RETRY_MAX_DELAY_MS: u64 = 5_000;

/// Default retry backoff multiplier.
pub const RETRY_MULTIPLIER: f64 = RetryPolicy::new().multiplier;

/// Default per-request timeout as Duration.
#[must_use]
pub const fn timeout() -> Duration {
    Duration::from_secs(TIMEOUT_SECS)
}

/// Default initial retry delay as Duration.
#[must_use]
pub const fn retry_initial_delay() -> Duration {
    Duration::from_millis(RETRY_INITIAL_DELAY_MS)
}

/// Default maximum retry delay as Duration.
#[must_use]
pub const fn retry_max_delay() -> Duration {
    Duration::from_millis(RETRY_MAX_DELAY_MS)
}
