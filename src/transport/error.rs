//! Transport-level error type.

use thiserror::Error;

/// Error type for a single HTTP round-trip.
///
/// Describes what went wrong on the wire. HTTP status codes are never
/// represented here: a 4xx/5xx reply is a successful round-trip and comes
/// back as a [`Response`](super::Response).
#[derive(Debug, Error)]
pub enum HttpError {
    /// Network connection failed.
    ///
    /// This includes DNS resolution failures, connection refused,
    /// resets, and failures while reading the response body.
    #[error("Connection error: {0}")]
    Connection(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// The server did not respond within the configured timeout.
    #[error("Request timed out")]
    Timeout,

    /// The request URL could not be built or was rejected by the client.
    ///
    /// This indicates a configuration error rather than a transient failure.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

impl HttpError {
    /// Returns true if the failure is transient and the same request may be
    /// attempted again.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::InvalidUrl(_) => false,
        }
    }
}
