//! Error type returned by the API clients and the connection.

use http::StatusCode;
use thiserror::Error;

use crate::transport::HttpError;

/// Errors surfaced to callers of [`EventClient`](crate::EventClient),
/// [`EngineClient`](crate::EngineClient), [`Connection`](crate::Connection)
/// and [`FileExporter`](crate::FileExporter).
///
/// HTTP error statuses are not errors at the connection level; only the
/// synchronous create/query helpers turn them into [`Error::NotCreated`]
/// and [`Error::Query`].
#[derive(Debug, Error)]
pub enum Error {
    /// A precondition on the arguments was violated. Raised before any I/O.
    #[error("Invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A synchronous create call did not get a success response.
    #[error("Event not created (HTTP {status}): {message}")]
    NotCreated {
        /// Status returned by the event server
        status: StatusCode,
        /// Server-provided explanation
        message: String,
    },

    /// A synchronous engine query did not get `200 OK`.
    #[error("Query failed (HTTP {status}): {message}")]
    Query {
        /// Status returned by the engine
        status: StatusCode,
        /// Server-provided explanation
        message: String,
    },

    /// Every attempt failed at the transport level.
    #[error("Request failed after {attempts} attempt(s): {last_error}")]
    Timeout {
        /// Number of attempts made
        attempts: u32,
        /// Failure of the final attempt
        #[source]
        last_error: HttpError,
    },

    /// A transport failure that retrying cannot fix.
    #[error("Transport error: {0}")]
    Transport(#[from] HttpError),

    /// The request body could not be encoded.
    #[error("Failed to serialize request body: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The response body could not be decoded.
    #[error("Failed to decode response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The connection's async runtime could not be started.
    #[error("Failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),

    /// A spawned request panicked or was cancelled before completing.
    #[error("Async request did not complete: {0}")]
    TaskFailed(String),

    /// `send_feedback` was called on an engine client without an event client.
    #[error("Feedback is not enabled; attach an event client with `with_feedback`")]
    FeedbackDisabled,

    /// Writing exported events failed.
    #[error("Export I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;
