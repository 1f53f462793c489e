//! Transport layer: requests, responses, and the retrying connection.
//!
//! This module provides:
//! - Path-level request values built by the API clients ([`Request`])
//! - Resolved HTTP requests and buffered responses ([`HttpRequest`], [`Response`])
//! - The HTTP client abstraction and its reqwest implementation
//!   ([`HttpClient`], [`ReqwestClient`])
//! - Retry policy configuration ([`RetryPolicy`])
//! - Blocking and async dispatch ([`Connection`], [`AsyncResponse`])

mod client;
mod connection;
mod error;
mod http;
mod request;
mod retry;

#[cfg(test)]
pub(crate) mod test_fixtures;

#[cfg(test)]
mod connection_tests;
#[cfg(test)]
mod http_tests;
#[cfg(test)]
mod retry_tests;

pub use client::ReqwestClient;
pub use connection::{AsyncResponse, Connection, ConnectionBuilder, DEFAULT_WORKER_THREADS};
pub use error::HttpError;
pub use http::{HttpClient, HttpRequest, Response};
pub use request::Request;
pub use retry::RetryPolicy;
