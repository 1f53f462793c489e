//! `PredictionIO` client library
//!
//! Records user and item events with an event server and queries deployed
//! engines for predictions. Every call can be made blocking or dispatched
//! in the background and resolved later through an [`AsyncResponse`].
//!
//! - [`EventClient`]: event creation, lookup and deletion
//! - [`EngineClient`]: engine queries and prediction feedback
//! - [`FileExporter`]: events written to a file for batch import
//! - [`transport`]: the retrying [`Connection`] underneath both clients

pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod time;
pub mod transport;

pub use engine::EngineClient;
pub use error::{Error, Result};
pub use event::{EventClient, EventOptions, EventQuery, FileExporter};
pub use transport::{AsyncResponse, Connection, Request, Response};

/// Default event server URL.
pub const DEFAULT_EVENT_URL: &str = "http://localhost:7070";

/// Default engine URL.
pub const DEFAULT_ENGINE_URL: &str = "http://localhost:8000";
