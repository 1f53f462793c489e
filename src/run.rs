//! Application execution logic.
//!
//! Runs a single [`Action`] against the event server or the engine using
//! the library's blocking calls.

use std::process::ExitCode;

use http::StatusCode;
use serde_json::Value;
use thiserror::Error;

use predictionio::config::{Action, ConfigError, EngineAction, EventAction, ValidatedConfig};
use predictionio::time::Sleeper;
use predictionio::transport::HttpClient;
use predictionio::{EngineClient, EventClient, Response};

use crate::app::exit_code;

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;

/// Error type for runtime execution failures.
#[derive(Debug, Error)]
pub enum RunError {
    /// The action needs configuration that is missing.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request failed or was rejected.
    #[error(transparent)]
    Api(#[from] predictionio::Error),
}

impl RunError {
    /// Process exit code for this error.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => exit_code::CONFIG_ERROR,
            Self::Api(_) => exit_code::runtime_error(),
        }
    }
}

/// What a command printed: the status line and the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    /// Status line of the response.
    pub status: StatusCode,
    /// Response body, or the pretty-printed prediction.
    pub body: String,
}

impl Outcome {
    fn from_response(response: &Response) -> Self {
        Self {
            status: response.status,
            body: String::from_utf8_lossy(&response.body).into_owned(),
        }
    }

    fn from_prediction(prediction: &Value) -> Self {
        Self {
            status: StatusCode::OK,
            body: serde_json::to_string_pretty(prediction)
                .unwrap_or_else(|_| prediction.to_string()),
        }
    }

    /// Formats the outcome for stdout.
    pub fn render(&self) -> String {
        if self.body.is_empty() {
            self.status.to_string()
        } else {
            format!("{}\n{}", self.status, self.body)
        }
    }
}

/// Executes one action with clients built from `config`.
///
/// # Errors
///
/// Returns [`RunError::Config`] if the access key is required but missing,
/// and [`RunError::Api`] if the call fails.
#[cfg(not(tarpaulin_include))]
pub fn execute(config: &ValidatedConfig, action: Action) -> Result<Outcome, RunError> {
    let needs_key = action.needs_access_key();

    match action {
        Action::Events(action) => {
            let access_key = if needs_key {
                config.require_access_key()?
            } else {
                config.access_key.as_deref().unwrap_or_default()
            };
            let events = EventClient::from_connection(access_key, config.event_connection()?);
            Ok(run_events(&events, action)?)
        }
        Action::Engine(action) => {
            let engine = EngineClient::from_connection(config.engine_connection()?);
            Ok(run_engine(&engine, action)?)
        }
    }
}

/// Runs an event server action.
fn run_events<H, S>(
    events: &EventClient<H, S>,
    action: EventAction,
) -> Result<Outcome, predictionio::Error>
where
    H: HttpClient + 'static,
    S: Sleeper + 'static,
{
    let response = match action {
        EventAction::Status => events.get_status()?,
        EventAction::CreateEvent {
            event,
            entity_type,
            entity_id,
            options,
        } => {
            tracing::info!(
                event = %event,
                entity_type = %entity_type,
                entity_id = %entity_id,
                "Creating event"
            );
            events.create_event(&event, &entity_type, &entity_id, &options)?
        }
        EventAction::DeleteEvent { id } => events.delete_event(&id)?,
        EventAction::GetEvent { id } => events.get_event(&id)?,
        EventAction::FindEvents { query } => events.find_events(&query)?,
    };

    if !response.is_success() {
        tracing::warn!(status = %response.status, "Event server returned an error status");
    }

    Ok(Outcome::from_response(&response))
}

/// Runs an engine action.
fn run_engine<H, S>(
    engine: &EngineClient<H, S>,
    action: EngineAction,
) -> Result<Outcome, predictionio::Error>
where
    H: HttpClient + 'static,
    S: Sleeper + 'static,
{
    match action {
        EngineAction::Status => Ok(Outcome::from_response(&engine.get_status()?)),
        EngineAction::Query { query } => {
            let prediction = engine.send_query(&query)?;
            Ok(Outcome::from_prediction(&prediction))
        }
    }
}
