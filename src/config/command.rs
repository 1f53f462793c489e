//! Command arguments checked and converted into library values.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::event::{EventOptions, EventQuery};

use super::cli::{Command, CreateEventArgs, FindEventsArgs};
use super::error::{ConfigError, field};

/// A command ready to run, routed to the service it talks to.
///
/// `init` is handled before configuration is loaded and has no action.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    Events(EventAction),
    Engine(EngineAction),
}

/// A call against the event server.
#[derive(Debug, Clone, PartialEq)]
pub enum EventAction {
    /// `GET /`.
    Status,

    /// Create one event.
    CreateEvent {
        event: String,
        entity_type: String,
        entity_id: String,
        options: EventOptions,
    },

    DeleteEvent { id: String },

    GetEvent { id: String },

    FindEvents { query: EventQuery },
}

/// A call against the engine.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineAction {
    /// `GET /`.
    Status,

    /// Send a query.
    Query { query: Value },
}

impl Action {
    /// Converts a parsed command into an action.
    ///
    /// Returns `Ok(None)` for `init`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidJson`] or
    /// [`ConfigError::InvalidTimestamp`] for malformed arguments.
    pub fn from_command(command: &Command) -> Result<Option<Self>, ConfigError> {
        let action = match command {
            Command::Init { .. } => return Ok(None),
            Command::Status { engine: true } => Self::Engine(EngineAction::Status),
            Command::Status { engine: false } => Self::Events(EventAction::Status),
            Command::CreateEvent(args) => Self::Events(create_event(args)?),
            Command::DeleteEvent { id } => Self::Events(EventAction::DeleteEvent { id: id.clone() }),
            Command::GetEvent { id } => Self::Events(EventAction::GetEvent { id: id.clone() }),
            Command::FindEvents(args) => Self::Events(EventAction::FindEvents {
                query: find_events(args)?,
            }),
            Command::Query { query } => Self::Engine(EngineAction::Query {
                query: parse_json(field::QUERY, query)?,
            }),
        };

        Ok(Some(action))
    }

    /// Returns true if the action needs the event server access key.
    #[must_use]
    pub const fn needs_access_key(&self) -> bool {
        matches!(self, Self::Events(action) if !matches!(action, EventAction::Status))
    }
}

fn create_event(args: &CreateEventArgs) -> Result<EventAction, ConfigError> {
    let mut options = EventOptions::new();

    if let Some(raw) = &args.properties {
        options.properties = Some(parse_object(field::PROPERTIES, raw)?);
    }
    if let Some(raw) = &args.event_time {
        options.event_time = Some(parse_time(field::EVENT_TIME, raw)?);
    }
    options.target_entity_type.clone_from(&args.target_entity_type);
    options.target_entity_id.clone_from(&args.target_entity_id);
    options.pr_id.clone_from(&args.pr_id);

    Ok(EventAction::CreateEvent {
        event: args.event.clone(),
        entity_type: args.entity_type.clone(),
        entity_id: args.entity_id.clone(),
        options,
    })
}

fn find_events(args: &FindEventsArgs) -> Result<EventQuery, ConfigError> {
    Ok(EventQuery {
        start_time: args
            .start_time
            .as_deref()
            .map(|raw| parse_time(field::START_TIME, raw))
            .transpose()?,
        until_time: args
            .until_time
            .as_deref()
            .map(|raw| parse_time(field::UNTIL_TIME, raw))
            .transpose()?,
        entity_type: args.entity_type.clone(),
        entity_id: args.entity_id.clone(),
        events: args.events.clone(),
        target_entity_type: args.target_entity_type.clone(),
        target_entity_id: args.target_entity_id.clone(),
        limit: args.limit,
        reversed: args.reversed.then_some(true),
        extra: Vec::new(),
    })
}

fn parse_json(field: &'static str, raw: &str) -> Result<Value, ConfigError> {
    serde_json::from_str(raw).map_err(|e| ConfigError::InvalidJson {
        field,
        reason: e.to_string(),
    })
}

fn parse_object(field: &'static str, raw: &str) -> Result<Map<String, Value>, ConfigError> {
    match parse_json(field, raw)? {
        Value::Object(map) => Ok(map),
        _ => Err(ConfigError::InvalidJson {
            field,
            reason: "expected a JSON object".to_string(),
        }),
    }
}

fn parse_time(field: &'static str, raw: &str) -> Result<DateTime<FixedOffset>, ConfigError> {
    DateTime::parse_from_rfc3339(raw).map_err(|e| ConfigError::InvalidTimestamp {
        field,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
