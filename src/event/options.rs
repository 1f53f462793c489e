//! Recognized optional fields of events and event queries.

use chrono::{DateTime, FixedOffset};
use serde_json::{Map, Value};

use crate::time::format_timestamp;

/// Optional fields of an event.
///
/// Every field defaults to absent. An absent `event_time` is filled in
/// with the client's clock at call time; absent fields are omitted from the
/// request body.
///
/// # Example
///
/// ```
/// use predictionio::EventOptions;
///
/// let options = EventOptions::new()
///     .with_property("gender", "female")
///     .with_property("age", 28);
///
/// assert_eq!(options.properties.as_ref().map(|p| p.len()), Some(2));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventOptions {
    /// When the event happened; defaults to now.
    pub event_time: Option<DateTime<FixedOffset>>,

    /// Free-form event properties.
    pub properties: Option<Map<String, Value>>,

    /// Type of the entity acted upon (e.g. `item`).
    pub target_entity_type: Option<String>,

    /// Id of the entity acted upon.
    pub target_entity_id: Option<String>,

    /// Prediction id this event is feedback for.
    pub pr_id: Option<String>,
}

impl EventOptions {
    /// Creates options with every field absent.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the event time.
    #[must_use]
    pub fn with_event_time(mut self, time: impl Into<DateTime<FixedOffset>>) -> Self {
        self.event_time = Some(time.into());
        self
    }

    /// Replaces the properties map.
    #[must_use]
    pub fn with_properties(mut self, properties: Map<String, Value>) -> Self {
        self.properties = Some(properties);
        self
    }

    /// Adds a single property, creating the map if needed.
    #[must_use]
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.properties
            .get_or_insert_with(Map::new)
            .insert(key.into(), value.into());
        self
    }

    /// Sets the target entity.
    #[must_use]
    pub fn with_target_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.target_entity_type = Some(entity_type.into());
        self.target_entity_id = Some(entity_id.into());
        self
    }

    /// Sets the prediction id.
    #[must_use]
    pub fn with_pr_id(mut self, pr_id: impl Into<String>) -> Self {
        self.pr_id = Some(pr_id.into());
        self
    }
}

/// Filters for `GET /events.json`.
///
/// Unset fields are not sent. `events` may hold several names; each becomes
/// its own `event` parameter. `extra` carries parameters this type does not
/// know about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventQuery {
    /// Only events at or after this time.
    pub start_time: Option<DateTime<FixedOffset>>,
    /// Only events before this time.
    pub until_time: Option<DateTime<FixedOffset>>,
    /// Only events of this entity type.
    pub entity_type: Option<String>,
    /// Only events of this entity id.
    pub entity_id: Option<String>,
    /// Only events with one of these names.
    pub events: Vec<String>,
    /// Only events targeting this entity type.
    pub target_entity_type: Option<String>,
    /// Only events targeting this entity id.
    pub target_entity_id: Option<String>,
    /// Maximum number of events; `-1` asks for all of them.
    pub limit: Option<i32>,
    /// Newest first when true.
    pub reversed: Option<bool>,
    /// Additional raw parameters.
    pub extra: Vec<(String, String)>,
}

impl EventQuery {
    /// Creates a query with no filters.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restricts to one entity.
    #[must_use]
    pub fn for_entity(mut self, entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Restricts to events targeting one entity.
    #[must_use]
    pub fn for_target_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.target_entity_type = Some(entity_type.into());
        self.target_entity_id = Some(entity_id.into());
        self
    }

    /// Adds an event name to match.
    #[must_use]
    pub fn with_event(mut self, event: impl Into<String>) -> Self {
        self.events.push(event.into());
        self
    }

    /// Restricts to a time window.
    #[must_use]
    pub fn between(
        mut self,
        start: impl Into<DateTime<FixedOffset>>,
        until: impl Into<DateTime<FixedOffset>>,
    ) -> Self {
        self.start_time = Some(start.into());
        self.until_time = Some(until.into());
        self
    }

    /// Limits the number of results.
    #[must_use]
    pub const fn with_limit(mut self, limit: i32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Orders results newest first.
    #[must_use]
    pub const fn reversed(mut self) -> Self {
        self.reversed = Some(true);
        self
    }

    /// Adds a raw parameter.
    #[must_use]
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra.push((key.into(), value.into()));
        self
    }

    /// Query parameters in wire form, access key excluded.
    #[must_use]
    pub fn to_params(&self) -> Vec<(String, String)> {
        let mut params = Vec::new();
        let mut push = |key: &str, value: String| params.push((key.to_string(), value));

        if let Some(time) = &self.start_time {
            push("startTime", format_timestamp(time));
        }
        if let Some(time) = &self.until_time {
            push("untilTime", format_timestamp(time));
        }
        if let Some(entity_type) = &self.entity_type {
            push("entityType", entity_type.clone());
        }
        if let Some(entity_id) = &self.entity_id {
            push("entityId", entity_id.clone());
        }
        for event in &self.events {
            push("event", event.clone());
        }
        if let Some(target_type) = &self.target_entity_type {
            push("targetEntityType", target_type.clone());
        }
        if let Some(target_id) = &self.target_entity_id {
            push("targetEntityId", target_id.clone());
        }
        if let Some(limit) = self.limit {
            push("limit", limit.to_string());
        }
        if let Some(reversed) = self.reversed {
            push("reversed", reversed.to_string());
        }

        params.extend(self.extra.iter().cloned());
        params
    }
}
