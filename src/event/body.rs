//! Wire form of a single event.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::time::{Clock, format_event_time, format_timestamp};

use super::EventOptions;

/// Reserved event that sets entity properties.
pub const SET_EVENT: &str = "$set";
/// Reserved event that removes entity properties.
pub const UNSET_EVENT: &str = "$unset";
/// Reserved event that deletes an entity.
pub const DELETE_EVENT: &str = "$delete";

/// Entity type of users.
pub const USER_ENTITY: &str = "user";
/// Entity type of items.
pub const ITEM_ENTITY: &str = "item";

/// Event body as posted to `/events.json` or written by the exporter.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EventBody<'a> {
    event: &'a str,
    entity_type: &'a str,
    entity_id: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_entity_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    target_entity_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<&'a Map<String, Value>>,
    event_time: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pr_id: Option<&'a str>,
}

impl<'a> EventBody<'a> {
    /// Builds the body, stamping `eventTime` from `clock` when unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for a `$unset` event whose
    /// properties are absent or empty.
    pub(crate) fn new(
        event: &'a str,
        entity_type: &'a str,
        entity_id: &'a str,
        options: &'a EventOptions,
        clock: &dyn Clock,
    ) -> Result<Self, Error> {
        if event == UNSET_EVENT {
            match &options.properties {
                None => {
                    return Err(Error::InvalidArgument(
                        "properties must be present when event is $unset",
                    ));
                }
                Some(properties) if properties.is_empty() => {
                    return Err(Error::InvalidArgument(
                        "properties cannot be empty when event is $unset",
                    ));
                }
                Some(_) => {}
            }
        }

        let event_time = options
            .event_time
            .as_ref()
            .map_or_else(|| format_event_time(clock.now()), format_timestamp);

        Ok(Self {
            event,
            entity_type,
            entity_id,
            target_entity_type: options.target_entity_type.as_deref(),
            target_entity_id: options.target_entity_id.as_deref(),
            properties: options.properties.as_ref(),
            event_time,
            pr_id: options.pr_id.as_deref(),
        })
    }

    /// Encodes the body as compact JSON.
    pub(crate) fn to_json(&self) -> Result<String, Error> {
        serde_json::to_string(self).map_err(Error::Serialize)
    }
}

/// Options for a user action on an item: `options` with the item as target.
pub(crate) fn targeting_item(options: &EventOptions, iid: &str) -> EventOptions {
    EventOptions {
        target_entity_type: Some(ITEM_ENTITY.to_string()),
        target_entity_id: Some(iid.to_string()),
        ..options.clone()
    }
}
