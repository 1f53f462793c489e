//! Event server client, event options, and the file exporter.

mod body;
mod client;
mod exporter;
mod options;

#[cfg(test)]
mod exporter_tests;

pub use body::{DELETE_EVENT, ITEM_ENTITY, SET_EVENT, UNSET_EVENT, USER_ENTITY};
pub use client::EventClient;
pub use exporter::FileExporter;
pub use options::{EventOptions, EventQuery};
