//! Engine client: queries and prediction feedback.

mod client;


pub use client::{EngineClient, FEEDBACK_ENTITY, FEEDBACK_EVENT};
