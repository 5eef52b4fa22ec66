//! Custom Axum extractors.
//!
//! Extractors for parsing request data into JSON-bodied 400 rejections.

pub mod entity_id;
pub mod json;

pub use entity_id::{EntityId, INVALID_ENTITY_ID};
pub use json::{ApiJson, INVALID_REQUEST_BODY};
