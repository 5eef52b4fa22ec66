//! Entity store abstraction.
//!
//! Handlers talk to storage only through [`EntityStore`], which lets the
//! HTTP layer be driven by the Postgres repository in production and by an
//! in-memory store in tests.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Entity, GeoLocation};

/// Failure kinds surfaced by an entity store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("cannot find entity with ID {0}")]
    NotFound(Uuid),

    #[error("entity has invalid metadata: {0}")]
    InvalidMetadata(String),

    #[error("invalid location: latitude {latitude}, longitude {longitude}")]
    InvalidLocation { latitude: f64, longitude: f64 },

    #[error("stored location for entity {entity_id} is malformed: {reason}")]
    MalformedLocation { entity_id: Uuid, reason: String },

    #[error("storage operation timed out after {0:?}")]
    Timeout(Duration),

    #[error("database error: {0}")]
    Database(String),
}

impl StoreError {
    /// True for failures of the storage backend itself, as opposed to
    /// problems with the caller's input or a missing entity.
    pub fn is_storage_failure(&self) -> bool {
        matches!(
            self,
            StoreError::MalformedLocation { .. } | StoreError::Timeout(_) | StoreError::Database(_)
        )
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Database(err.to_string())
    }
}

/// CRUD operations over entities and their locations.
#[async_trait]
pub trait EntityStore: Send + Sync {
    /// Creates an entity with the given metadata and an empty location.
    ///
    /// Metadata must be a JSON object.
    async fn register_entity(&self, meta: serde_json::Value) -> Result<Uuid, StoreError>;

    /// Fetches one entity with its location.
    async fn get_entity(&self, entity_id: Uuid) -> Result<Entity, StoreError>;

    /// Fetches every entity. Rows whose stored location cannot be decoded
    /// are skipped.
    async fn get_entities(&self) -> Result<Vec<Entity>, StoreError>;

    /// Replaces the entity's location and stamps it with the current UTC
    /// time, which is returned.
    async fn set_entity_location(
        &self,
        entity_id: Uuid,
        location: GeoLocation,
    ) -> Result<DateTime<Utc>, StoreError>;

    /// Removes the entity and its location. Returns the number of entity
    /// rows removed; a missing ID is not an error.
    async fn delete_entity(&self, entity_id: Uuid) -> Result<u64, StoreError>;

    /// Checks that the backing store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}

/// Checks that metadata is a JSON object.
pub fn ensure_meta_object(meta: &serde_json::Value) -> Result<(), StoreError> {
    if meta.is_object() {
        Ok(())
    } else {
        Err(StoreError::InvalidMetadata(format!(
            "expected a JSON object, got {}",
            json_kind(meta)
        )))
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Rejects coordinates outside the valid ranges.
pub fn ensure_valid_location(location: &GeoLocation) -> Result<(), StoreError> {
    if location.is_valid() {
        Ok(())
    } else {
        Err(StoreError::InvalidLocation {
            latitude: location.latitude,
            longitude: location.longitude,
        })
    }
}
