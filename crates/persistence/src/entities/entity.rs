//! Entity row mapping (entities joined with locations).

use chrono::{DateTime, Utc};
use domain::models::{Entity, GeoLocation};
use domain::services::StoreError;
use sqlx::FromRow;
use uuid::Uuid;

/// Database row mapping for `entities INNER JOIN locations`.
#[derive(Debug, Clone, FromRow)]
pub struct EntityRow {
    pub entity_id: Uuid,
    pub meta: serde_json::Value,
    pub location: Option<serde_json::Value>,
    pub last_updated: Option<DateTime<Utc>>,
}

impl TryFrom<EntityRow> for Entity {
    type Error = StoreError;

    fn try_from(row: EntityRow) -> Result<Self, Self::Error> {
        let location = match row.location {
            None | Some(serde_json::Value::Null) => None,
            Some(value) => Some(
                serde_json::from_value::<GeoLocation>(value).map_err(|e| {
                    StoreError::MalformedLocation {
                        entity_id: row.entity_id,
                        reason: e.to_string(),
                    }
                })?,
            ),
        };

        Ok(Self {
            entity_id: row.entity_id,
            last_updated: row.last_updated,
            location,
            meta: row.meta,
        })
    }
}
