//! Entity and location domain models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;
use validator::{Validate, ValidationErrors};

/// A tracked entity together with its single location record.
///
/// `location` and `last_updated` stay `None` until the first location
/// update for the entity has been stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub entity_id: Uuid,
    pub last_updated: Option<DateTime<Utc>>,
    pub location: Option<GeoLocation>,
    pub meta: Value,
}

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoLocation {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Returns true iff both coordinates are inside their valid ranges.
    pub fn is_valid(&self) -> bool {
        shared::validation::is_valid_location(self.latitude, self.longitude)
    }
}

impl Validate for GeoLocation {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        if let Err(e) = shared::validation::validate_latitude(self.latitude) {
            errors.add("latitude", e);
        }
        if let Err(e) = shared::validation::validate_longitude(self.longitude) {
            errors.add("longitude", e);
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// Request payload for entity registration.
///
/// POST /geoprowler/entities/new
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterEntityRequest {
    #[serde(default = "empty_meta")]
    pub meta: Value,
}

fn empty_meta() -> Value {
    Value::Object(Map::new())
}

/// Request payload for setting an entity's location.
///
/// PUT /geoprowler/location/:entityId
pub type SetLocationRequest = GeoLocation;

/// Response payload for a single entity lookup.
#[derive(Debug, Clone, Serialize)]
pub struct EntityResponse {
    pub http_code: u16,
    pub entity: Entity,
}

/// Response payload for the entity listing.
#[derive(Debug, Clone, Serialize)]
pub struct EntitiesResponse {
    pub http_code: u16,
    pub entities: Vec<Entity>,
}

/// Response payload for a successful registration.
#[derive(Debug, Clone, Serialize)]
pub struct RegisterEntityResponse {
    pub http_code: u16,
    pub message: String,
    pub entity_id: Uuid,
}

/// Response payload for a successful location update.
#[derive(Debug, Clone, Serialize)]
pub struct SetLocationResponse {
    pub http_code: u16,
    pub message: String,
    pub last_updated: DateTime<Utc>,
}

/// Plain confirmation body used by health checks and deletion.
#[derive(Debug, Clone, Serialize)]
pub struct MessageResponse {
    pub http_code: u16,
    pub message: String,
}

impl MessageResponse {
    pub fn new(http_code: u16, message: impl Into<String>) -> Self {
        Self {
            http_code,
            message: message.into(),
        }
    }
}
