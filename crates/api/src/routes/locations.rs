//! Location endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::entity::{SetLocationRequest, SetLocationResponse};
use tracing::info;
use validator::Validate;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, EntityId};
use crate::middleware::metrics::record_location_updated;

/// Set the current location of an entity.
///
/// PUT /geoprowler/location/:entityId
pub async fn register_location(
    State(state): State<AppState>,
    EntityId(entity_id): EntityId,
    ApiJson(location): ApiJson<SetLocationRequest>,
) -> Result<Json<SetLocationResponse>, ApiError> {
    info!(entity_id = %entity_id, "Received request to register new location");

    location.validate()?;

    // Distinguish an unknown entity (404) from a failed write (500).
    state.store.get_entity(entity_id).await?;

    let last_updated = state.store.set_entity_location(entity_id, location).await?;
    record_location_updated();

    info!(
        entity_id = %entity_id,
        latitude = location.latitude,
        longitude = location.longitude,
        "Location updated"
    );

    Ok(Json(SetLocationResponse {
        http_code: StatusCode::OK.as_u16(),
        message: "Successfully updated location".to_string(),
        last_updated,
    }))
}
