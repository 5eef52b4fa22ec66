//! Entity endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::entity::{
    EntitiesResponse, EntityResponse, MessageResponse, RegisterEntityRequest,
    RegisterEntityResponse,
};
use tracing::info;

use crate::app::AppState;
use crate::error::ApiError;
use crate::extractors::{ApiJson, EntityId};
use crate::middleware::metrics::{record_entity_deleted, record_entity_registered};

/// Get a single entity with its current location.
///
/// GET /geoprowler/entities/:entityId
pub async fn get_entity(
    State(state): State<AppState>,
    EntityId(entity_id): EntityId,
) -> Result<Json<EntityResponse>, ApiError> {
    info!(entity_id = %entity_id, "Received request for entity");

    let entity = state.store.get_entity(entity_id).await?;

    Ok(Json(EntityResponse {
        http_code: StatusCode::OK.as_u16(),
        entity,
    }))
}

/// List every entity.
///
/// GET /geoprowler/entities/all
pub async fn get_entities(
    State(state): State<AppState>,
) -> Result<Json<EntitiesResponse>, ApiError> {
    info!("Received request to retrieve entities");

    let entities = state.store.get_entities().await?;

    Ok(Json(EntitiesResponse {
        http_code: StatusCode::OK.as_u16(),
        entities,
    }))
}

/// Register a new entity.
///
/// POST /geoprowler/entities/new
pub async fn register_entity(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<RegisterEntityRequest>,
) -> Result<(StatusCode, Json<RegisterEntityResponse>), ApiError> {
    info!("Received request to register new entity");

    let entity_id = state.store.register_entity(request.meta).await?;
    record_entity_registered();

    info!(entity_id = %entity_id, "Entity registered");

    Ok((
        StatusCode::CREATED,
        Json(RegisterEntityResponse {
            http_code: StatusCode::CREATED.as_u16(),
            message: "Successfully created entity".to_string(),
            entity_id,
        }),
    ))
}

/// Delete an entity and its location.
///
/// DELETE /geoprowler/entities/:entityId
pub async fn delete_entity(
    State(state): State<AppState>,
    EntityId(entity_id): EntityId,
) -> Result<Json<MessageResponse>, ApiError> {
    info!(entity_id = %entity_id, "Received request to delete entity");

    // Surface a missing entity as 404 rather than a silent no-op.
    state.store.get_entity(entity_id).await?;

    state.store.delete_entity(entity_id).await?;
    record_entity_deleted();

    info!(entity_id = %entity_id, "Entity deleted");

    Ok(Json(MessageResponse::new(
        StatusCode::OK.as_u16(),
        "Successfully deleted entity",
    )))
}
