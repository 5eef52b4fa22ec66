//! Entity ID path extractor.

use axum::{
    async_trait,
    extract::{FromRequestParts, Path},
    http::request::Parts,
};
use uuid::Uuid;

use crate::error::ApiError;

/// Message returned when the `:entityId` path segment is not a UUID.
pub const INVALID_ENTITY_ID: &str = "Invalid entity ID format";

/// Entity identifier parsed from the `:entityId` path segment.
///
/// Any parse failure is reported as a 400 with a JSON error body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityId(pub Uuid);

#[async_trait]
impl<S> FromRequestParts<S> for EntityId
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::Validation(INVALID_ENTITY_ID.to_string()))?;

        Uuid::parse_str(&raw).map(EntityId).map_err(|e| {
            tracing::debug!(entity_id = %raw, error = %e, "Unable to parse entity ID");
            ApiError::Validation(INVALID_ENTITY_ID.to_string())
        })
    }
}
