//! Health check endpoint handlers.

use axum::{extract::State, http::StatusCode, Json};
use domain::models::entity::MessageResponse;

use crate::app::AppState;

/// Liveness check.
///
/// GET /geoprowler/health_check
pub async fn health_check() -> Json<MessageResponse> {
    tracing::debug!("Received request for health check");
    Json(MessageResponse::new(StatusCode::OK.as_u16(), "Service running"))
}

/// Readiness probe endpoint.
///
/// Returns 200 if the entity store answers, 503 otherwise.
///
/// GET /geoprowler/health_check/ready
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<MessageResponse>) {
    match state.store.ping().await {
        Ok(()) => (
            StatusCode::OK,
            Json(MessageResponse::new(StatusCode::OK.as_u16(), "ready")),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Readiness check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(MessageResponse::new(
                    StatusCode::SERVICE_UNAVAILABLE.as_u16(),
                    "Storage unavailable",
                )),
            )
        }
    }
}
