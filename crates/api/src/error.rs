use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::services::StoreError;
use serde::Serialize;
use thiserror::Error;

/// Message returned for every 500 response. Details stay in the logs.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Message returned when a request outlives `server.request_timeout_secs`.
pub const REQUEST_TIMEOUT_MESSAGE: &str = "Request timed out";

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Request timed out")]
    Timeout,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    http_code: u16,
    message: String,
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = match self {
            ApiError::NotFound(msg) => {
                tracing::debug!("Not found: {}", msg);
                msg
            }
            ApiError::Validation(msg) => {
                tracing::info!("Rejected request: {}", msg);
                msg
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                INTERNAL_ERROR_MESSAGE.to_string()
            }
            ApiError::Timeout => {
                tracing::warn!("Request timed out");
                REQUEST_TIMEOUT_MESSAGE.to_string()
            }
        };

        let body = ErrorBody {
            http_code: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(_) => ApiError::NotFound("Cannot find specified entity".into()),
            StoreError::InvalidMetadata(_) => ApiError::Validation("Invalid entity metadata".into()),
            StoreError::InvalidLocation { .. } => ApiError::Validation("Invalid location".into()),
            StoreError::MalformedLocation { .. }
            | StoreError::Timeout(_)
            | StoreError::Database(_) => ApiError::Internal(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<String> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |e| match &e.message {
                    Some(message) => format!("{}: {}", field, message),
                    None => field.to_string(),
                })
            })
            .collect();
        fields.sort();

        ApiError::Validation(format!("Invalid location ({})", fields.join(", ")))
    }
}
