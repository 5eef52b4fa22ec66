//! JSON body extractor with 400 rejections.

use axum::{
    async_trait,
    extract::{FromRequest, Request},
    Json,
};
use serde::de::DeserializeOwned;

use crate::error::ApiError;

/// Message returned when a request body cannot be parsed.
pub const INVALID_REQUEST_BODY: &str = "Invalid request body";

/// Like [`axum::Json`], but every rejection (bad syntax, missing fields,
/// wrong types, missing content type) becomes a 400 with a JSON body.
#[derive(Debug, Clone)]
pub struct ApiJson<T>(pub T);

#[async_trait]
impl<T, S> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(ApiJson(value)),
            Err(rejection) => {
                tracing::debug!(error = %rejection.body_text(), "Unable to parse request body");
                Err(ApiError::Validation(INVALID_REQUEST_BODY.to_string()))
            }
        }
    }
}
