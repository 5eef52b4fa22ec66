use axum::{
    error_handling::HandleErrorLayer,
    middleware,
    routing::{get, post, put},
    BoxError, Router,
};
use domain::services::EntityStore;
use std::sync::Arc;
use std::time::Duration;
use tower::{timeout::TimeoutLayer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, Any, CorsLayer},
    trace::TraceLayer,
};

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id};
use crate::routes::{entities, health, locations};

/// Prefix every API route is mounted under.
pub const API_PREFIX: &str = "/geoprowler";

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn EntityStore>,
    pub config: Arc<Config>,
}

fn cors_layer(config: &Config) -> CorsLayer {
    if config.security.cors_origins.is_empty() {
        // Default: allow any origin (for development)
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any)
    } else {
        let origins: Vec<_> = config
            .security
            .cors_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(AllowOrigin::list(origins))
            .allow_methods(Any)
            .allow_headers(Any)
    }
}

async fn handle_timeout(err: BoxError) -> ApiError {
    if err.is::<tower::timeout::error::Elapsed>() {
        ApiError::Timeout
    } else {
        ApiError::Internal(err.to_string())
    }
}

/// Bounds every request, answering with a JSON 408 when the bound elapses.
fn with_request_timeout<S>(router: Router<S>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.layer(
        ServiceBuilder::new()
            .layer(HandleErrorLayer::new(handle_timeout))
            .layer(TimeoutLayer::new(timeout)),
    )
}

/// Routes served under [`API_PREFIX`].
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health_check", get(health::health_check))
        .route("/health_check/ready", get(health::ready))
        // `all` is a static segment and wins over `:entity_id`.
        .route("/entities/all", get(entities::get_entities))
        .route("/entities/new", post(entities::register_entity))
        .route(
            "/entities/:entity_id",
            get(entities::get_entity).delete(entities::delete_entity),
        )
        .route("/location/:entity_id", put(locations::register_location))
}

pub fn create_app(config: Config, store: Arc<dyn EntityStore>) -> Router {
    let config = Arc::new(config);
    let cors = cors_layer(&config);

    let state = AppState {
        store,
        config: config.clone(),
    };

    let router = Router::new()
        .nest(API_PREFIX, api_routes())
        .route("/metrics", get(metrics_handler))
        .layer(CompressionLayer::new());

    // Global middleware (order matters: bottom layers run first)
    with_request_timeout(
        router,
        Duration::from_secs(config.server.request_timeout_secs),
    )
    .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .layer(cors)
        .with_state(state)
}
