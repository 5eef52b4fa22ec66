//! Common test utilities for integration tests.
//!
//! Provides an in-memory entity store for driving the router without a
//! database, plus helpers for running against a real PostgreSQL instance.

// Not every test binary uses every helper.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request},
    Router,
};
use chrono::{DateTime, Utc};
use domain::models::{Entity, GeoLocation};
use domain::services::entity_store::{ensure_meta_object, ensure_valid_location};
use domain::services::{EntityStore, StoreError};
use geoprowler_api::{app::create_app, config::Config};
use sqlx::{postgres::PgPoolOptions, PgPool};
use uuid::Uuid;

/// Entity store backed by a map, with the same semantics as the Postgres
/// repository.
#[derive(Default)]
pub struct InMemoryStore {
    entities: RwLock<HashMap<Uuid, Entity>>,
}

impl InMemoryStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.entities.read().unwrap().len()
    }
}

#[async_trait]
impl EntityStore for InMemoryStore {
    async fn register_entity(&self, meta: serde_json::Value) -> Result<Uuid, StoreError> {
        ensure_meta_object(&meta)?;
        let entity_id = Uuid::new_v4();
        self.entities.write().unwrap().insert(
            entity_id,
            Entity {
                entity_id,
                last_updated: None,
                location: None,
                meta,
            },
        );
        Ok(entity_id)
    }

    async fn get_entity(&self, entity_id: Uuid) -> Result<Entity, StoreError> {
        self.entities
            .read()
            .unwrap()
            .get(&entity_id)
            .cloned()
            .ok_or(StoreError::NotFound(entity_id))
    }

    async fn get_entities(&self) -> Result<Vec<Entity>, StoreError> {
        let mut entities: Vec<Entity> = self.entities.read().unwrap().values().cloned().collect();
        entities.sort_by_key(|e| e.entity_id);
        Ok(entities)
    }

    async fn set_entity_location(
        &self,
        entity_id: Uuid,
        location: GeoLocation,
    ) -> Result<DateTime<Utc>, StoreError> {
        ensure_valid_location(&location)?;
        let mut entities = self.entities.write().unwrap();
        let entity = entities
            .get_mut(&entity_id)
            .ok_or(StoreError::NotFound(entity_id))?;
        let now = Utc::now();
        entity.location = Some(location);
        entity.last_updated = Some(now);
        Ok(now)
    }

    async fn delete_entity(&self, entity_id: Uuid) -> Result<u64, StoreError> {
        Ok(self
            .entities
            .write()
            .unwrap()
            .remove(&entity_id)
            .map_or(0, |_| 1))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

/// Entity store whose every call fails like an unreachable database.
pub struct FailingStore;

#[async_trait]
impl EntityStore for FailingStore {
    async fn register_entity(&self, _meta: serde_json::Value) -> Result<Uuid, StoreError> {
        Err(StoreError::Database("connection refused".into()))
    }

    async fn get_entity(&self, _entity_id: Uuid) -> Result<Entity, StoreError> {
        Err(StoreError::Database("connection refused".into()))
    }

    async fn get_entities(&self) -> Result<Vec<Entity>, StoreError> {
        Err(StoreError::Timeout(Duration::from_secs(5)))
    }

    async fn set_entity_location(
        &self,
        _entity_id: Uuid,
        _location: GeoLocation,
    ) -> Result<DateTime<Utc>, StoreError> {
        Err(StoreError::Database("connection refused".into()))
    }

    async fn delete_entity(&self, _entity_id: Uuid) -> Result<u64, StoreError> {
        Err(StoreError::Database("connection refused".into()))
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Err(StoreError::Database("connection refused".into()))
    }
}

/// Configuration built from embedded defaults only.
pub fn test_config() -> Config {
    Config::load_with_overrides(&[
        ("database.username", "postgres"),
        ("server.host", "127.0.0.1"),
        ("logging.format", "pretty"),
    ])
    .expect("Failed to build test config")
}

/// Create a test application router over the given store.
pub fn create_test_app(store: Arc<dyn EntityStore>) -> Router {
    create_app(test_config(), store)
}

/// Build a request with a JSON body.
pub fn json_request(method: Method, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request with a raw body and JSON content type.
pub fn raw_json_request(method: Method, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Build a request without a body.
pub fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Parse response body as JSON.
pub async fn parse_response_body(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(serde_json::Value::Null)
}

/// Create a test database pool from `TEST_DATABASE_URL`.
///
/// Returns `None` when the variable is unset so database tests can skip.
pub async fn create_test_pool() -> Option<PgPool> {
    let Ok(database_url) = std::env::var("TEST_DATABASE_URL") else {
        eprintln!("TEST_DATABASE_URL not set; skipping database test");
        return None;
    };

    let pool = PgPoolOptions::new()
        .max_connections(5)
        .min_connections(1)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&database_url)
        .await
        .expect("Failed to connect to test database");

    sqlx::migrate!("../persistence/src/migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    Some(pool)
}
