//! Entity repository for database operations.

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use domain::models::{Entity, GeoLocation};
use domain::services::entity_store::{ensure_meta_object, ensure_valid_location};
use domain::services::{EntityStore, StoreError};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::entities::EntityRow;
use crate::metrics::{record_pool_metrics, QueryTimer};

/// Default bound on a single repository call.
pub const DEFAULT_STATEMENT_TIMEOUT: Duration = Duration::from_secs(5);

const SELECT_ENTITIES: &str = r#"
    SELECT e.entity_id, e.meta, l.location, l.last_updated
    FROM entities e
    INNER JOIN locations l ON e.entity_id = l.entity_id
"#;

/// Current time at TIMESTAMPTZ precision, rounded up so it never sorts
/// before the instant it was taken.
fn storage_timestamp() -> DateTime<Utc> {
    let now = Utc::now();
    let stamp = now.trunc_subsecs(6);
    if stamp < now {
        stamp + chrono::Duration::microseconds(1)
    } else {
        stamp
    }
}

/// Repository for entity and location database operations.
#[derive(Clone)]
pub struct EntityRepository {
    pool: PgPool,
    timeout: Duration,
}

impl EntityRepository {
    /// Creates a new EntityRepository with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            timeout: DEFAULT_STATEMENT_TIMEOUT,
        }
    }

    /// Overrides the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Returns the per-call timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Runs one store operation under the per-call timeout and records it.
    async fn run<T, F>(&self, operation: &'static str, query: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, sqlx::Error>>,
    {
        let timer = QueryTimer::start(operation);
        let result = match tokio::time::timeout(self.timeout, query).await {
            Ok(result) => result.map_err(StoreError::from),
            Err(_) => Err(StoreError::Timeout(self.timeout)),
        };
        timer.finish(&result);
        result
    }

    async fn insert_entity(
        &self,
        entity_id: Uuid,
        meta: &serde_json::Value,
    ) -> Result<(), sqlx::Error> {
        // Both rows or neither.
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO entities (entity_id, meta)
            VALUES ($1, $2)
            "#,
        )
        .bind(entity_id)
        .bind(meta)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO locations (entity_id)
            VALUES ($1)
            "#,
        )
        .bind(entity_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    async fn find_by_id(&self, entity_id: Uuid) -> Result<Option<EntityRow>, sqlx::Error> {
        let query = format!("{SELECT_ENTITIES} WHERE e.entity_id = $1");
        sqlx::query_as::<_, EntityRow>(&query)
            .bind(entity_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_all(&self) -> Result<Vec<EntityRow>, sqlx::Error> {
        let query = format!("{SELECT_ENTITIES} ORDER BY e.entity_id");
        sqlx::query_as::<_, EntityRow>(&query)
            .fetch_all(&self.pool)
            .await
    }

    /// Returns the stored timestamp, or `None` when no row matched.
    async fn update_location(
        &self,
        entity_id: Uuid,
        location: GeoLocation,
        last_updated: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, sqlx::Error> {
        sqlx::query_scalar::<_, DateTime<Utc>>(
            r#"
            UPDATE locations
            SET location = $1, last_updated = $2
            WHERE entity_id = $3
            RETURNING last_updated
            "#,
        )
        .bind(Json(location))
        .bind(last_updated)
        .bind(entity_id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn remove_entity(&self, entity_id: Uuid) -> Result<u64, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM locations WHERE entity_id = $1")
            .bind(entity_id)
            .execute(&mut *tx)
            .await?;

        let deleted = sqlx::query("DELETE FROM entities WHERE entity_id = $1")
            .bind(entity_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted)
    }
}

#[async_trait]
impl EntityStore for EntityRepository {
    async fn register_entity(&self, meta: serde_json::Value) -> Result<Uuid, StoreError> {
        ensure_meta_object(&meta)?;

        let entity_id = Uuid::new_v4();
        debug!(entity_id = %entity_id, "Inserting new entity");
        self.run("register_entity", self.insert_entity(entity_id, &meta))
            .await?;
        Ok(entity_id)
    }

    async fn get_entity(&self, entity_id: Uuid) -> Result<Entity, StoreError> {
        debug!(entity_id = %entity_id, "Fetching entity");
        let row = self
            .run("get_entity", self.find_by_id(entity_id))
            .await?
            .ok_or(StoreError::NotFound(entity_id))?;
        Entity::try_from(row)
    }

    async fn get_entities(&self) -> Result<Vec<Entity>, StoreError> {
        debug!("Fetching all entities");
        let rows = self.run("get_entities", self.find_all()).await?;

        let entities = rows
            .into_iter()
            .filter_map(|row| match Entity::try_from(row) {
                Ok(entity) => Some(entity),
                Err(e) => {
                    warn!(error = %e, "Skipping entity with unreadable location");
                    None
                }
            })
            .collect();
        Ok(entities)
    }

    async fn set_entity_location(
        &self,
        entity_id: Uuid,
        location: GeoLocation,
    ) -> Result<DateTime<Utc>, StoreError> {
        ensure_valid_location(&location)?;

        debug!(entity_id = %entity_id, "Setting entity location");
        self.run(
            "set_entity_location",
            self.update_location(entity_id, location, storage_timestamp()),
        )
        .await?
        .ok_or(StoreError::NotFound(entity_id))
    }

    async fn delete_entity(&self, entity_id: Uuid) -> Result<u64, StoreError> {
        debug!(entity_id = %entity_id, "Deleting entity");
        self.run("delete_entity", self.remove_entity(entity_id))
            .await
    }

    async fn ping(&self) -> Result<(), StoreError> {
        record_pool_metrics(&self.pool);
        self.run("ping", crate::db::ping(&self.pool)).await
    }
}
