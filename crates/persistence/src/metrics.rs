//! Entity store metrics.
//!
//! Every repository call is recorded once, labelled with the store
//! operation and how it ended.

use std::time::Instant;

use domain::services::StoreError;
use metrics::{counter, gauge, histogram};
use sqlx::PgPool;

/// How a store operation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryOutcome {
    Ok,
    NotFound,
    Timeout,
    Error,
}

impl QueryOutcome {
    pub fn of<T>(result: &Result<T, StoreError>) -> Self {
        match result {
            Ok(_) => QueryOutcome::Ok,
            Err(StoreError::NotFound(_)) => QueryOutcome::NotFound,
            Err(StoreError::Timeout(_)) => QueryOutcome::Timeout,
            Err(_) => QueryOutcome::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QueryOutcome::Ok => "ok",
            QueryOutcome::NotFound => "not_found",
            QueryOutcome::Timeout => "timeout",
            QueryOutcome::Error => "error",
        }
    }
}

/// Records one finished store operation.
///
/// - `entity_store_operations_total{operation, outcome}`
/// - `entity_store_operation_duration_seconds{operation}`
pub fn record_operation(operation: &'static str, outcome: QueryOutcome, duration_secs: f64) {
    counter!(
        "entity_store_operations_total",
        "operation" => operation,
        "outcome" => outcome.as_str()
    )
    .increment(1);

    histogram!(
        "entity_store_operation_duration_seconds",
        "operation" => operation
    )
    .record(duration_secs);
}

/// Publishes connection counts split into idle and in-use.
pub fn record_pool_metrics(pool: &PgPool) {
    let (idle, in_use) = pool_split(pool.size(), pool.num_idle());
    gauge!("entity_store_pool_connections", "state" => "idle").set(idle as f64);
    gauge!("entity_store_pool_connections", "state" => "in_use").set(in_use as f64);
}

fn pool_split(size: u32, idle: usize) -> (usize, usize) {
    let size = size as usize;
    let idle = idle.min(size);
    (idle, size - idle)
}

/// Measures one store operation from creation to [`QueryTimer::finish`].
pub struct QueryTimer {
    operation: &'static str,
    start: Instant,
}

impl QueryTimer {
    pub fn start(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Records the elapsed time under the outcome of `result`.
    pub fn finish<T>(self, result: &Result<T, StoreError>) {
        record_operation(
            self.operation,
            QueryOutcome::of(result),
            self.start.elapsed().as_secs_f64(),
        );
    }
}
