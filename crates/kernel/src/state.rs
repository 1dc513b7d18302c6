//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use sqlx::PgPool;

use crate::config::Config;
use crate::db::{IdeasStore, StoreError, StoreOptions};
use crate::metrics::Metrics;
use crate::query::PageLimits;

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// Lazily connected PostgreSQL pool.
    store: IdeasStore,

    /// Page size bounds for filtered listings.
    page_limits: PageLimits,

    /// Prometheus metrics.
    metrics: Metrics,
}

impl AppState {
    /// Create application state. Does not connect to the database.
    pub fn new(config: &Config) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                store: IdeasStore::new(StoreOptions::from(config)),
                page_limits: config.page_limits(),
                metrics: Metrics::new(),
            }),
        }
    }

    pub fn store(&self) -> &IdeasStore {
        &self.inner.store
    }

    /// Get the database pool, connecting on first use.
    pub async fn db(&self) -> Result<&PgPool, StoreError> {
        self.inner.store.acquire().await
    }

    pub fn page_limits(&self) -> PageLimits {
        self.inner.page_limits
    }

    pub fn metrics(&self) -> &Metrics {
        &self.inner.metrics
    }

    /// Check if PostgreSQL is healthy.
    pub async fn postgres_healthy(&self) -> bool {
        self.inner.store.is_healthy().await
    }

    /// Run a store operation, recording its latency and outcome.
    pub async fn timed<T, F>(&self, operation: &str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        let start = Instant::now();
        let result = fut.await;
        self.inner.metrics.record_db_query(
            operation,
            start.elapsed().as_secs_f64(),
            result.is_err(),
        );
        result
    }
}
