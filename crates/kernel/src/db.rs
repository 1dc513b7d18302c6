//! Database connection pool management.
//!
//! The pool is created on first use and shared for the life of the process.
//! Concurrent first callers wait on the same initialization; a failed
//! initialization is not cached, so the next caller retries.

use std::time::Duration;

use sqlx::migrate::{MigrateError, Migrator};
use sqlx::postgres::{PgPool, PgPoolOptions};
use thiserror::Error;
use tokio::sync::OnceCell;

use crate::config::Config;

static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors raised by the ideas store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to connect to PostgreSQL: {0}")]
    Connect(#[source] sqlx::Error),

    #[error("failed to run migrations: {0}")]
    Migrate(#[from] MigrateError),

    #[error("failed to bind query parameter: {0}")]
    Bind(String),

    #[error("database query failed: {0}")]
    Query(#[from] sqlx::Error),
}

/// Pool settings.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
}

impl From<&Config> for StoreOptions {
    fn from(config: &Config) -> Self {
        Self {
            database_url: config.database_url.clone(),
            max_connections: config.database_max_connections,
            acquire_timeout: config.database_acquire_timeout,
            run_migrations: config.run_migrations,
        }
    }
}

/// Lazily initialized PostgreSQL pool for the ideas table.
pub struct IdeasStore {
    options: StoreOptions,
    pool: OnceCell<PgPool>,
}

impl IdeasStore {
    /// Create a store. No connection is made until [`IdeasStore::acquire`].
    pub fn new(options: StoreOptions) -> Self {
        Self {
            options,
            pool: OnceCell::new(),
        }
    }

    /// Return the shared pool, creating it on first call.
    pub async fn acquire(&self) -> Result<&PgPool, StoreError> {
        self.pool.get_or_try_init(|| self.connect()).await
    }

    async fn connect(&self) -> Result<PgPool, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(self.options.max_connections)
            .acquire_timeout(self.options.acquire_timeout)
            .connect(&self.options.database_url)
            .await
            .map_err(StoreError::Connect)?;

        if self.options.run_migrations {
            MIGRATOR.run(&pool).await?;
        }

        tracing::info!(
            max_connections = self.options.max_connections,
            migrations = self.options.run_migrations,
            "database pool initialized"
        );

        Ok(pool)
    }

    pub fn is_initialized(&self) -> bool {
        self.pool.initialized()
    }

    /// Check if the database connection is healthy.
    pub async fn is_healthy(&self) -> bool {
        let Ok(pool) = self.acquire().await else {
            return false;
        };
        sqlx::query("SELECT 1").execute(pool).await.is_ok()
    }

    /// Close the pool if it was ever created.
    pub async fn close(&self) {
        if let Some(pool) = self.pool.get() {
            pool.close().await;
            tracing::info!("database pool closed");
        }
    }
}
