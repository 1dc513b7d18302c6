//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::query::PageLimits;

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// How long to wait for a pooled connection (default: 30s).
    pub database_acquire_timeout: Duration,

    /// Page size when `limit` is absent or invalid (default: 50).
    pub default_page_size: u64,

    /// Upper bound for `limit` (default: 500).
    pub max_page_size: u64,

    /// Apply embedded migrations when the pool is first created (default: true).
    pub run_migrations: bool,

    /// CORS allowed origins (comma-separated, default: "*").
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let port = lookup("PORT")
            .unwrap_or_else(|| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            lookup("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = lookup("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let database_acquire_timeout = lookup("DATABASE_ACQUIRE_TIMEOUT_SECS")
            .unwrap_or_else(|| "30".to_string())
            .parse()
            .map(Duration::from_secs)
            .context("DATABASE_ACQUIRE_TIMEOUT_SECS must be a whole number of seconds")?;

        let default_page_size: u64 = lookup("IDEAS_DEFAULT_PAGE_SIZE")
            .unwrap_or_else(|| "50".to_string())
            .parse()
            .context("IDEAS_DEFAULT_PAGE_SIZE must be a valid u64")?;

        let max_page_size: u64 = lookup("IDEAS_MAX_PAGE_SIZE")
            .unwrap_or_else(|| "500".to_string())
            .parse()
            .context("IDEAS_MAX_PAGE_SIZE must be a valid u64")?;

        if default_page_size > max_page_size {
            anyhow::bail!(
                "IDEAS_DEFAULT_PAGE_SIZE ({default_page_size}) exceeds IDEAS_MAX_PAGE_SIZE ({max_page_size})"
            );
        }

        let run_migrations = lookup("RUN_MIGRATIONS")
            .map(|v| !matches!(v.trim().to_lowercase().as_str(), "false" | "0" | "no"))
            .unwrap_or(true);

        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .map(|v| {
                v.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_else(|| vec!["*".to_string()]);

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            database_acquire_timeout,
            default_page_size,
            max_page_size,
            run_migrations,
            cors_allowed_origins,
        })
    }

    pub fn page_limits(&self) -> PageLimits {
        PageLimits {
            default_limit: self.default_page_size,
            max_limit: self.max_page_size,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(pairs: &[(&str, &str)]) -> Result<Config> {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/ideas")]).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.database_max_connections, 10);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(30));
        assert_eq!(config.page_limits(), PageLimits::default());
        assert!(config.run_migrations);
        assert_eq!(config.cors_allowed_origins, vec!["*"]);
    }

    #[test]
    fn database_url_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("DATABASE_URL", "postgres://db/ideas"),
            ("PORT", "8080"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
            ("DATABASE_ACQUIRE_TIMEOUT_SECS", "2"),
            ("IDEAS_DEFAULT_PAGE_SIZE", "20"),
            ("IDEAS_MAX_PAGE_SIZE", "100"),
            ("RUN_MIGRATIONS", "false"),
            ("CORS_ALLOWED_ORIGINS", "https://a.example, https://b.example,"),
        ])
        .unwrap();

        assert_eq!(config.port, 8080);
        assert_eq!(config.database_max_connections, 4);
        assert_eq!(config.database_acquire_timeout, Duration::from_secs(2));
        assert_eq!(config.page_limits().default_limit, 20);
        assert_eq!(config.page_limits().max_limit, 100);
        assert!(!config.run_migrations);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["https://a.example", "https://b.example"]
        );
    }

    #[test]
    fn invalid_numbers_are_errors() {
        assert!(load(&[("DATABASE_URL", "x"), ("PORT", "http")]).is_err());
        assert!(load(&[("DATABASE_URL", "x"), ("IDEAS_MAX_PAGE_SIZE", "-1")]).is_err());
    }

    #[test]
    fn default_page_size_must_fit_max() {
        let err = load(&[
            ("DATABASE_URL", "x"),
            ("IDEAS_DEFAULT_PAGE_SIZE", "600"),
        ])
        .unwrap_err();
        assert!(err.to_string().contains("IDEAS_MAX_PAGE_SIZE"));
    }
}
