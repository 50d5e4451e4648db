//! Durable store (PostgreSQL) settings.

use serde::Deserialize;
use sqlx::postgres::PgPoolOptions;
use std::time::Duration;

use super::error::ValidationError;

const MAX_POOL_SIZE: u32 = 100;

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// `postgres://` connection URL
    pub url: String,

    #[serde(default)]
    pub pool: PoolConfig,

    /// Apply `migrations/` on startup
    #[serde(default)]
    pub run_migrations: bool,
}

/// Connection pool sizing and timeouts, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct PoolConfig {
    #[serde(default = "default_min")]
    pub min: u32,
    #[serde(default = "default_max")]
    pub max: u32,
    #[serde(default = "default_acquire_secs")]
    pub acquire_secs: u64,
    #[serde(default = "default_idle_secs")]
    pub idle_secs: u64,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            min: default_min(),
            max: default_max(),
            acquire_secs: default_acquire_secs(),
            idle_secs: default_idle_secs(),
        }
    }
}

impl DatabaseConfig {
    /// Pool options for `sqlx`; the caller connects with `.connect(&self.url)`.
    ///
    /// Redemption commits hold a connection only for one short transaction,
    /// so the acquire timeout bounds how long a burst can queue.
    pub fn pool_options(&self) -> PgPoolOptions {
        PgPoolOptions::new()
            .min_connections(self.pool.min)
            .max_connections(self.pool.max)
            .acquire_timeout(Duration::from_secs(self.pool.acquire_secs))
            .idle_timeout(Duration::from_secs(self.pool.idle_secs))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("DATABASE__URL"));
        }
        if !(self.url.starts_with("postgres://") || self.url.starts_with("postgresql://")) {
            return Err(ValidationError::InvalidDatabaseUrl);
        }
        if self.pool.min > self.pool.max {
            return Err(ValidationError::InvalidPoolSize);
        }
        if self.pool.max == 0 || self.pool.max > MAX_POOL_SIZE {
            return Err(ValidationError::PoolSizeTooLarge);
        }
        if self.pool.acquire_secs == 0 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

fn default_min() -> u32 {
    2
}

fn default_max() -> u32 {
    16
}

fn default_acquire_secs() -> u64 {
    10
}

fn default_idle_secs() -> u64 {
    300
}
