//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `PROMO_PLATFORM` prefix and nested values use double underscores as separators.
//!
//! The loaded [`AppConfig`] is built once at startup and handed by reference
//! to whatever needs it; nothing reads configuration from global state.
//!
//! # Example
//!
//! ```no_run
//! use promo_platform::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Fraud service at {}", config.fraud.base_url);
//! ```

mod database;
mod error;
mod fraud;
mod redemption;
mod redis;
mod runtime;

pub use database::{DatabaseConfig, PoolConfig};
pub use error::{ConfigError, ValidationError};
pub use fraud::FraudConfig;
pub use redemption::RedemptionConfig;
pub use redis::RedisConfig;
pub use runtime::{Environment, LogFormat, RuntimeConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Load using [`AppConfig::load()`] which reads from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Environment and log output
    #[serde(default)]
    pub runtime: RuntimeConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Redis configuration (ancillary store)
    pub redis: RedisConfig,

    /// Fraud verdict service
    pub fraud: FraudConfig,

    /// Redemption engine tuning
    #[serde(default)]
    pub redemption: RedemptionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `PROMO_PLATFORM` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `PROMO_PLATFORM__RUNTIME__ENVIRONMENT=production` -> `runtime.environment`
    /// - `PROMO_PLATFORM__DATABASE__URL=...` -> `database.url = ...`
    /// - `PROMO_PLATFORM__FRAUD__MAX_ATTEMPTS=3` -> `fraud.max_attempts = 3`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Required environment variables are missing
    /// - Values cannot be parsed into expected types
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PROMO_PLATFORM")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.runtime.validate()?;
        self.database.validate()?;
        self.redis.validate()?;
        self.fraud.validate(self.runtime.environment)?;
        self.redemption.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.runtime.is_production()
    }
}
