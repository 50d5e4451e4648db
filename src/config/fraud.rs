//! Fraud verdict service configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::runtime::Environment;

const MAX_ATTEMPTS_LIMIT: u32 = 10;

/// Fraud verdict service configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FraudConfig {
    /// Base URL of the verdict service, e.g. `http://antifraud:9090`
    pub base_url: String,

    /// Per-attempt request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Attempts per redemption before failing closed
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl FraudConfig {
    /// Get request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Validate fraud service configuration
    pub fn validate(&self, environment: Environment) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("FRAUD__BASE_URL"));
        }
        if !self.base_url.starts_with("http://") && !self.base_url.starts_with("https://") {
            return Err(ValidationError::InvalidFraudUrl);
        }
        if environment == Environment::Production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::FraudUrlMustBeHttps);
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 60 {
            return Err(ValidationError::InvalidTimeout);
        }
        if self.max_attempts == 0 || self.max_attempts > MAX_ATTEMPTS_LIMIT {
            return Err(ValidationError::InvalidAttempts(
                "fraud.max_attempts",
                MAX_ATTEMPTS_LIMIT,
            ));
        }
        Ok(())
    }
}

impl Default for FraudConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            request_timeout_secs: default_request_timeout(),
            max_attempts: default_max_attempts(),
        }
    }
}

fn default_request_timeout() -> u64 {
    5
}

fn default_max_attempts() -> u32 {
    2
}
