//! Redemption engine tuning

use serde::Deserialize;

use super::error::ValidationError;

const MAX_COMMIT_ATTEMPTS_LIMIT: u32 = 1000;

/// Redemption engine configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedemptionConfig {
    /// Compare-and-swap attempts before a write gives up with
    /// `ConcurrentModification`
    #[serde(default = "default_max_commit_attempts")]
    pub max_commit_attempts: u32,
}

impl RedemptionConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_commit_attempts == 0 || self.max_commit_attempts > MAX_COMMIT_ATTEMPTS_LIMIT {
            return Err(ValidationError::InvalidAttempts(
                "redemption.max_commit_attempts",
                MAX_COMMIT_ATTEMPTS_LIMIT,
            ));
        }
        Ok(())
    }
}

impl Default for RedemptionConfig {
    fn default() -> Self {
        Self {
            max_commit_attempts: default_max_commit_attempts(),
        }
    }
}

fn default_max_commit_attempts() -> u32 {
    16
}
