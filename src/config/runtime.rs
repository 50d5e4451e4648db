//! Process-level settings: deployment environment and log output.

use serde::Deserialize;

use super::error::ValidationError;

/// Deployment environment.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// JSON in production, compact elsewhere.
    #[default]
    Auto,
    Json,
    Compact,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RuntimeConfig {
    #[serde(default)]
    pub environment: Environment,

    /// `EnvFilter` directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,

    #[serde(default)]
    pub log_format: LogFormat,
}

impl RuntimeConfig {
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Whether log lines should be emitted as JSON.
    pub fn json_logs(&self) -> bool {
        match self.log_format {
            LogFormat::Json => true,
            LogFormat::Compact => false,
            LogFormat::Auto => self.is_production(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.log_filter.trim().is_empty() {
            return Err(ValidationError::MissingRequired("RUNTIME__LOG_FILTER"));
        }
        Ok(())
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            environment: Environment::default(),
            log_filter: default_log_filter(),
            log_format: LogFormat::default(),
        }
    }
}

fn default_log_filter() -> String {
    "info,promo_platform=debug,sqlx=warn".to_string()
}
