//! HTTP fraud verdict service.
//!
//! Posts `{ "user_email", "promo_id" }` to `{base_url}/api/validate` and reads
//! back `{ "ok", "cache_until"? }`. Only a 200 answer counts as a verdict;
//! everything else is a failed attempt.
//!
//! # Configuration
//!
//! ```ignore
//! let config = HttpFraudConfig::new("http://antifraud:9090")
//!     .with_timeout(Duration::from_secs(5));
//!
//! let service = HttpFraudService::new(config)?;
//! ```

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::fraud::{Verdict, VerdictRequest};
use crate::ports::FraudVerdictService;

/// Configuration for the HTTP fraud service.
#[derive(Debug, Clone)]
pub struct HttpFraudConfig {
    /// Base URL, e.g. `http://antifraud:9090`.
    pub base_url: String,
    /// Per-attempt timeout.
    pub timeout: Duration,
}

impl HttpFraudConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(5),
        }
    }

    /// Sets the base URL.
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Sets the per-attempt timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// reqwest-backed fraud verdict service.
pub struct HttpFraudService {
    config: HttpFraudConfig,
    client: Client,
}

impl HttpFraudService {
    pub fn new(config: HttpFraudConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::InternalError,
                    format!("Failed to create HTTP client: {}", e),
                )
            })?;

        Ok(Self { config, client })
    }

    fn validate_url(&self) -> String {
        format!("{}/api/validate", self.config.base_url.trim_end_matches('/'))
    }
}

fn unavailable(message: impl Into<String>) -> DomainError {
    DomainError::new(ErrorCode::FraudServiceUnavailable, message)
}

#[async_trait]
impl FraudVerdictService for HttpFraudService {
    async fn request_verdict(&self, request: &VerdictRequest) -> Result<Verdict, DomainError> {
        let body = ValidateRequest {
            user_email: request.user_email.as_str(),
            promo_id: request.promo_id.to_string(),
        };

        let response = self
            .client
            .post(self.validate_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    unavailable("Fraud service timed out")
                } else {
                    unavailable(format!("Fraud service request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(unavailable(format!(
                "Fraud service answered with status {}",
                status
            )));
        }

        let text = response
            .text()
            .await
            .map_err(|e| unavailable(format!("Failed to read fraud service body: {}", e)))?;

        parse_verdict(&text)
    }
}

#[derive(Debug, Serialize)]
struct ValidateRequest<'a> {
    user_email: &'a str,
    promo_id: String,
}

#[derive(Debug, Deserialize)]
struct ValidateResponse {
    ok: bool,
    #[serde(default)]
    cache_until: Option<String>,
}

fn parse_verdict(body: &str) -> Result<Verdict, DomainError> {
    let parsed: ValidateResponse = serde_json::from_str(body)
        .map_err(|e| unavailable(format!("Malformed fraud service response: {}", e)))?;

    let cache_until = match parsed.cache_until.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => {
            let parsed = parse_cache_until(raw);
            if parsed.is_none() {
                tracing::warn!(cache_until = raw, "Ignoring unparseable cache_until");
            }
            parsed
        }
    };

    Ok(Verdict {
        ok: parsed.ok,
        cache_until,
    })
}

/// RFC 3339, or a bare ISO-8601 date-time read as UTC.
fn parse_cache_until(raw: &str) -> Option<Timestamp> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(Timestamp::from_datetime(dt.with_timezone(&Utc)));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| Timestamp::from_datetime(naive.and_utc()))
}
