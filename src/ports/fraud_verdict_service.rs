//! Fraud verdict service port.
//!
//! One call is one attempt. Retry and caching policy live in the
//! application layer; the per-call timeout is owned by the implementation.

use crate::domain::foundation::DomainError;
use crate::domain::fraud::{Verdict, VerdictRequest};
use async_trait::async_trait;

/// External fraud check.
#[async_trait]
pub trait FraudVerdictService: Send + Sync {
    /// Ask for a verdict once.
    ///
    /// # Errors
    ///
    /// - `FraudServiceUnavailable` on transport failure, timeout, a
    ///   non-success status or an unreadable body
    async fn request_verdict(&self, request: &VerdictRequest) -> Result<Verdict, DomainError>;
}
