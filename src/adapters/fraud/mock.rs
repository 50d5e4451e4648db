//! Mock fraud verdict service for testing.
//!
//! Scripted responses are consumed in order. Once the script runs out the
//! fallback verdict is returned, or a failure if none is configured.
//!
//! # Example
//!
//! ```ignore
//! let service = MockFraudService::new()
//!     .with_failure()
//!     .with_verdict(true, None);
//!
//! gate.check(&user, &promo_id, &now).await?;
//! assert_eq!(service.call_count(), 2);
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::domain::fraud::{Verdict, VerdictRequest};
use crate::ports::FraudVerdictService;

#[derive(Debug, Clone)]
enum MockResponse {
    Verdict(Verdict),
    Failure,
}

/// Mock fraud verdict service.
///
/// Clones share the script and the call history.
#[derive(Debug, Clone, Default)]
pub struct MockFraudService {
    responses: Arc<Mutex<VecDeque<MockResponse>>>,
    fallback: Option<Verdict>,
    calls: Arc<Mutex<Vec<VerdictRequest>>>,
}

impl MockFraudService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Service that approves everyone without a cache expiry.
    pub fn approving() -> Self {
        Self::new().with_fallback(true, None)
    }

    /// Queue a verdict.
    pub fn with_verdict(self, ok: bool, cache_until: Option<Timestamp>) -> Self {
        self.push(MockResponse::Verdict(Verdict { ok, cache_until }));
        self
    }

    /// Queue a failed attempt.
    pub fn with_failure(self) -> Self {
        self.push(MockResponse::Failure);
        self
    }

    /// Verdict returned once the script is exhausted.
    pub fn with_fallback(mut self, ok: bool, cache_until: Option<Timestamp>) -> Self {
        self.fallback = Some(Verdict { ok, cache_until });
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<VerdictRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn push(&self, response: MockResponse) {
        if let Ok(mut responses) = self.responses.lock() {
            responses.push_back(response);
        }
    }

    fn next_response(&self) -> Option<MockResponse> {
        self.responses
            .lock()
            .ok()
            .and_then(|mut responses| responses.pop_front())
    }
}

#[async_trait]
impl FraudVerdictService for MockFraudService {
    async fn request_verdict(&self, request: &VerdictRequest) -> Result<Verdict, DomainError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request.clone());
        }

        match self.next_response() {
            Some(MockResponse::Verdict(verdict)) => Ok(verdict),
            Some(MockResponse::Failure) => Err(DomainError::new(
                ErrorCode::FraudServiceUnavailable,
                "Mock fraud service failure",
            )),
            None => self.fallback.ok_or_else(|| {
                DomainError::new(
                    ErrorCode::FraudServiceUnavailable,
                    "Mock fraud service has no scripted response",
                )
            }),
        }
    }
}
