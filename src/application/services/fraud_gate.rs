//! Fraud gate: cached, bounded-retry precondition for redemption.
//!
//! 1. A cached verdict for the user short-circuits the check.
//! 2. Otherwise the verdict service is asked up to `max_attempts` times; the
//!    first successful answer wins.
//! 3. If no attempt succeeds the gate fails closed with
//!    `FraudServiceUnavailable`, distinct from a `false` verdict.
//! 4. Verdicts carrying a future `cache_until` are cached until then.
//!
//! The gate never touches promo state and holds no lock while calling out.

use std::sync::Arc;

use crate::domain::foundation::{PromoId, Timestamp, UserId};
use crate::domain::fraud::VerdictRequest;
use crate::domain::promo::PromoError;
use crate::domain::user::User;
use crate::ports::{AncillaryStore, FraudVerdictService};

/// Time-boxed verdict cache keyed by user id.
pub struct VerdictCache {
    ancillary: Arc<dyn AncillaryStore>,
}

impl VerdictCache {
    pub fn new(ancillary: Arc<dyn AncillaryStore>) -> Self {
        Self { ancillary }
    }

    fn key(user_id: &UserId) -> String {
        format!("fraud:{}", user_id)
    }

    /// Cached verdict, if any. Store failures read as a miss.
    pub async fn get(&self, user_id: &UserId) -> Option<bool> {
        let key = Self::key(user_id);
        match self.ancillary.get_value(&key).await {
            Ok(Some(raw)) => match raw.as_str() {
                "true" => Some(true),
                "false" => Some(false),
                other => {
                    tracing::warn!(key = %key, value = other, "Ignoring unreadable cached verdict");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, "Verdict cache read failed: {}", e);
                None
            }
        }
    }

    /// Cache a verdict until `until`. Store failures are logged only.
    pub async fn put(&self, user_id: &UserId, ok: bool, until: Timestamp) {
        let key = Self::key(user_id);
        let value = if ok { "true" } else { "false" };
        if let Err(e) = self.ancillary.put_value_until(&key, value, until).await {
            tracing::warn!(key = %key, "Verdict cache write failed: {}", e);
        }
    }
}

pub struct FraudGate {
    service: Arc<dyn FraudVerdictService>,
    verdicts: VerdictCache,
    max_attempts: u32,
}

impl FraudGate {
    pub fn new(
        service: Arc<dyn FraudVerdictService>,
        verdicts: VerdictCache,
        max_attempts: u32,
    ) -> Self {
        Self {
            service,
            verdicts,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Allow or deny `user` redeeming `promo_id`.
    pub async fn check(
        &self,
        user: &User,
        promo_id: &PromoId,
        now: &Timestamp,
    ) -> Result<(), PromoError> {
        if let Some(ok) = self.verdicts.get(&user.id).await {
            tracing::debug!(user_id = %user.id, ok, "Using cached fraud verdict");
            return Self::verdict_to_result(ok, user);
        }

        let request = VerdictRequest {
            user_email: user.email.clone(),
            promo_id: *promo_id,
        };

        for attempt in 1..=self.max_attempts {
            match self.service.request_verdict(&request).await {
                Ok(verdict) => {
                    tracing::info!(
                        user_id = %user.id,
                        promo_id = %promo_id,
                        attempt,
                        ok = verdict.ok,
                        "Fraud verdict received"
                    );
                    if let Some(until) = verdict.cacheable_until(now) {
                        self.verdicts.put(&user.id, verdict.ok, until).await;
                    }
                    return Self::verdict_to_result(verdict.ok, user);
                }
                Err(e) => {
                    tracing::warn!(
                        user_id = %user.id,
                        attempt,
                        max_attempts = self.max_attempts,
                        "Fraud verdict attempt failed: {}",
                        e
                    );
                }
            }
        }

        tracing::error!(user_id = %user.id, promo_id = %promo_id, "Fraud check failed closed");
        Err(PromoError::FraudServiceUnavailable {
            attempts: self.max_attempts,
        })
    }

    fn verdict_to_result(ok: bool, user: &User) -> Result<(), PromoError> {
        if ok {
            Ok(())
        } else {
            Err(PromoError::FraudDenied(user.id))
        }
    }
}
