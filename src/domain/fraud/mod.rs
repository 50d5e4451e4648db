//! Fraud verdict value types.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{Email, PromoId, Timestamp};

/// What the verdict service is asked about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerdictRequest {
    pub user_email: Email,
    pub promo_id: PromoId,
}

/// A verdict returned by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Verdict {
    pub ok: bool,
    /// When present, the verdict may be reused until this instant.
    pub cache_until: Option<Timestamp>,
}

impl Verdict {
    /// Expiry to cache this verdict with, if it should be cached at all.
    ///
    /// Verdicts without an expiry, or whose expiry has already passed, are
    /// one-shot.
    pub fn cacheable_until(&self, now: &Timestamp) -> Option<Timestamp> {
        self.cache_until.filter(|until| until.is_after(now))
    }
}
