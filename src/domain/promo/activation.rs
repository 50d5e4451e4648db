//! Activation records: the append-only audit trail of redemptions.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ActivationId, PromoId, Timestamp, UserId};

/// One successful redemption. Never updated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Activation {
    pub id: ActivationId,
    pub promo_id: PromoId,
    pub user_id: UserId,
    /// User's country at the time of redemption.
    pub country: String,
    pub activated_at: Timestamp,
}

impl Activation {
    pub fn record(
        promo_id: PromoId,
        user_id: UserId,
        country: impl Into<String>,
        activated_at: Timestamp,
    ) -> Self {
        Self {
            id: ActivationId::new(),
            promo_id,
            user_id,
            country: country.into(),
            activated_at,
        }
    }
}
