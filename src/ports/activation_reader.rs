//! Activation reader port (read side of the redemption audit trail).

use std::collections::HashSet;

use crate::domain::foundation::{DomainError, Page, PageRequest, PromoId, UserId};
use crate::domain::promo::Activation;
use async_trait::async_trait;

/// Read-only queries over activation records.
#[async_trait]
pub trait ActivationReader: Send + Sync {
    /// Which of `promo_ids` the user has redeemed at least once.
    async fn activated_among(
        &self,
        user_id: &UserId,
        promo_ids: &[PromoId],
    ) -> Result<HashSet<PromoId>, DomainError>;

    /// The user's activations, most recent first.
    async fn history(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Activation>, DomainError>;

    /// Raw `(country, activations)` pairs for one promo, unordered.
    async fn country_counts(&self, promo_id: &PromoId) -> Result<Vec<(String, u64)>, DomainError>;
}
