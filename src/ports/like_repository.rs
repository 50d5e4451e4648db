//! Like repository port.

use std::collections::HashSet;

use crate::domain::foundation::{DomainError, PromoId, UserId};
use async_trait::async_trait;

/// Per-user likes. Implementations keep the promo's `like_count` in step in
/// the same write.
#[async_trait]
pub trait LikeRepository: Send + Sync {
    /// Record a like. Returns `false` if the user had already liked the promo.
    async fn like(&self, user_id: &UserId, promo_id: &PromoId) -> Result<bool, DomainError>;

    /// Remove a like. Returns `false` if there was nothing to remove.
    async fn unlike(&self, user_id: &UserId, promo_id: &PromoId) -> Result<bool, DomainError>;

    /// Which of `promo_ids` the user has liked.
    async fn liked_among(
        &self,
        user_id: &UserId,
        promo_ids: &[PromoId],
    ) -> Result<HashSet<PromoId>, DomainError>;
}
