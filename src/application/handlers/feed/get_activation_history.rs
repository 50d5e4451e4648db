//! GetActivationHistoryHandler - Query handler for a user's redemptions.

use std::sync::Arc;

use crate::application::handlers::lookup::{require_user, viewer_flags};
use crate::application::services::{AvailabilityReconciler, UserCache};
use crate::domain::foundation::{Page, PageRequest, PromoId, Timestamp, UserId};
use crate::domain::promo::{Activation, PromoError, UserPromoView};
use crate::ports::{ActivationReader, LikeRepository, PromoRepository};

#[derive(Debug, Clone, Default)]
pub struct GetActivationHistoryQuery {
    pub user_id: UserId,
    pub page: PageRequest,
}

/// One redemption with the promo it was made against.
#[derive(Debug, Clone)]
pub struct ActivationEntry {
    pub activation: Activation,
    pub promo: UserPromoView,
}

pub struct GetActivationHistoryHandler {
    promos: Arc<dyn PromoRepository>,
    likes: Arc<dyn LikeRepository>,
    activations: Arc<dyn ActivationReader>,
    users: Arc<UserCache>,
    reconciler: Arc<AvailabilityReconciler>,
}

impl GetActivationHistoryHandler {
    pub fn new(
        promos: Arc<dyn PromoRepository>,
        likes: Arc<dyn LikeRepository>,
        activations: Arc<dyn ActivationReader>,
        users: Arc<UserCache>,
        reconciler: Arc<AvailabilityReconciler>,
    ) -> Self {
        Self {
            promos,
            likes,
            activations,
            users,
            reconciler,
        }
    }

    /// Newest redemption first. Total counts redemptions, not distinct promos.
    pub async fn handle(
        &self,
        query: GetActivationHistoryQuery,
    ) -> Result<Page<ActivationEntry>, PromoError> {
        let user = require_user(&self.users, &query.user_id).await?;
        let history = self.activations.history(&user.id, query.page).await?;

        let ids: Vec<PromoId> = history.items.iter().map(|a| a.promo_id).collect();
        let (liked, _) =
            viewer_flags(self.likes.as_ref(), self.activations.as_ref(), &user.id, &ids).await?;

        let now = Timestamp::now();
        let mut entries = Vec::with_capacity(history.items.len());
        for activation in history.items {
            let Some(mut promo) = self.promos.find_by_id(&activation.promo_id).await? else {
                tracing::warn!(promo_id = %activation.promo_id, "Activation refers to a missing promo");
                continue;
            };
            self.reconciler.reconcile(&mut promo, &now).await?;
            entries.push(ActivationEntry {
                promo: UserPromoView::new(&promo, liked.contains(&promo.id), true),
                activation,
            });
        }

        Ok(Page::new(entries, history.total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::Timestamp;
    use crate::domain::promo::{Capacity, Promo, Target};
    use crate::domain::user::User;
    use crate::ports::RedemptionCommit;

    fn handler(fx: &Fixture) -> GetActivationHistoryHandler {
        GetActivationHistoryHandler::new(
            fx.promos(),
            fx.likes(),
            fx.activations(),
            fx.users.clone(),
            fx.reconciler.clone(),
        )
    }

    async fn redeem(fx: &Fixture, promo: &Promo, user: &User) {
        let mut current = fx.stored(promo).await;
        let version = current.capacity_version;
        current.redeem(&Timestamp::now()).unwrap();
        PromoRepository::commit_redemption(
            &fx.db,
            &RedemptionCommit {
                promo_id: promo.id,
                expected_version: version,
                capacity: current.capacity.clone(),
                active: current.active,
                activation: Activation::record(promo.id, user.id, user.country.clone(), Timestamp::now()),
            },
        )
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn history_is_newest_first() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let user = fx.user("u@example.com", 25, "US").await;
        let older = fx
            .promo(&company, Capacity::common("ALPHA1", 5).unwrap(), Target::default())
            .await;
        let newer = fx
            .promo(&company, Capacity::common("BRAVO2", 5).unwrap(), Target::default())
            .await;

        for promo in [&older, &newer] {
            redeem(&fx, promo, &user).await;
        }

        let page = handler(&fx)
            .handle(GetActivationHistoryQuery {
                user_id: user.id,
                page: PageRequest::new(10, 0),
            })
            .await
            .unwrap();

        let ids: Vec<PromoId> = page.items.iter().map(|e| e.promo.promo_id).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert_eq!(page.total, 2);
        assert!(page.items.iter().all(|e| e.promo.is_activated_by_user));
    }

    #[tokio::test]
    async fn stale_active_flag_is_corrected_in_history() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let user = fx.user("u@example.com", 25, "US").await;
        let promo = fx
            .promo(&company, Capacity::common("ALPHA1", 5).unwrap(), Target::default())
            .await;
        redeem(&fx, &promo, &user).await;

        // Window closes while the stored flag still says active.
        let mut stale = fx.stored(&promo).await;
        let version = stale.capacity_version;
        stale.window.active_until = Some(Timestamp::now().minus_secs(60));
        stale.active = true;
        PromoRepository::update(&fx.db, &stale, version).await.unwrap();

        let page = handler(&fx)
            .handle(GetActivationHistoryQuery {
                user_id: user.id,
                page: PageRequest::new(10, 0),
            })
            .await
            .unwrap();

        assert_eq!(page.items.len(), 1);
        assert!(!page.items[0].promo.active);
        assert!(!fx.stored(&promo).await.active);
    }
}
