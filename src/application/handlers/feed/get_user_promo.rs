//! GetUserPromoHandler - Query handler for one promo as a user sees it.

use std::sync::Arc;

use crate::application::handlers::lookup::{require_user, viewer_flags};
use crate::application::services::{AvailabilityReconciler, UserCache};
use crate::domain::foundation::{PromoId, Timestamp, UserId};
use crate::domain::promo::{PromoError, UserPromoView};
use crate::ports::{ActivationReader, LikeRepository, PromoRepository};

#[derive(Debug, Clone)]
pub struct GetUserPromoQuery {
    pub user_id: UserId,
    pub promo_id: PromoId,
}

pub struct GetUserPromoHandler {
    promos: Arc<dyn PromoRepository>,
    likes: Arc<dyn LikeRepository>,
    activations: Arc<dyn ActivationReader>,
    users: Arc<UserCache>,
    reconciler: Arc<AvailabilityReconciler>,
}

impl GetUserPromoHandler {
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

    pub async fn handle(&self, query: GetUserPromoQuery) -> Result<UserPromoView, PromoError> {
        let user = require_user(&self.users, &query.user_id).await?;

        let mut promo = self
            .promos
            .find_by_id(&query.promo_id)
            .await?
            .ok_or(PromoError::NotFound(query.promo_id))?;
        self.reconciler
            .reconcile(&mut promo, &Timestamp::now())
            .await?;

        let (liked, activated) = viewer_flags(
            self.likes.as_ref(),
            self.activations.as_ref(),
            &user.id,
            &[promo.id],
        )
        .await?;

        Ok(UserPromoView::new(
            &promo,
            liked.contains(&promo.id),
            activated.contains(&promo.id),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::ErrorCategory;
    use crate::domain::promo::{Capacity, Target};

    fn handler(fx: &Fixture) -> GetUserPromoHandler {
        GetUserPromoHandler::new(
            fx.promos(),
            fx.likes(),
            fx.activations(),
            fx.users.clone(),
            fx.reconciler.clone(),
        )
    }

    #[tokio::test]
    async fn returns_view_with_flags() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let user = fx.user("u@example.com", 25, "US").await;
        let promo = fx
            .promo(&company, Capacity::common("ALPHA1", 5).unwrap(), Target::default())
            .await;

        let view = handler(&fx)
            .handle(GetUserPromoQuery {
                user_id: user.id,
                promo_id: promo.id,
            })
            .await
            .unwrap();

        assert_eq!(view.promo_id, promo.id);
        assert_eq!(view.company_name, "Bistro Ltd");
        assert!(view.active);
        assert!(!view.is_liked_by_user);
    }

    #[tokio::test]
    async fn missing_promo_is_not_found() {
        let fx = Fixture::new();
        let user = fx.user("u@example.com", 25, "US").await;
        let err = handler(&fx)
            .handle(GetUserPromoQuery {
                user_id: user.id,
                promo_id: PromoId::new(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
