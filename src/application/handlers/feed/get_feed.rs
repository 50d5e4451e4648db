//! GetFeedHandler - Query handler for a user's promo feed.
//!
//! The store supplies every promo the user is eligible for (plus the
//! category filter), newest first. Availability is reconciled per promo
//! before the `active` filter and pagination apply, so a promo whose flag
//! drifted is listed under its true state.

use std::sync::Arc;

use crate::application::handlers::lookup::{require_user, viewer_flags};
use crate::application::services::{AvailabilityReconciler, UserCache};
use crate::domain::foundation::{Page, PageRequest, PromoId, Timestamp, UserId};
use crate::domain::promo::{PromoError, UserPromoView};
use crate::ports::{ActivationReader, FeedFilter, LikeRepository, PromoRepository};

#[derive(Debug, Clone, Default)]
pub struct GetFeedQuery {
    pub user_id: UserId,
    /// Case-insensitive category match.
    pub category: Option<String>,
    pub active: Option<bool>,
    pub page: PageRequest,
}

pub struct GetFeedHandler {
    promos: Arc<dyn PromoRepository>,
    likes: Arc<dyn LikeRepository>,
    activations: Arc<dyn ActivationReader>,
    users: Arc<UserCache>,
    reconciler: Arc<AvailabilityReconciler>,
}

impl GetFeedHandler {
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

    pub async fn handle(&self, query: GetFeedQuery) -> Result<Page<UserPromoView>, PromoError> {
        let user = require_user(&self.users, &query.user_id).await?;

        let candidates = self
            .promos
            .find_feed_candidates(&FeedFilter {
                audience: user.audience(),
                category: query.category.clone(),
            })
            .await?;

        let now = Timestamp::now();
        let mut visible = Vec::with_capacity(candidates.len());
        for mut promo in candidates {
            let availability = self.reconciler.reconcile(&mut promo, &now).await?;
            if query.active.map_or(true, |wanted| wanted == availability.active) {
                visible.push(promo);
            }
        }

        let page = Page::slice(visible, query.page);
        let ids: Vec<PromoId> = page.items.iter().map(|p| p.id).collect();
        let (liked, activated) =
            viewer_flags(self.likes.as_ref(), self.activations.as_ref(), &user.id, &ids).await?;

        Ok(page.map(|promo| {
            UserPromoView::new(&promo, liked.contains(&promo.id), activated.contains(&promo.id))
        }))
    }
}
