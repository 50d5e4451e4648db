//! LikePromoHandler / UnlikePromoHandler - idempotent like toggles.

use std::sync::Arc;

use crate::application::handlers::lookup::{require_promo, require_user};
use crate::application::services::{PromoSummaryCache, UserCache};
use crate::domain::foundation::{PromoId, UserId};
use crate::domain::promo::PromoError;
use crate::ports::LikeRepository;

#[derive(Debug, Clone)]
pub struct LikePromoCommand {
    pub user_id: UserId,
    pub promo_id: PromoId,
}

#[derive(Debug, Clone)]
pub struct UnlikePromoCommand {
    pub user_id: UserId,
    pub promo_id: PromoId,
}

/// Whether the call changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LikeResult {
    pub changed: bool,
}

/// Re-reads the summary after a like count change. Best effort.
async fn refresh_summary(summaries: &PromoSummaryCache, promo_id: &PromoId) {
    match summaries.source().load(promo_id).await {
        Ok(Some(summary)) => summaries.refresh(&summary).await,
        Ok(None) => {}
        Err(e) => tracing::warn!(promo_id = %promo_id, "Summary refresh skipped: {}", e),
    }
}

pub struct LikePromoHandler {
    likes: Arc<dyn LikeRepository>,
    users: Arc<UserCache>,
    summaries: Arc<PromoSummaryCache>,
}

impl LikePromoHandler {
    pub fn new(
        likes: Arc<dyn LikeRepository>,
        users: Arc<UserCache>,
        summaries: Arc<PromoSummaryCache>,
    ) -> Self {
        Self {
            likes,
            users,
            summaries,
        }
    }

    pub async fn handle(&self, cmd: LikePromoCommand) -> Result<LikeResult, PromoError> {
        require_user(&self.users, &cmd.user_id).await?;
        require_promo(&self.summaries, &cmd.promo_id).await?;

        let changed = self.likes.like(&cmd.user_id, &cmd.promo_id).await?;
        if changed {
            refresh_summary(&self.summaries, &cmd.promo_id).await;
        }
        Ok(LikeResult { changed })
    }
}

pub struct UnlikePromoHandler {
    likes: Arc<dyn LikeRepository>,
    users: Arc<UserCache>,
    summaries: Arc<PromoSummaryCache>,
}

impl UnlikePromoHandler {
    pub fn new(
        likes: Arc<dyn LikeRepository>,
        users: Arc<UserCache>,
        summaries: Arc<PromoSummaryCache>,
    ) -> Self {
        Self {
            likes,
            users,
            summaries,
        }
    }

    pub async fn handle(&self, cmd: UnlikePromoCommand) -> Result<LikeResult, PromoError> {
        require_user(&self.users, &cmd.user_id).await?;
        require_promo(&self.summaries, &cmd.promo_id).await?;

        let changed = self.likes.unlike(&cmd.user_id, &cmd.promo_id).await?;
        if changed {
            refresh_summary(&self.summaries, &cmd.promo_id).await;
        }
        Ok(LikeResult { changed })
    }
}
