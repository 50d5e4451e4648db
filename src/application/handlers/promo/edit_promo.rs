//! EditPromoHandler - Command handler for partial promo edits.
//!
//! Edits race with redemptions on the same row, so the write is a
//! compare-and-swap on `capacity_version`; a lost race re-reads and re-applies
//! the patch.

use std::sync::Arc;

use crate::application::handlers::lookup::require_owned;
use crate::application::services::PromoSummaryCache;
use crate::domain::foundation::{CompanyId, PromoId, Timestamp};
use crate::domain::promo::{Promo, PromoError, PromoPatch, PromoSummary};
use crate::ports::{CommitOutcome, PromoRepository};

#[derive(Debug, Clone)]
pub struct EditPromoCommand {
    pub company_id: CompanyId,
    pub promo_id: PromoId,
    pub patch: PromoPatch,
}

#[derive(Debug, Clone)]
pub struct EditPromoResult {
    pub promo: Promo,
}

pub struct EditPromoHandler {
    promos: Arc<dyn PromoRepository>,
    summaries: Arc<PromoSummaryCache>,
    max_commit_attempts: u32,
}

impl EditPromoHandler {
    pub fn new(
        promos: Arc<dyn PromoRepository>,
        summaries: Arc<PromoSummaryCache>,
        max_commit_attempts: u32,
    ) -> Self {
        Self {
            promos,
            summaries,
            max_commit_attempts: max_commit_attempts.max(1),
        }
    }

    pub async fn handle(&self, cmd: EditPromoCommand) -> Result<EditPromoResult, PromoError> {
        require_owned(&self.summaries, &cmd.company_id, &cmd.promo_id).await?;

        for attempt in 1..=self.max_commit_attempts {
            let mut promo = self
                .promos
                .find_by_id(&cmd.promo_id)
                .await?
                .ok_or(PromoError::NotFound(cmd.promo_id))?;

            let expected_version = promo.capacity_version;
            promo.apply_patch(cmd.patch.clone(), Timestamp::now())?;

            match self.promos.update(&promo, expected_version).await? {
                CommitOutcome::Committed => {
                    promo.capacity_version = expected_version + 1;
                    self.summaries.refresh(&PromoSummary::from(&promo)).await;
                    tracing::info!(promo_id = %promo.id, attempt, active = promo.active, "Promo edited");
                    return Ok(EditPromoResult { promo });
                }
                CommitOutcome::Conflict => {
                    tracing::debug!(promo_id = %cmd.promo_id, attempt, "Promo changed during edit, retrying");
                    tokio::task::yield_now().await;
                }
            }
        }

        Err(PromoError::ConcurrentModification {
            promo_id: cmd.promo_id,
            attempts: self.max_commit_attempts,
        })
    }
}
