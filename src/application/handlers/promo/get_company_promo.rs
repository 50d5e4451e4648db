//! GetCompanyPromoHandler - Query handler for a company's own promo.

use std::sync::Arc;

use crate::application::handlers::lookup::require_owned;
use crate::application::services::{AvailabilityReconciler, PromoSummaryCache};
use crate::domain::foundation::{CompanyId, PromoId, Timestamp};
use crate::domain::promo::{Promo, PromoError};
use crate::ports::PromoRepository;

#[derive(Debug, Clone)]
pub struct GetCompanyPromoQuery {
    pub company_id: CompanyId,
    pub promo_id: PromoId,
}

pub struct GetCompanyPromoHandler {
    promos: Arc<dyn PromoRepository>,
    summaries: Arc<PromoSummaryCache>,
    reconciler: Arc<AvailabilityReconciler>,
}

impl GetCompanyPromoHandler {
    pub fn new(
        promos: Arc<dyn PromoRepository>,
        summaries: Arc<PromoSummaryCache>,
        reconciler: Arc<AvailabilityReconciler>,
    ) -> Self {
        Self {
            promos,
            summaries,
            reconciler,
        }
    }

    pub async fn handle(&self, query: GetCompanyPromoQuery) -> Result<Promo, PromoError> {
        require_owned(&self.summaries, &query.company_id, &query.promo_id).await?;

        let mut promo = self
            .promos
            .find_by_id(&query.promo_id)
            .await?
            .ok_or(PromoError::NotFound(query.promo_id))?;
        self.reconciler
            .reconcile(&mut promo, &Timestamp::now())
            .await?;
        Ok(promo)
    }
}
