//! ListCompanyPromosHandler - Query handler for a company's promo list.

use std::sync::Arc;

use crate::application::services::AvailabilityReconciler;
use crate::domain::foundation::{CompanyId, Page, Timestamp};
use crate::domain::promo::{Promo, PromoError};
use crate::ports::{CompanyPromoQuery, PromoRepository};

#[derive(Debug, Clone)]
pub struct ListCompanyPromosQuery {
    pub company_id: CompanyId,
    pub filter: CompanyPromoQuery,
}

pub struct ListCompanyPromosHandler {
    promos: Arc<dyn PromoRepository>,
    reconciler: Arc<AvailabilityReconciler>,
}

impl ListCompanyPromosHandler {
    pub fn new(promos: Arc<dyn PromoRepository>, reconciler: Arc<AvailabilityReconciler>) -> Self {
        Self { promos, reconciler }
    }

    pub async fn handle(&self, query: ListCompanyPromosQuery) -> Result<Page<Promo>, PromoError> {
        let mut page = self
            .promos
            .list_by_company(&query.company_id, &query.filter)
            .await?;

        let now = Timestamp::now();
        for promo in page.items.iter_mut() {
            self.reconciler.reconcile(promo, &now).await?;
        }
        Ok(page)
    }
}
