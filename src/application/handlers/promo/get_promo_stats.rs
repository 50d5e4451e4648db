//! GetPromoStatsHandler - Query handler for per-country redemption counts.

use std::sync::Arc;

use crate::application::handlers::lookup::require_owned;
use crate::application::services::PromoSummaryCache;
use crate::domain::foundation::{CompanyId, PromoId};
use crate::domain::promo::{PromoError, PromoStats};
use crate::ports::ActivationReader;

#[derive(Debug, Clone)]
pub struct GetPromoStatsQuery {
    pub company_id: CompanyId,
    pub promo_id: PromoId,
}

pub struct GetPromoStatsHandler {
    activations: Arc<dyn ActivationReader>,
    summaries: Arc<PromoSummaryCache>,
}

impl GetPromoStatsHandler {
    pub fn new(activations: Arc<dyn ActivationReader>, summaries: Arc<PromoSummaryCache>) -> Self {
        Self {
            activations,
            summaries,
        }
    }

    pub async fn handle(&self, query: GetPromoStatsQuery) -> Result<PromoStats, PromoError> {
        require_owned(&self.summaries, &query.company_id, &query.promo_id).await?;
        let counts = self.activations.country_counts(&query.promo_id).await?;
        Ok(PromoStats::from_counts(counts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::Timestamp;
    use crate::domain::promo::{Activation, Capacity, Target};
    use crate::ports::{PromoRepository, RedemptionCommit};

    #[tokio::test]
    async fn counts_group_countries_case_insensitively() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let promo = fx
            .promo(&company, Capacity::common("XRAY10", 10).unwrap(), Target::default())
            .await;

        for country in ["us", "US", "fr"] {
            let user = fx
                .user(&format!("{}{}@example.com", country, fx.db.activation_count().await), 30, country)
                .await;
            let mut current = fx.stored(&promo).await;
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

        let stats = GetPromoStatsHandler::new(fx.activations(), fx.summaries.clone())
            .handle(GetPromoStatsQuery {
                company_id: company.id,
                promo_id: promo.id,
            })
            .await
            .unwrap();

        assert_eq!(stats.activations_count, 3);
        let countries: Vec<(&str, u64)> = stats
            .countries
            .iter()
            .map(|c| (c.country.as_str(), c.activations_count))
            .collect();
        assert_eq!(countries, vec![("fr", 1), ("us", 2)]);
    }
}
