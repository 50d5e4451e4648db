//! CreatePromoHandler - Command handler for publishing a promo.

use std::sync::Arc;

use crate::application::handlers::lookup::require_company;
use crate::application::services::{CompanyCache, PromoSummaryCache};
use crate::domain::foundation::{CompanyId, Timestamp};
use crate::domain::promo::{
    ActiveWindow, Capacity, NewPromo, Promo, PromoError, PromoMode, PromoSummary, Target,
};
use crate::ports::PromoRepository;

/// Command to create a promo.
///
/// Exactly one of `promo_common` / `promo_unique` must be given, matching
/// `mode`.
#[derive(Debug, Clone)]
pub struct CreatePromoCommand {
    pub company_id: CompanyId,
    pub description: String,
    pub image_url: Option<String>,
    pub target: Target,
    pub mode: PromoMode,
    pub max_count: u32,
    pub promo_common: Option<String>,
    pub promo_unique: Option<Vec<String>>,
    pub active_from: Option<Timestamp>,
    pub active_until: Option<Timestamp>,
}

#[derive(Debug, Clone)]
pub struct CreatePromoResult {
    pub promo: Promo,
}

pub struct CreatePromoHandler {
    promos: Arc<dyn PromoRepository>,
    companies: Arc<CompanyCache>,
    summaries: Arc<PromoSummaryCache>,
}

impl CreatePromoHandler {
    pub fn new(
        promos: Arc<dyn PromoRepository>,
        companies: Arc<CompanyCache>,
        summaries: Arc<PromoSummaryCache>,
    ) -> Self {
        Self {
            promos,
            companies,
            summaries,
        }
    }

    pub async fn handle(&self, cmd: CreatePromoCommand) -> Result<CreatePromoResult, PromoError> {
        // 1. Validate the capacity model and window before touching storage
        let capacity = Capacity::from_request(
            cmd.mode,
            cmd.max_count,
            cmd.promo_common,
            cmd.promo_unique,
        )?;
        let window = ActiveWindow::new(cmd.active_from, cmd.active_until)?;

        // 2. Company name is denormalized onto the promo
        let company = require_company(&self.companies, &cmd.company_id).await?;

        let promo = Promo::create(
            NewPromo {
                company_id: company.id,
                company_name: company.name,
                description: cmd.description,
                image_url: cmd.image_url,
                target: cmd.target,
                capacity,
                window,
            },
            Timestamp::now(),
        )?;

        // 3. Persist, then publish the summary
        self.promos.insert(&promo).await?;
        self.summaries.refresh(&PromoSummary::from(&promo)).await;

        tracing::info!(
            promo_id = %promo.id,
            company_id = %promo.company_id,
            mode = %promo.capacity.mode(),
            active = promo.active,
            "Promo created"
        );
        Ok(CreatePromoResult { promo })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::{ErrorCategory, ErrorCode};

    fn handler(fx: &Fixture) -> CreatePromoHandler {
        CreatePromoHandler::new(fx.promos(), fx.companies.clone(), fx.summaries.clone())
    }

    fn common(company_id: CompanyId) -> CreatePromoCommand {
        CreatePromoCommand {
            company_id,
            description: "Free dessert with any main".to_string(),
            image_url: None,
            target: Target::default(),
            mode: PromoMode::Common,
            max_count: 5,
            promo_common: Some("DESSERT".to_string()),
            promo_unique: None,
            active_from: None,
            active_until: None,
        }
    }

    #[tokio::test]
    async fn creates_active_promo_and_publishes_summary() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;

        let promo = handler(&fx).handle(common(company.id)).await.unwrap().promo;

        assert!(promo.active);
        assert_eq!(promo.company_name, "Bistro Ltd");
        assert_eq!(fx.stored(&promo).await, promo);
        assert!(fx.ancillary.contains_key(&format!("promo:{}", promo.id)).await);
    }

    #[tokio::test]
    async fn future_start_creates_inactive_promo() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let cmd = CreatePromoCommand {
            active_from: Some(Timestamp::now().plus_days(3)),
            ..common(company.id)
        };

        let promo = handler(&fx).handle(cmd).await.unwrap().promo;
        assert!(!promo.active);
    }

    #[tokio::test]
    async fn both_capacity_models_are_rejected() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let cmd = CreatePromoCommand {
            promo_unique: Some(vec!["AAA-1".to_string()]),
            ..common(company.id)
        };

        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailed);
        assert_eq!(fx.db.promo_count().await, 0);
    }

    #[tokio::test]
    async fn oversized_max_count_is_validation_error() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let cmd = CreatePromoCommand {
            max_count: 3_000_000_000,
            ..common(company.id)
        };

        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailed);
        assert_eq!(fx.db.promo_count().await, 0);
    }

    #[tokio::test]
    async fn short_shared_code_is_validation_error() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let cmd = CreatePromoCommand {
            promo_common: Some("PIE".to_string()),
            ..common(company.id)
        };

        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailed);
    }

    #[tokio::test]
    async fn unique_promo_requires_max_count_one() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let cmd = CreatePromoCommand {
            mode: PromoMode::Unique,
            max_count: 3,
            promo_common: None,
            promo_unique: Some(vec!["AAA-1".to_string(), "BBB-2".to_string()]),
            ..common(company.id)
        };

        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailed);
    }

    #[tokio::test]
    async fn reversed_window_is_rejected() {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let now = Timestamp::now();
        let cmd = CreatePromoCommand {
            active_from: Some(now.plus_days(2)),
            active_until: Some(now.plus_days(1)),
            ..common(company.id)
        };

        let err = handler(&fx).handle(cmd).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::ValidationFailed);
    }

    #[tokio::test]
    async fn unknown_company_is_not_found() {
        let fx = Fixture::new();
        let err = handler(&fx).handle(common(CompanyId::new())).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::CompanyNotFound);
    }
}
