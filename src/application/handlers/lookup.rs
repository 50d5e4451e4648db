//! Lookups shared by several handlers.

use std::collections::HashSet;

use crate::application::services::{CompanyCache, PromoSummaryCache, UserCache};
use crate::domain::company::Company;
use crate::domain::foundation::{CompanyId, DomainError, ErrorCode, PromoId, UserId};
use crate::domain::promo::{PromoError, PromoSummary};
use crate::domain::user::User;
use crate::ports::{ActivationReader, LikeRepository};

pub(crate) async fn require_user(users: &UserCache, user_id: &UserId) -> Result<User, PromoError> {
    users
        .get(user_id)
        .await?
        .ok_or(PromoError::UserNotFound(*user_id))
}

pub(crate) async fn require_company(
    companies: &CompanyCache,
    company_id: &CompanyId,
) -> Result<Company, DomainError> {
    companies.get(company_id).await?.ok_or_else(|| {
        DomainError::new(
            ErrorCode::CompanyNotFound,
            format!("Company not found: {}", company_id),
        )
    })
}

/// Summary of a promo that must exist.
pub(crate) async fn require_promo(
    summaries: &PromoSummaryCache,
    promo_id: &PromoId,
) -> Result<PromoSummary, PromoError> {
    summaries
        .get(promo_id)
        .await?
        .ok_or(PromoError::NotFound(*promo_id))
}

/// Summary of a promo that must exist and belong to `company_id`.
pub(crate) async fn require_owned(
    summaries: &PromoSummaryCache,
    company_id: &CompanyId,
    promo_id: &PromoId,
) -> Result<PromoSummary, PromoError> {
    let summary = require_promo(summaries, promo_id).await?;
    if &summary.company_id != company_id {
        tracing::info!(promo_id = %promo_id, company_id = %company_id, "Promo owned by another company");
        return Err(PromoError::NotOwner(*promo_id));
    }
    Ok(summary)
}

/// Which of `promo_ids` the user liked and which they redeemed.
pub(crate) async fn viewer_flags(
    likes: &dyn LikeRepository,
    activations: &dyn ActivationReader,
    user_id: &UserId,
    promo_ids: &[PromoId],
) -> Result<(HashSet<PromoId>, HashSet<PromoId>), DomainError> {
    if promo_ids.is_empty() {
        return Ok((HashSet::new(), HashSet::new()));
    }
    futures::try_join!(
        likes.liked_among(user_id, promo_ids),
        activations.activated_among(user_id, promo_ids),
    )
}
