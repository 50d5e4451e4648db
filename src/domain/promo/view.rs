//! User-facing promo projection.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CompanyId, PromoId};

use super::Promo;

/// What a user sees of a promo. Codes and capacity stay hidden.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPromoView {
    pub promo_id: PromoId,
    pub company_id: CompanyId,
    pub company_name: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    pub active: bool,
    pub is_activated_by_user: bool,
    pub like_count: u64,
    pub is_liked_by_user: bool,
    pub comment_count: u64,
}

impl UserPromoView {
    pub fn new(promo: &Promo, is_liked_by_user: bool, is_activated_by_user: bool) -> Self {
        Self {
            promo_id: promo.id,
            company_id: promo.company_id,
            company_name: promo.company_name.clone(),
            description: promo.description.clone(),
            image_url: promo.image_url.clone(),
            active: promo.active,
            is_activated_by_user,
            like_count: promo.like_count,
            is_liked_by_user,
            comment_count: promo.comment_count,
        }
    }
}
