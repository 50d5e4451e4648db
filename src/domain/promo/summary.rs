//! Denormalized promo projection kept in the ancillary store.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CompanyId, PromoId};

use super::Promo;

/// The fields needed for fast ownership and feed checks. Always re-derivable
/// from the durable [`Promo`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoSummary {
    pub promo_id: PromoId,
    pub company_id: CompanyId,
    pub like_count: u64,
    pub used_count: u64,
    pub active: bool,
}

impl From<&Promo> for PromoSummary {
    fn from(promo: &Promo) -> Self {
        Self {
            promo_id: promo.id,
            company_id: promo.company_id,
            like_count: promo.like_count,
            used_count: promo.capacity.used() as u64,
            active: promo.active,
        }
    }
}
