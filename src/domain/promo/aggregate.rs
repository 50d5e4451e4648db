//! Promo aggregate entity.
//!
//! # Design Decisions
//!
//! - **Derived flag**: `active` caches the result of [`evaluate`]; it is never
//!   trusted for decisions, only corrected.
//! - **Versioned capacity**: `capacity_version` is the compare-and-swap token
//!   for every durable write that changes capacity, window or targeting. The
//!   store bumps it; the aggregate only carries it.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{CompanyId, PromoId, Timestamp, ValidationError};

use super::{evaluate, ActiveWindow, Availability, Capacity, PromoError, Target};

const DESCRIPTION_MIN: usize = 10;
const DESCRIPTION_MAX: usize = 300;

/// A redeemable offer owned by a company.
///
/// # Invariants
///
/// - exactly one capacity model (enforced by [`Capacity`])
/// - `window.active_from <= window.active_until` when both are set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promo {
    pub id: PromoId,
    pub company_id: CompanyId,
    pub company_name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub target: Target,
    pub capacity: Capacity,
    pub window: ActiveWindow,
    pub active: bool,
    pub like_count: u64,
    pub comment_count: u64,
    pub capacity_version: i64,
    pub created_at: Timestamp,
}

/// Everything needed to create a promo.
#[derive(Debug, Clone)]
pub struct NewPromo {
    pub company_id: CompanyId,
    pub company_name: String,
    pub description: String,
    pub image_url: Option<String>,
    pub target: Target,
    pub capacity: Capacity,
    pub window: ActiveWindow,
}

/// Partial update applied by the owning company. `None` leaves a field alone.
#[derive(Debug, Clone, Default)]
pub struct PromoPatch {
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub target: Option<Target>,
    pub max_count: Option<u32>,
    pub active_from: Option<Timestamp>,
    pub active_until: Option<Timestamp>,
}

impl PromoPatch {
    pub fn is_empty(&self) -> bool {
        self.description.is_none()
            && self.image_url.is_none()
            && self.target.is_none()
            && self.max_count.is_none()
            && self.active_from.is_none()
            && self.active_until.is_none()
    }
}

fn validate_description(description: &str) -> Result<(), ValidationError> {
    let len = description.chars().count();
    if description.trim().is_empty() {
        return Err(ValidationError::empty_field("description"));
    }
    if !(DESCRIPTION_MIN..=DESCRIPTION_MAX).contains(&len) {
        return Err(ValidationError::out_of_range(
            "description",
            DESCRIPTION_MIN as i64,
            DESCRIPTION_MAX as i64,
            len as i64,
        ));
    }
    Ok(())
}

impl Promo {
    /// Creates a promo with its `active` flag derived at `now`.
    pub fn create(new: NewPromo, now: Timestamp) -> Result<Self, ValidationError> {
        validate_description(&new.description)?;
        new.target.validate()?;
        new.window.validate()?;

        let mut promo = Self {
            id: PromoId::new(),
            company_id: new.company_id,
            company_name: new.company_name,
            description: new.description,
            image_url: new.image_url,
            target: new.target,
            capacity: new.capacity,
            window: new.window,
            active: false,
            like_count: 0,
            comment_count: 0,
            capacity_version: 0,
            created_at: now,
        };
        promo.active = promo.availability(&now).active;
        Ok(promo)
    }

    /// Evaluates the promo against the stored flag.
    pub fn availability(&self, now: &Timestamp) -> Availability {
        evaluate(&self.capacity, &self.window, self.active, now)
    }

    pub fn is_owned_by(&self, company_id: &CompanyId) -> bool {
        &self.company_id == company_id
    }

    /// Applies a company edit and re-derives `active`.
    ///
    /// Validation happens against the patched state; on error the promo is
    /// left untouched.
    pub fn apply_patch(&mut self, patch: PromoPatch, now: Timestamp) -> Result<(), ValidationError> {
        let mut next = self.clone();

        if let Some(description) = patch.description {
            validate_description(&description)?;
            next.description = description;
        }
        if let Some(image_url) = patch.image_url {
            next.image_url = Some(image_url);
        }
        if let Some(target) = patch.target {
            target.validate()?;
            next.target = target;
        }
        if let Some(max_count) = patch.max_count {
            next.capacity.set_max_count(max_count)?;
        }
        if let Some(from) = patch.active_from {
            next.window.active_from = Some(from);
        }
        if let Some(until) = patch.active_until {
            next.window.active_until = Some(until);
        }
        next.window.validate()?;

        next.active = next.availability(&now).active;
        *self = next;
        Ok(())
    }

    /// Consumes one unit of capacity and returns the code to hand out.
    ///
    /// Re-derives `active` afterwards so an exhausting redemption also clears
    /// the flag in the same write.
    pub fn redeem(&mut self, now: &Timestamp) -> Result<String, PromoError> {
        let availability = self.availability(now);
        if let Some(reason) = availability.blocked_by {
            return Err(PromoError::unavailable(self.id, reason));
        }

        let code = self
            .capacity
            .consume()
            .ok_or_else(|| PromoError::unavailable(self.id, super::Unavailability::Exhausted))?;

        self.active = self.availability(now).active;
        Ok(code)
    }
}
