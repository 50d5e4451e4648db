//! Promo domain module.
//!
//! Promo lifecycle, targeting, availability and redemption rules.
//!
//! # Module Structure
//!
//! - `aggregate` - Promo aggregate, creation and edits
//! - `capacity` - COMMON / UNIQUE capacity models
//! - `allocation` - multiset scan over unique code pools
//! - `target` - targeting rules and the eligibility filter
//! - `availability` - derivation of the `active` flag
//! - `activation` - append-only redemption records
//! - `stats` - per-country activation counts
//! - `summary` - ancillary-store projection
//! - `view` - user-facing projection

mod activation;
mod aggregate;
mod allocation;
mod availability;
mod capacity;
mod errors;
mod stats;
mod summary;
mod target;
mod view;

pub use activation::Activation;
pub use aggregate::{NewPromo, Promo, PromoPatch};
pub use allocation::next_unique_code;
pub use availability::{evaluate, ActiveWindow, Availability, Unavailability};
pub use capacity::{
    Capacity, PromoMode, COMMON_CODE_LEN, MAX_COMMON_COUNT, MAX_UNIQUE_CODES, UNIQUE_CODE_LEN,
};
pub use errors::PromoError;
pub use stats::{CountryActivations, PromoStats};
pub use summary::PromoSummary;
pub use target::{Audience, Target};
pub use view::UserPromoView;
