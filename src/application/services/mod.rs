//! Application services.
//!
//! Reusable engine pieces the handlers compose:
//!
//! - `CacheAside` - read-repair / write-through over durable and ancillary stores
//! - `EmailIndex` - ancillary email → id lookups
//! - `AvailabilityReconciler` - lazy correction of stale `active` flags
//! - `FraudGate` / `VerdictCache` - cached, bounded-retry fraud precondition
//! - `RedemptionAllocator` - compare-and-swap redemption loop

mod availability;
mod cache_aside;
mod email_index;
mod fraud_gate;
mod records;
mod redemption;

pub use availability::{AvailabilityReconciler, PromoSummarySource};
pub use cache_aside::{CacheAside, CompanyCache, PromoSummaryCache, UserCache};
pub use email_index::EmailIndex;
pub use fraud_gate::{FraudGate, VerdictCache};
pub use redemption::{Redemption, RedemptionAllocator};
