//! Application layer - Services, Commands, Queries, and Handlers.
//!
//! Services hold the reusable engine pieces (cache-aside access, availability
//! correction, fraud gating, redemption allocation). Handlers compose them
//! into the caller-facing operations, separating commands (write) from
//! queries (read).

pub mod handlers;
pub mod services;

pub use handlers::*;
pub use services::{
    AvailabilityReconciler, CacheAside, CompanyCache, EmailIndex, FraudGate, PromoSummaryCache,
    PromoSummarySource, Redemption, RedemptionAllocator, UserCache, VerdictCache,
};
