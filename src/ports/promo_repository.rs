//! Promo repository port.
//!
//! Durable storage for the Promo aggregate, including the atomic capacity
//! mutation used by redemption.
//!
//! # Design
//!
//! - **Optimistic concurrency**: every write that changes capacity, window or
//!   targeting is a compare-and-swap on `capacity_version`. A stale version
//!   yields [`CommitOutcome::Conflict`], never an error.
//! - **Audit in the same write**: a redemption commit persists the new
//!   capacity and appends the activation record atomically.

use crate::domain::foundation::{CompanyId, DomainError, Page, PageRequest, PromoId};
use crate::domain::promo::{Activation, Audience, Capacity, Promo};
use async_trait::async_trait;

/// Result of a compare-and-swap write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Committed,
    /// `capacity_version` moved since the promo was read.
    Conflict,
}

/// The durable effect of one redemption.
#[derive(Debug, Clone)]
pub struct RedemptionCommit {
    pub promo_id: PromoId,
    pub expected_version: i64,
    pub capacity: Capacity,
    pub active: bool,
    pub activation: Activation,
}

/// Sort key for a company's promo list. Ties fall back to newest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromoSort {
    ActiveFrom,
    ActiveUntil,
}

/// Query over the promos of one company.
#[derive(Debug, Clone, Default)]
pub struct CompanyPromoQuery {
    pub page: PageRequest,
    pub sort_by: Option<PromoSort>,
    /// Case-insensitive; untargeted promos always match. Empty means any.
    pub countries: Vec<String>,
}

/// Candidate filter for a user's feed.
#[derive(Debug, Clone)]
pub struct FeedFilter {
    pub audience: Audience,
    /// Case-insensitive category match.
    pub category: Option<String>,
}

/// Repository port for Promo persistence.
#[async_trait]
pub trait PromoRepository: Send + Sync {
    /// Persist a newly created promo.
    async fn insert(&self, promo: &Promo) -> Result<(), DomainError>;

    /// Find a promo by ID. Returns `None` if it was never created.
    async fn find_by_id(&self, id: &PromoId) -> Result<Option<Promo>, DomainError>;

    /// Overwrite the editable fields and `active` if the stored version still
    /// equals `expected_version`; bumps the version on success.
    async fn update(&self, promo: &Promo, expected_version: i64)
        -> Result<CommitOutcome, DomainError>;

    /// Write a corrected `active` flag if the version has not moved.
    ///
    /// Does not bump the version: the flag is derived, not primary.
    async fn set_active(
        &self,
        id: &PromoId,
        expected_version: i64,
        active: bool,
    ) -> Result<CommitOutcome, DomainError>;

    /// Apply a redemption: new capacity, new flag, activation record, version
    /// bump. All or nothing.
    async fn commit_redemption(&self, commit: &RedemptionCommit)
        -> Result<CommitOutcome, DomainError>;

    /// A company's promos, paginated, with the total count.
    async fn list_by_company(
        &self,
        company_id: &CompanyId,
        query: &CompanyPromoQuery,
    ) -> Result<Page<Promo>, DomainError>;

    /// Every promo the audience is eligible for, newest first.
    async fn find_feed_candidates(&self, filter: &FeedFilter) -> Result<Vec<Promo>, DomainError>;
}
