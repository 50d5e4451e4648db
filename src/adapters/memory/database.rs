//! In-memory durable store.
//!
//! One shared state behind a tokio `RwLock` implements every durable port, so
//! counters kept "in the same write" (likes, comments, activations) stay
//! consistent exactly as they would inside a database transaction.

use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::comment::Comment;
use crate::domain::company::Company;
use crate::domain::foundation::{
    CompanyId, DomainError, ErrorCode, Page, PageRequest, PromoId, Timestamp, UserId,
};
use crate::domain::promo::{Activation, Promo};
use crate::domain::user::User;
use crate::ports::{
    ActivationReader, CommitOutcome, CompanyPromoQuery, FeedFilter, PromoRepository, PromoSort,
    RedemptionCommit,
};

#[derive(Debug, Default)]
pub(super) struct State {
    pub(super) promos: HashMap<PromoId, Promo>,
    /// Creation order of promos.
    pub(super) promo_order: Vec<PromoId>,
    /// Append-only, oldest first.
    pub(super) activations: Vec<Activation>,
    pub(super) likes: HashSet<(UserId, PromoId)>,
    /// Oldest first.
    pub(super) comments: Vec<Comment>,
    pub(super) companies: HashMap<CompanyId, Company>,
    pub(super) users: HashMap<UserId, User>,
}

pub(super) fn promo_not_found(id: &PromoId) -> DomainError {
    DomainError::new(ErrorCode::PromoNotFound, format!("Promo not found: {}", id))
}

/// In-memory implementation of every durable port.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDatabase {
    pub(super) state: Arc<RwLock<State>>,
}

impl InMemoryDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        *self.state.write().await = State::default();
    }

    pub async fn promo_count(&self) -> usize {
        self.state.read().await.promos.len()
    }

    pub async fn activation_count(&self) -> usize {
        self.state.read().await.activations.len()
    }
}

fn newest_first(state: &State) -> impl Iterator<Item = &Promo> {
    state
        .promo_order
        .iter()
        .rev()
        .filter_map(|id| state.promos.get(id))
}

fn sort_key(promo: &Promo, sort: PromoSort) -> Option<Timestamp> {
    match sort {
        PromoSort::ActiveFrom => promo.window.active_from,
        PromoSort::ActiveUntil => promo.window.active_until,
    }
}

/// Descending with absent values last.
fn desc_nulls_last(a: Option<Timestamp>, b: Option<Timestamp>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[async_trait]
impl PromoRepository for InMemoryDatabase {
    async fn insert(&self, promo: &Promo) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        if state.promos.contains_key(&promo.id) {
            return Err(DomainError::new(
                ErrorCode::DatabaseError,
                format!("Promo already exists: {}", promo.id),
            ));
        }
        state.promo_order.push(promo.id);
        state.promos.insert(promo.id, promo.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &PromoId) -> Result<Option<Promo>, DomainError> {
        Ok(self.state.read().await.promos.get(id).cloned())
    }

    async fn update(
        &self,
        promo: &Promo,
        expected_version: i64,
    ) -> Result<CommitOutcome, DomainError> {
        let mut state = self.state.write().await;
        let stored = state
            .promos
            .get_mut(&promo.id)
            .ok_or_else(|| promo_not_found(&promo.id))?;
        if stored.capacity_version != expected_version {
            return Ok(CommitOutcome::Conflict);
        }

        stored.description = promo.description.clone();
        stored.image_url = promo.image_url.clone();
        stored.target = promo.target.clone();
        stored.capacity = promo.capacity.clone();
        stored.window = promo.window;
        stored.active = promo.active;
        stored.capacity_version = expected_version + 1;
        Ok(CommitOutcome::Committed)
    }

    async fn set_active(
        &self,
        id: &PromoId,
        expected_version: i64,
        active: bool,
    ) -> Result<CommitOutcome, DomainError> {
        let mut state = self.state.write().await;
        let stored = state.promos.get_mut(id).ok_or_else(|| promo_not_found(id))?;
        if stored.capacity_version != expected_version {
            return Ok(CommitOutcome::Conflict);
        }
        stored.active = active;
        Ok(CommitOutcome::Committed)
    }

    async fn commit_redemption(
        &self,
        commit: &RedemptionCommit,
    ) -> Result<CommitOutcome, DomainError> {
        let mut state = self.state.write().await;
        let stored = state
            .promos
            .get_mut(&commit.promo_id)
            .ok_or_else(|| promo_not_found(&commit.promo_id))?;
        if stored.capacity_version != commit.expected_version {
            return Ok(CommitOutcome::Conflict);
        }

        stored.capacity = commit.capacity.clone();
        stored.active = commit.active;
        stored.capacity_version = commit.expected_version + 1;
        state.activations.push(commit.activation.clone());
        Ok(CommitOutcome::Committed)
    }

    async fn list_by_company(
        &self,
        company_id: &CompanyId,
        query: &CompanyPromoQuery,
    ) -> Result<Page<Promo>, DomainError> {
        let state = self.state.read().await;
        let mut promos: Vec<Promo> = newest_first(&state)
            .filter(|p| &p.company_id == company_id)
            .filter(|p| {
                query.countries.is_empty()
                    || p.target.country.is_none()
                    || query.countries.iter().any(|c| p.target.matches_country(c))
            })
            .cloned()
            .collect();

        if let Some(sort) = query.sort_by {
            promos.sort_by(|a, b| desc_nulls_last(sort_key(a, sort), sort_key(b, sort)));
        }

        Ok(Page::slice(promos, query.page))
    }

    async fn find_feed_candidates(&self, filter: &FeedFilter) -> Result<Vec<Promo>, DomainError> {
        let state = self.state.read().await;
        Ok(newest_first(&state)
            .filter(|p| p.target.admits(&filter.audience))
            .filter(|p| {
                filter
                    .category
                    .as_deref()
                    .map_or(true, |c| p.target.has_category(c))
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ActivationReader for InMemoryDatabase {
    async fn activated_among(
        &self,
        user_id: &UserId,
        promo_ids: &[PromoId],
    ) -> Result<HashSet<PromoId>, DomainError> {
        let state = self.state.read().await;
        Ok(state
            .activations
            .iter()
            .filter(|a| &a.user_id == user_id && promo_ids.contains(&a.promo_id))
            .map(|a| a.promo_id)
            .collect())
    }

    async fn history(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Activation>, DomainError> {
        let state = self.state.read().await;
        let activations: Vec<Activation> = state
            .activations
            .iter()
            .rev()
            .filter(|a| &a.user_id == user_id)
            .cloned()
            .collect();
        Ok(Page::slice(activations, page))
    }

    async fn country_counts(&self, promo_id: &PromoId) -> Result<Vec<(String, u64)>, DomainError> {
        let state = self.state.read().await;
        let mut counts: HashMap<String, u64> = HashMap::new();
        for activation in state.activations.iter().filter(|a| &a.promo_id == promo_id) {
            *counts.entry(activation.country.to_lowercase()).or_insert(0) += 1;
        }
        Ok(counts.into_iter().collect())
    }
}
