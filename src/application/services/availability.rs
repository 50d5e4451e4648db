//! Lazy, read-triggered correction of the stored `active` flag.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, PromoId, Timestamp};
use crate::domain::promo::{Availability, Promo, PromoSummary};
use crate::ports::{CommitOutcome, PromoRepository, RecordSource};

use super::PromoSummaryCache;

/// Durable source for promo summaries.
pub struct PromoSummarySource {
    promos: Arc<dyn PromoRepository>,
}

impl PromoSummarySource {
    pub fn new(promos: Arc<dyn PromoRepository>) -> Self {
        Self { promos }
    }
}

#[async_trait]
impl RecordSource<PromoSummary> for PromoSummarySource {
    async fn load(&self, id: &PromoId) -> Result<Option<PromoSummary>, DomainError> {
        Ok(self
            .promos
            .find_by_id(id)
            .await?
            .map(|promo| PromoSummary::from(&promo)))
    }
}

/// Evaluates promos and writes back drifted `active` flags.
///
/// There is no background sweep: correction happens when a promo is read.
pub struct AvailabilityReconciler {
    promos: Arc<dyn PromoRepository>,
    summaries: Arc<PromoSummaryCache>,
}

impl AvailabilityReconciler {
    pub fn new(promos: Arc<dyn PromoRepository>, summaries: Arc<PromoSummaryCache>) -> Self {
        Self { promos, summaries }
    }

    /// Evaluates `promo` at `now`, persisting and applying a correction if the
    /// stored flag is stale.
    ///
    /// A second call on the same value performs no write.
    pub async fn reconcile(
        &self,
        promo: &mut Promo,
        now: &Timestamp,
    ) -> Result<Availability, DomainError> {
        let availability = promo.availability(now);
        if !availability.needs_correction {
            return Ok(availability);
        }

        match self
            .promos
            .set_active(&promo.id, promo.capacity_version, availability.active)
            .await?
        {
            CommitOutcome::Committed => {
                tracing::info!(
                    promo_id = %promo.id,
                    active = availability.active,
                    "Corrected stale active flag"
                );
                promo.active = availability.active;
                self.summaries.refresh(&PromoSummary::from(&*promo)).await;
            }
            CommitOutcome::Conflict => {
                // The promo changed since it was read; its writer derived a
                // fresh flag already.
                tracing::debug!(promo_id = %promo.id, "Skipped active correction on moved version");
                promo.active = availability.active;
            }
        }

        Ok(availability)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAncillaryStore, InMemoryDatabase};
    use crate::domain::foundation::CompanyId;
    use crate::domain::promo::{ActiveWindow, Capacity, NewPromo, Target};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    // ════════════════════════════════════════════════════════════════════════════
    // Counting repository
    // ════════════════════════════════════════════════════════════════════════════

    /// Delegates to the in-memory database and counts `set_active` calls.
    struct CountingRepository {
        inner: InMemoryDatabase,
        corrections: AtomicUsize,
    }

    #[async_trait]
    impl PromoRepository for CountingRepository {
        async fn insert(&self, promo: &Promo) -> Result<(), DomainError> {
            self.inner.insert(promo).await
        }

        async fn find_by_id(&self, id: &PromoId) -> Result<Option<Promo>, DomainError> {
            PromoRepository::find_by_id(&self.inner, id).await
        }

        async fn update(&self, promo: &Promo, expected: i64) -> Result<CommitOutcome, DomainError> {
            self.inner.update(promo, expected).await
        }

        async fn set_active(
            &self,
            id: &PromoId,
            expected: i64,
            active: bool,
        ) -> Result<CommitOutcome, DomainError> {
            self.corrections.fetch_add(1, Ordering::SeqCst);
            self.inner.set_active(id, expected, active).await
        }

        async fn commit_redemption(
            &self,
            commit: &crate::ports::RedemptionCommit,
        ) -> Result<CommitOutcome, DomainError> {
            self.inner.commit_redemption(commit).await
        }

        async fn list_by_company(
            &self,
            company_id: &CompanyId,
            query: &crate::ports::CompanyPromoQuery,
        ) -> Result<crate::domain::foundation::Page<Promo>, DomainError> {
            self.inner.list_by_company(company_id, query).await
        }

        async fn find_feed_candidates(
            &self,
            filter: &crate::ports::FeedFilter,
        ) -> Result<Vec<Promo>, DomainError> {
            self.inner.find_feed_candidates(filter).await
        }
    }

    fn now() -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000).unwrap()
    }

    fn stale_promo() -> Promo {
        let mut promo = Promo::create(
            NewPromo {
                company_id: CompanyId::new(),
                company_name: "Acme Corp".to_string(),
                description: "Free shipping this week".to_string(),
                image_url: None,
                target: Target::default(),
                capacity: Capacity::common("SHIPFREE", 5).unwrap(),
                window: ActiveWindow::new(None, Some(now().plus_days(1))).unwrap(),
            },
            now(),
        )
        .unwrap();
        assert!(promo.active);
        // Stored as active, but the window will have closed by the time it is read.
        promo.window.active_until = Some(now().minus_secs(10));
        promo
    }

    fn reconciler(repo: Arc<CountingRepository>) -> AvailabilityReconciler {
        let promos: Arc<dyn PromoRepository> = repo;
        let source: Arc<dyn RecordSource<PromoSummary>> =
            Arc::new(PromoSummarySource::new(promos.clone()));
        let summaries = Arc::new(PromoSummaryCache::new(
            source,
            Arc::new(InMemoryAncillaryStore::new()),
            Duration::from_secs(60),
        ));
        AvailabilityReconciler::new(promos, summaries)
    }

    #[tokio::test]
    async fn stale_flag_is_written_back_once() {
        let repo = Arc::new(CountingRepository {
            inner: InMemoryDatabase::new(),
            corrections: AtomicUsize::new(0),
        });
        let mut promo = stale_promo();
        repo.insert(&promo).await.unwrap();
        let reconciler = reconciler(repo.clone());

        let first = reconciler.reconcile(&mut promo, &now()).await.unwrap();
        let second = reconciler.reconcile(&mut promo, &now()).await.unwrap();

        assert!(!first.active);
        assert_eq!(first.active, second.active);
        assert_eq!(repo.corrections.load(Ordering::SeqCst), 1);

        let stored = repo.find_by_id(&promo.id).await.unwrap().unwrap();
        assert!(!stored.active);
    }

    #[tokio::test]
    async fn fresh_flag_is_not_written() {
        let repo = Arc::new(CountingRepository {
            inner: InMemoryDatabase::new(),
            corrections: AtomicUsize::new(0),
        });
        let mut promo = stale_promo();
        promo.active = false;
        repo.insert(&promo).await.unwrap();

        reconciler(repo.clone())
            .reconcile(&mut promo, &now())
            .await
            .unwrap();
        assert_eq!(repo.corrections.load(Ordering::SeqCst), 0);
    }
}
