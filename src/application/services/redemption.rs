//! Redemption allocator.
//!
//! Runs the read → reconcile → check → allocate → compare-and-swap cycle. A
//! lost race re-reads the promo and decides again, so at most one redemption
//! succeeds per unit of capacity.
//!
//! Conflicts back off exponentially with full jitter. A caller that loses
//! every one of `max_commit_attempts` races gets `ConcurrentModification`
//! (Conflict) even if capacity remains; raise `redemption.max_commit_attempts`
//! for promos expected to see heavy bursts.

use std::sync::Arc;
use std::time::Duration;

use uuid::Uuid;

use crate::domain::foundation::{PromoId, Timestamp};
use crate::domain::promo::{Activation, Promo, PromoError};
use crate::domain::user::User;
use crate::ports::{CommitOutcome, PromoRepository, RedemptionCommit};

use super::AvailabilityReconciler;

/// A committed redemption.
#[derive(Debug, Clone)]
pub struct Redemption {
    pub code: String,
    pub activation: Activation,
    /// Promo state as committed.
    pub promo: Promo,
}

pub struct RedemptionAllocator {
    promos: Arc<dyn PromoRepository>,
    reconciler: Arc<AvailabilityReconciler>,
    max_commit_attempts: u32,
}

impl RedemptionAllocator {
    pub fn new(
        promos: Arc<dyn PromoRepository>,
        reconciler: Arc<AvailabilityReconciler>,
        max_commit_attempts: u32,
    ) -> Self {
        Self {
            promos,
            reconciler,
            max_commit_attempts: max_commit_attempts.max(1),
        }
    }

    /// Allocates one code of `promo_id` to `user`.
    ///
    /// Preconditions, in order: the promo exists, it is active after
    /// correction, and the user passes the eligibility filter.
    pub async fn allocate(
        &self,
        promo_id: &PromoId,
        user: &User,
        now: Timestamp,
    ) -> Result<Redemption, PromoError> {
        let audience = user.audience();

        for attempt in 1..=self.max_commit_attempts {
            let mut promo = self
                .promos
                .find_by_id(promo_id)
                .await?
                .ok_or(PromoError::NotFound(*promo_id))?;

            let availability = self.reconciler.reconcile(&mut promo, &now).await?;
            if let Some(reason) = availability.blocked_by {
                tracing::info!(promo_id = %promo_id, user_id = %user.id, %reason, "Redemption denied");
                return Err(PromoError::unavailable(*promo_id, reason));
            }

            if !promo.target.admits(&audience) {
                tracing::info!(promo_id = %promo_id, user_id = %user.id, "User not eligible for promo");
                return Err(PromoError::Ineligible(*promo_id));
            }

            let expected_version = promo.capacity_version;
            let code = promo.redeem(&now)?;
            let activation = Activation::record(promo.id, user.id, user.country.clone(), now);

            let commit = RedemptionCommit {
                promo_id: promo.id,
                expected_version,
                capacity: promo.capacity.clone(),
                active: promo.active,
                activation: activation.clone(),
            };

            match self.promos.commit_redemption(&commit).await? {
                CommitOutcome::Committed => {
                    promo.capacity_version = expected_version + 1;
                    tracing::info!(
                        promo_id = %promo_id,
                        user_id = %user.id,
                        attempt,
                        remaining = promo.capacity.remaining(),
                        "Promo redeemed"
                    );
                    return Ok(Redemption {
                        code,
                        activation,
                        promo,
                    });
                }
                CommitOutcome::Conflict => {
                    tracing::debug!(
                        promo_id = %promo_id,
                        attempt,
                        "Capacity changed concurrently, retrying"
                    );
                    tokio::time::sleep(retry_backoff(attempt, Uuid::new_v4().as_u128())).await;
                }
            }
        }

        tracing::warn!(
            promo_id = %promo_id,
            attempts = self.max_commit_attempts,
            "Gave up redeeming under contention"
        );
        Err(PromoError::ConcurrentModification {
            promo_id: *promo_id,
            attempts: self.max_commit_attempts,
        })
    }
}

const BACKOFF_BASE_MICROS: u64 = 500;
const BACKOFF_CAP_MICROS: u64 = 50_000;

/// Full-jitter delay before retry `attempt + 1`: uniform in
/// `[0, min(cap, base * 2^(attempt - 1))]`, picked by `entropy`.
fn retry_backoff(attempt: u32, entropy: u128) -> Duration {
    let exp = attempt.saturating_sub(1).min(16);
    let ceiling = BACKOFF_BASE_MICROS
        .saturating_mul(1 << exp)
        .min(BACKOFF_CAP_MICROS);
    Duration::from_micros((entropy % u128::from(ceiling + 1)) as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAncillaryStore, InMemoryDatabase};
    use crate::application::services::{PromoSummaryCache, PromoSummarySource};
    use crate::domain::foundation::{CompanyId, Email, ErrorCategory};
    use crate::domain::promo::{ActiveWindow, Capacity, NewPromo, PromoSummary, Target, Unavailability};
    use crate::domain::user::NewUser;
    use crate::ports::{ActivationReader, RecordSource};
    use std::time::Duration;

    fn user(age: u8, country: &str) -> User {
        User::register(NewUser {
            name: "Sam".to_string(),
            surname: "Jones".to_string(),
            email: Email::parse("sam@example.com").unwrap(),
            avatar_url: None,
            age,
            country: country.to_string(),
            password_hash: "hash".to_string(),
        })
        .unwrap()
    }

    fn promo(capacity: Capacity, target: Target) -> Promo {
        Promo::create(
            NewPromo {
                company_id: CompanyId::new(),
                company_name: "Acme Corp".to_string(),
                description: "Two for one on coffee".to_string(),
                image_url: None,
                target,
                capacity,
                window: ActiveWindow::default(),
            },
            Timestamp::now(),
        )
        .unwrap()
    }

    fn allocator(db: &InMemoryDatabase, max_attempts: u32) -> RedemptionAllocator {
        let promos: Arc<dyn PromoRepository> = Arc::new(db.clone());
        let source: Arc<dyn RecordSource<PromoSummary>> =
            Arc::new(PromoSummarySource::new(promos.clone()));
        let summaries = Arc::new(PromoSummaryCache::new(
            source,
            Arc::new(InMemoryAncillaryStore::new()),
            Duration::from_secs(60),
        ));
        let reconciler = Arc::new(AvailabilityReconciler::new(promos.clone(), summaries));
        RedemptionAllocator::new(promos, reconciler, max_attempts)
    }

    #[tokio::test]
    async fn unique_pool_is_drained_then_denied() {
        let db = InMemoryDatabase::new();
        let promo = promo(
            Capacity::unique(vec!["AAA".into(), "BBB".into(), "AAA".into()]).unwrap(),
            Target::default(),
        );
        PromoRepository::insert(&db, &promo).await.unwrap();
        let allocator = allocator(&db, 4);
        let user = user(30, "US");

        let mut codes = Vec::new();
        for _ in 0..3 {
            codes.push(allocator.allocate(&promo.id, &user, Timestamp::now()).await.unwrap().code);
        }
        assert_eq!(codes, vec!["AAA", "BBB", "AAA"]);

        let err = allocator
            .allocate(&promo.id, &user, Timestamp::now())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PromoError::Unavailable {
                reason: Unavailability::Exhausted,
                ..
            }
        ));
        assert_eq!(err.category(), ErrorCategory::PermissionDenied);

        let stored = PromoRepository::find_by_id(&db, &promo.id).await.unwrap().unwrap();
        assert!(!stored.active);
        assert_eq!(stored.capacity.used(), 3);
    }

    #[tokio::test]
    async fn unknown_promo_is_not_found() {
        let db = InMemoryDatabase::new();
        let err = allocator(&db, 4)
            .allocate(&PromoId::new(), &user(30, "US"), Timestamp::now())
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }

    #[tokio::test]
    async fn ineligible_user_consumes_nothing() {
        let db = InMemoryDatabase::new();
        let promo = promo(
            Capacity::common("SHARED", 3).unwrap(),
            Target {
                country: Some("US".to_string()),
                age_from: Some(18),
                ..Target::default()
            },
        );
        PromoRepository::insert(&db, &promo).await.unwrap();

        let err = allocator(&db, 4)
            .allocate(&promo.id, &user(17, "us"), Timestamp::now())
            .await
            .unwrap_err();

        assert!(matches!(err, PromoError::Ineligible(_)));
        let stored = PromoRepository::find_by_id(&db, &promo.id).await.unwrap().unwrap();
        assert_eq!(stored.capacity.used(), 0);
    }

    #[tokio::test]
    async fn successful_redemption_records_activation() {
        let db = InMemoryDatabase::new();
        let promo = promo(Capacity::common("SHARED", 3).unwrap(), Target::default());
        PromoRepository::insert(&db, &promo).await.unwrap();
        let user = user(40, "fr");

        let redemption = allocator(&db, 4)
            .allocate(&promo.id, &user, Timestamp::now())
            .await
            .unwrap();

        assert_eq!(redemption.code, "SHARED");
        assert_eq!(redemption.activation.country, "fr");
        assert_eq!(redemption.promo.capacity_version, 1);

        let counts = db.country_counts(&promo.id).await.unwrap();
        assert_eq!(counts, vec![("fr".to_string(), 1)]);
    }

    #[test]
    fn backoff_grows_then_caps() {
        // Entropy equal to the ceiling selects the ceiling itself.
        assert_eq!(retry_backoff(1, 500), Duration::from_micros(500));
        assert_eq!(retry_backoff(1, 501), Duration::ZERO);
        assert_eq!(retry_backoff(3, 2_000), Duration::from_micros(2_000));
        assert_eq!(retry_backoff(8, 50_000), Duration::from_micros(BACKOFF_CAP_MICROS));
        for attempt in [1, 8, 16, 200] {
            assert!(retry_backoff(attempt, u128::MAX) <= Duration::from_micros(BACKOFF_CAP_MICROS));
        }
    }
}
