//! Cache-aside accessor over a durable source and the ancillary store.
//!
//! Reads try the ancillary store first and repair it from the durable source
//! on a miss. Writes go to the durable store first; the ancillary copy is
//! best effort and reissued on every write, which also resets its TTL.
//!
//! Ancillary failures and undecodable entries are logged and treated as a
//! miss. Durable failures always propagate.

use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::company::Company;
use crate::domain::foundation::DomainError;
use crate::domain::promo::PromoSummary;
use crate::domain::user::User;
use crate::ports::{
    record_key, AncillaryStore, CacheRecord, CompanyRepository, RecordSource, RecordStore,
    UserRepository,
};

/// Read-through / write-through mediator for one record type.
pub struct CacheAside<R, S: ?Sized> {
    source: Arc<S>,
    ancillary: Arc<dyn AncillaryStore>,
    ttl: Duration,
    _record: PhantomData<fn() -> R>,
}

pub type CompanyCache = CacheAside<Company, dyn CompanyRepository>;
pub type UserCache = CacheAside<User, dyn UserRepository>;
pub type PromoSummaryCache = CacheAside<PromoSummary, dyn RecordSource<PromoSummary>>;

impl<R, S> CacheAside<R, S>
where
    R: CacheRecord,
    S: RecordSource<R> + ?Sized,
{
    pub fn new(source: Arc<S>, ancillary: Arc<dyn AncillaryStore>, ttl: Duration) -> Self {
        Self {
            source,
            ancillary,
            ttl,
            _record: PhantomData,
        }
    }

    /// The durable side.
    pub fn source(&self) -> &Arc<S> {
        &self.source
    }

    /// Fetch a record. `None` means the durable store has no such record.
    pub async fn get(&self, id: &R::Id) -> Result<Option<R>, DomainError> {
        let key = record_key::<R>(id);

        match self.ancillary.get_record(&key).await {
            Ok(Some(fields)) => match R::from_fields(&fields) {
                Ok(record) => return Ok(Some(record)),
                Err(e) => {
                    tracing::warn!(key = %key, "Discarding undecodable ancillary entry: {}", e)
                }
            },
            Ok(None) => {}
            Err(e) => tracing::warn!(key = %key, "Ancillary read failed: {}", e),
        }

        let record = self.source.load(id).await?;
        if let Some(record) = &record {
            tracing::debug!(key = %key, "Repairing ancillary entry from durable store");
            self.refresh(record).await;
        }
        Ok(record)
    }

    /// Reissue the ancillary copy of a record. Never fails.
    pub async fn refresh(&self, record: &R) {
        let key = record_key::<R>(&record.record_id());
        if let Err(e) = self
            .ancillary
            .put_record(&key, &record.to_fields(), self.ttl)
            .await
        {
            tracing::warn!(key = %key, "Ancillary write failed: {}", e);
        }
    }
}

impl<R, S> CacheAside<R, S>
where
    R: CacheRecord,
    S: RecordStore<R> + ?Sized,
{
    /// Durable write, then best-effort ancillary write.
    pub async fn put(&self, record: &R) -> Result<(), DomainError> {
        self.source.save(record).await?;
        self.refresh(record).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::{InMemoryAncillaryStore, InMemoryDatabase};
    use crate::domain::foundation::{Email, ErrorCode, Timestamp};
    use crate::ports::RecordFields;
    use async_trait::async_trait;

    // ════════════════════════════════════════════════════════════════════════════
    // Test Fixtures
    // ════════════════════════════════════════════════════════════════════════════

    /// Ancillary store whose every call fails.
    struct BrokenAncillary;

    #[async_trait]
    impl AncillaryStore for BrokenAncillary {
        async fn get_record(&self, _key: &str) -> Result<Option<RecordFields>, DomainError> {
            Err(DomainError::new(ErrorCode::CacheError, "connection refused"))
        }

        async fn put_record(
            &self,
            _key: &str,
            _fields: &RecordFields,
            _ttl: Duration,
        ) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::CacheError, "connection refused"))
        }

        async fn get_value(&self, _key: &str) -> Result<Option<String>, DomainError> {
            Err(DomainError::new(ErrorCode::CacheError, "connection refused"))
        }

        async fn put_value(&self, _key: &str, _value: &str, _ttl: Duration) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::CacheError, "connection refused"))
        }

        async fn put_value_until(
            &self,
            _key: &str,
            _value: &str,
            _expires_at: Timestamp,
        ) -> Result<(), DomainError> {
            Err(DomainError::new(ErrorCode::CacheError, "connection refused"))
        }
    }

    fn company() -> Company {
        Company::register("Acme Corp", Email::parse("promo@acme.io").unwrap(), "hash").unwrap()
    }

    fn cache(db: &InMemoryDatabase, ancillary: Arc<dyn AncillaryStore>) -> CompanyCache {
        let source: Arc<dyn CompanyRepository> = Arc::new(db.clone());
        CacheAside::new(source, ancillary, Duration::from_secs(60))
    }

    // ════════════════════════════════════════════════════════════════════════════
    // Tests
    // ════════════════════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn put_then_get_returns_same_record() {
        let db = InMemoryDatabase::new();
        let ancillary = Arc::new(InMemoryAncillaryStore::new());
        let cache = cache(&db, ancillary.clone());
        let company = company();

        cache.put(&company).await.unwrap();

        assert_eq!(cache.get(&company.id).await.unwrap(), Some(company.clone()));
        assert!(ancillary.contains_key(&format!("company:{}", company.id)).await);
    }

    #[tokio::test]
    async fn miss_is_repaired_from_durable_store() {
        let db = InMemoryDatabase::new();
        let ancillary = Arc::new(InMemoryAncillaryStore::new());
        let cache = cache(&db, ancillary.clone());
        let company = company();
        cache.put(&company).await.unwrap();

        ancillary.clear().await;

        assert_eq!(cache.get(&company.id).await.unwrap(), Some(company.clone()));
        assert!(ancillary.contains_key(&format!("company:{}", company.id)).await);
    }

    #[tokio::test]
    async fn durable_miss_is_none() {
        let db = InMemoryDatabase::new();
        let cache = cache(&db, Arc::new(InMemoryAncillaryStore::new()));
        assert_eq!(cache.get(&company().id).await.unwrap(), None);
    }

    #[tokio::test]
    async fn broken_ancillary_store_does_not_fail_reads_or_writes() {
        let db = InMemoryDatabase::new();
        let cache = cache(&db, Arc::new(BrokenAncillary));
        let company = company();

        cache.put(&company).await.unwrap();
        assert_eq!(cache.get(&company.id).await.unwrap(), Some(company));
    }

    #[tokio::test]
    async fn undecodable_entry_falls_back_to_durable_store() {
        let db = InMemoryDatabase::new();
        let ancillary = Arc::new(InMemoryAncillaryStore::new());
        let cache = cache(&db, ancillary.clone());
        let company = company();
        cache.put(&company).await.unwrap();

        let mut garbage = RecordFields::new();
        garbage.insert("id".to_string(), "not-a-uuid".to_string());
        ancillary
            .put_record(
                &format!("company:{}", company.id),
                &garbage,
                Duration::from_secs(60),
            )
            .await
            .unwrap();

        assert_eq!(cache.get(&company.id).await.unwrap(), Some(company));
    }
}
