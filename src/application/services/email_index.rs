//! Email → id index kept in the ancillary store.
//!
//! Lets email lookups skip the durable store. Entries are disposable: a miss
//! or an unreadable value simply means "ask the durable store".

use std::fmt::Display;
use std::marker::PhantomData;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::foundation::{CompanyId, Email, UserId};
use crate::ports::AncillaryStore;

pub struct EmailIndex<I> {
    ancillary: Arc<dyn AncillaryStore>,
    namespace: &'static str,
    ttl: Duration,
    _id: PhantomData<fn() -> I>,
}

impl EmailIndex<CompanyId> {
    pub fn companies(ancillary: Arc<dyn AncillaryStore>, ttl: Duration) -> Self {
        Self::new(ancillary, "company_email", ttl)
    }
}

impl EmailIndex<UserId> {
    pub fn users(ancillary: Arc<dyn AncillaryStore>, ttl: Duration) -> Self {
        Self::new(ancillary, "user_email", ttl)
    }
}

impl<I> EmailIndex<I>
where
    I: FromStr + Display,
{
    fn new(ancillary: Arc<dyn AncillaryStore>, namespace: &'static str, ttl: Duration) -> Self {
        Self {
            ancillary,
            namespace,
            ttl,
            _id: PhantomData,
        }
    }

    fn key(&self, email: &Email) -> String {
        format!("{}:{}", self.namespace, email)
    }

    pub async fn lookup(&self, email: &Email) -> Option<I> {
        let key = self.key(email);
        match self.ancillary.get_value(&key).await {
            Ok(Some(raw)) => match raw.parse() {
                Ok(id) => Some(id),
                Err(_) => {
                    tracing::warn!(key = %key, "Ignoring unreadable email index entry");
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!(key = %key, "Email index read failed: {}", e);
                None
            }
        }
    }

    pub async fn remember(&self, email: &Email, id: &I) {
        let key = self.key(email);
        if let Err(e) = self
            .ancillary
            .put_value(&key, &id.to_string(), self.ttl)
            .await
        {
            tracing::warn!(key = %key, "Email index write failed: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryAncillaryStore;

    #[tokio::test]
    async fn remembers_and_looks_up() {
        let store = Arc::new(InMemoryAncillaryStore::new());
        let index = EmailIndex::companies(store, Duration::from_secs(60));
        let email = Email::parse("a@b.io").unwrap();
        let id = CompanyId::new();

        assert_eq!(index.lookup(&email).await, None);
        index.remember(&email, &id).await;
        assert_eq!(index.lookup(&email).await, Some(id));
    }

    #[tokio::test]
    async fn unreadable_entry_is_a_miss() {
        let store = Arc::new(InMemoryAncillaryStore::new());
        store
            .put_value("user_email:a@b.io", "garbage", Duration::from_secs(60))
            .await
            .unwrap();
        let index = EmailIndex::users(store, Duration::from_secs(60));
        assert_eq!(index.lookup(&Email::parse("a@b.io").unwrap()).await, None);
    }
}
