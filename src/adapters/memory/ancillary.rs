//! In-Memory Ancillary Store Adapter
//!
//! TTL-aware stand-in for Redis. Expired entries are dropped on read.
//! Useful for testing and development.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{AncillaryStore, RecordFields};

#[derive(Debug, Clone)]
enum Slot {
    Record(RecordFields),
    Value(String),
}

#[derive(Debug, Clone)]
struct Entry {
    slot: Slot,
    expires_at: Timestamp,
}

impl Entry {
    fn is_live(&self) -> bool {
        Timestamp::now().is_before(&self.expires_at)
    }
}

fn expiry_after(ttl: Duration) -> Timestamp {
    let secs = ttl.as_secs().min(i32::MAX as u64) as i64;
    Timestamp::now().plus_secs(secs.max(1))
}

fn wrong_type(key: &str) -> DomainError {
    DomainError::new(
        ErrorCode::CacheError,
        format!("Key holds the wrong kind of value: {}", key),
    )
}

/// In-memory ancillary store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAncillaryStore {
    entries: Arc<RwLock<HashMap<String, Entry>>>,
}

impl InMemoryAncillaryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear all stored data (useful for tests)
    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    /// True if a live entry exists under `key`.
    pub async fn contains_key(&self, key: &str) -> bool {
        self.entries
            .read()
            .await
            .get(key)
            .map_or(false, Entry::is_live)
    }

    /// Number of live entries.
    pub async fn len(&self) -> usize {
        self.entries
            .read()
            .await
            .values()
            .filter(|e| e.is_live())
            .count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    async fn live(&self, key: &str) -> Option<Slot> {
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if entry.is_live() => Some(entry.slot.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    async fn store(&self, key: &str, slot: Slot, expires_at: Timestamp) {
        let mut entries = self.entries.write().await;
        if Timestamp::now().is_before(&expires_at) {
            entries.insert(key.to_string(), Entry { slot, expires_at });
        } else {
            entries.remove(key);
        }
    }
}

#[async_trait]
impl AncillaryStore for InMemoryAncillaryStore {
    async fn get_record(&self, key: &str) -> Result<Option<RecordFields>, DomainError> {
        match self.live(key).await {
            Some(Slot::Record(fields)) => Ok(Some(fields)),
            Some(Slot::Value(_)) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn put_record(
        &self,
        key: &str,
        fields: &RecordFields,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        self.store(key, Slot::Record(fields.clone()), expiry_after(ttl))
            .await;
        Ok(())
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>, DomainError> {
        match self.live(key).await {
            Some(Slot::Value(value)) => Ok(Some(value)),
            Some(Slot::Record(_)) => Err(wrong_type(key)),
            None => Ok(None),
        }
    }

    async fn put_value(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        self.store(key, Slot::Value(value.to_string()), expiry_after(ttl))
            .await;
        Ok(())
    }

    async fn put_value_until(
        &self,
        key: &str,
        value: &str,
        expires_at: Timestamp,
    ) -> Result<(), DomainError> {
        self.store(key, Slot::Value(value.to_string()), expires_at)
            .await;
        Ok(())
    }
}
