//! Cache-aside record contracts.
//!
//! A [`CacheRecord`] knows how to flatten itself into the field map the
//! ancillary store holds. A [`RecordSource`] is the durable side that can
//! always answer authoritatively; a [`RecordStore`] can also be written.

use std::collections::HashMap;
use std::fmt::Display;

use crate::domain::foundation::{DomainError, ValidationError};
use async_trait::async_trait;

/// Field map as stored in the ancillary store.
pub type RecordFields = HashMap<String, String>;

/// A record that can be projected into, and rebuilt from, the ancillary store.
pub trait CacheRecord: Clone + Send + Sync + 'static {
    type Id: Display + Clone + Send + Sync + 'static;

    /// Key prefix for this record type.
    const NAMESPACE: &'static str;

    fn record_id(&self) -> Self::Id;

    fn to_fields(&self) -> RecordFields;

    fn from_fields(fields: &RecordFields) -> Result<Self, ValidationError>;
}

/// Ancillary key for a record: `{namespace}:{id}`.
pub fn record_key<R: CacheRecord>(id: &R::Id) -> String {
    format!("{}:{}", R::NAMESPACE, id)
}

/// Authoritative read side for a record type.
#[async_trait]
pub trait RecordSource<R: CacheRecord>: Send + Sync {
    /// Load from the durable store. `None` means the record does not exist.
    async fn load(&self, id: &R::Id) -> Result<Option<R>, DomainError>;
}

/// Authoritative write side for a record type.
#[async_trait]
pub trait RecordStore<R: CacheRecord>: RecordSource<R> {
    /// Insert or replace the durable record.
    async fn save(&self, record: &R) -> Result<(), DomainError>;
}
