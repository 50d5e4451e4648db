//! Ancillary store port.
//!
//! A fast, disposable, TTL-evicted key/value store. Nothing written here is
//! authoritative; callers must tolerate misses and stale data.

use std::time::Duration;

use crate::domain::foundation::{DomainError, Timestamp};
use async_trait::async_trait;

use super::RecordFields;

/// Key/field-map store with expiry.
#[async_trait]
pub trait AncillaryStore: Send + Sync {
    /// Read a field map. `None` on miss or expiry.
    async fn get_record(&self, key: &str) -> Result<Option<RecordFields>, DomainError>;

    /// Replace a field map and reset its time-to-live.
    async fn put_record(
        &self,
        key: &str,
        fields: &RecordFields,
        ttl: Duration,
    ) -> Result<(), DomainError>;

    /// Read a plain value. `None` on miss or expiry.
    async fn get_value(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Set a plain value with a time-to-live.
    async fn put_value(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Set a plain value that expires at an absolute instant.
    async fn put_value_until(
        &self,
        key: &str,
        value: &str,
        expires_at: Timestamp,
    ) -> Result<(), DomainError>;
}
