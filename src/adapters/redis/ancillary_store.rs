//! Redis-backed ancillary store for multi-server deployments.
//!
//! Records are hashes (`HSET` + `EXPIRE` in one atomic pipeline); plain
//! values are strings with `EX` or `EXAT` expiry. Every failure maps to
//! `CacheError` so callers can degrade to the durable store.

use std::time::Duration;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::domain::foundation::{DomainError, ErrorCode, Timestamp};
use crate::ports::{AncillaryStore, RecordFields};

/// Redis implementation of the AncillaryStore port.
#[derive(Clone)]
pub struct RedisAncillaryStore {
    conn: MultiplexedConnection,
}

impl RedisAncillaryStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self { conn }
    }

    /// Open a multiplexed connection to `url`, giving up after `timeout`.
    pub async fn connect(url: &str, timeout: Duration) -> Result<Self, DomainError> {
        let client = redis::Client::open(url).map_err(cache_error)?;
        let conn = tokio::time::timeout(timeout, client.get_multiplexed_tokio_connection())
            .await
            .map_err(|_| {
                DomainError::new(
                    ErrorCode::CacheError,
                    format!("Redis connection timed out after {:?}", timeout),
                )
            })?
            .map_err(cache_error)?;
        tracing::info!("Connected to ancillary store");
        Ok(Self::new(conn))
    }
}

fn cache_error(e: redis::RedisError) -> DomainError {
    DomainError::new(ErrorCode::CacheError, format!("Redis error: {}", e))
}

/// Whole seconds for `EX`/`EXPIRE`; Redis rejects zero.
fn ttl_secs(ttl: Duration) -> i64 {
    i64::try_from(ttl.as_secs()).unwrap_or(i64::MAX).max(1)
}

/// `EXAT` argument, or `None` when the instant has already passed.
fn expire_at_secs(expires_at: &Timestamp, now: &Timestamp) -> Option<i64> {
    if expires_at.is_after(now) {
        Some(expires_at.as_datetime().timestamp())
    } else {
        None
    }
}

#[async_trait]
impl AncillaryStore for RedisAncillaryStore {
    async fn get_record(&self, key: &str) -> Result<Option<RecordFields>, DomainError> {
        let mut conn = self.conn.clone();
        let fields: RecordFields = conn.hgetall(key).await.map_err(cache_error)?;

        // HGETALL on a missing key is an empty map.
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(fields))
    }

    async fn put_record(
        &self,
        key: &str,
        fields: &RecordFields,
        ttl: Duration,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        let items: Vec<(&str, &str)> = fields
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();

        let mut pipe = redis::pipe();
        pipe.atomic().del(key).ignore();
        if !items.is_empty() {
            pipe.hset_multiple(key, &items)
                .ignore()
                .expire(key, ttl_secs(ttl))
                .ignore();
        }
        pipe.query_async::<_, ()>(&mut conn)
            .await
            .map_err(cache_error)?;

        Ok(())
    }

    async fn get_value(&self, key: &str) -> Result<Option<String>, DomainError> {
        let mut conn = self.conn.clone();
        conn.get(key).await.map_err(cache_error)
    }

    async fn put_value(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();
        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EX")
            .arg(ttl_secs(ttl))
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }

    async fn put_value_until(
        &self,
        key: &str,
        value: &str,
        expires_at: Timestamp,
    ) -> Result<(), DomainError> {
        let mut conn = self.conn.clone();

        let Some(at) = expire_at_secs(&expires_at, &Timestamp::now()) else {
            // Already expired: make sure no stale value lingers.
            conn.del::<_, ()>(key).await.map_err(cache_error)?;
            return Ok(());
        };

        redis::cmd("SET")
            .arg(key)
            .arg(value)
            .arg("EXAT")
            .arg(at)
            .query_async::<_, ()>(&mut conn)
            .await
            .map_err(cache_error)?;
        Ok(())
    }
}

impl std::fmt::Debug for RedisAncillaryStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisAncillaryStore").finish_non_exhaustive()
    }
}
