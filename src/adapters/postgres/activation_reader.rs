//! PostgreSQL implementation of ActivationReader.

use std::collections::HashSet;

use crate::domain::foundation::{
    ActivationId, DomainError, ErrorCode, Page, PageRequest, PromoId, Timestamp, UserId,
};
use crate::domain::promo::Activation;
use crate::ports::ActivationReader;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Read-side queries over the `activations` table.
pub struct PostgresActivationReader {
    pool: PgPool,
}

impl PostgresActivationReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ActivationRow {
    id: Uuid,
    promo_id: Uuid,
    user_id: Uuid,
    country: String,
    activated_at: DateTime<Utc>,
}

impl From<ActivationRow> for Activation {
    fn from(row: ActivationRow) -> Self {
        Activation {
            id: ActivationId::from_uuid(row.id),
            promo_id: PromoId::from_uuid(row.promo_id),
            user_id: UserId::from_uuid(row.user_id),
            country: row.country,
            activated_at: Timestamp::from_datetime(row.activated_at),
        }
    }
}

#[async_trait]
impl ActivationReader for PostgresActivationReader {
    async fn activated_among(
        &self,
        user_id: &UserId,
        promo_ids: &[PromoId],
    ) -> Result<HashSet<PromoId>, DomainError> {
        if promo_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = promo_ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"
            SELECT DISTINCT promo_id FROM activations
            WHERE user_id = $1 AND promo_id = ANY($2)
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch activated promos: {}", e),
            )
        })?;

        Ok(rows.into_iter().map(|(id,)| PromoId::from_uuid(id)).collect())
    }

    async fn history(
        &self,
        user_id: &UserId,
        page: PageRequest,
    ) -> Result<Page<Activation>, DomainError> {
        let (total,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM activations WHERE user_id = $1"#)
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to count activations: {}", e),
                    )
                })?;

        let rows: Vec<ActivationRow> = sqlx::query_as(
            r#"
            SELECT id, promo_id, user_id, country, activated_at
            FROM activations
            WHERE user_id = $1
            ORDER BY activated_at DESC, seq DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch activation history: {}", e),
            )
        })?;

        Ok(Page::new(
            rows.into_iter().map(Activation::from).collect(),
            total.max(0) as u64,
        ))
    }

    async fn country_counts(&self, promo_id: &PromoId) -> Result<Vec<(String, u64)>, DomainError> {
        let rows: Vec<(String, i64)> = sqlx::query_as(
            r#"
            SELECT lower(country), COUNT(*)
            FROM activations
            WHERE promo_id = $1
            GROUP BY lower(country)
            "#,
        )
        .bind(promo_id.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to count activations by country: {}", e),
            )
        })?;

        Ok(rows
            .into_iter()
            .map(|(country, count)| (country, count.max(0) as u64))
            .collect())
    }
}
