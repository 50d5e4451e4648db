//! PostgreSQL implementation of PromoRepository.
//!
//! Capacity lives in plain columns (`mode`, `promo_common`, `max_count`,
//! `used_count`, `codes`, `used_codes`); targeting is a JSONB document so the
//! feed filter can be pushed into SQL.

use crate::domain::foundation::{
    CompanyId, DomainError, ErrorCode, Page, PromoId, Timestamp,
};
use crate::domain::promo::{ActiveWindow, Capacity, Promo, PromoMode, Target};
use crate::ports::{
    CommitOutcome, CompanyPromoQuery, FeedFilter, PromoRepository, PromoSort, RedemptionCommit,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use uuid::Uuid;

const PROMO_COLUMNS: &str = "id, company_id, company_name, description, image_url, target, \
     mode, promo_common, max_count, used_count, codes, used_codes, \
     active_from, active_until, active, like_count, comment_count, capacity_version, created_at";

/// PostgreSQL implementation of the PromoRepository port.
pub struct PostgresPromoRepository {
    pool: PgPool,
}

impl PostgresPromoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Tells a lost compare-and-swap apart from a missing row.
    async fn resolve_miss(&self, id: &PromoId) -> Result<CommitOutcome, DomainError> {
        let exists: Option<(i64,)> =
            sqlx::query_as(r#"SELECT capacity_version FROM promos WHERE id = $1"#)
                .bind(id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to check promo: {}", e),
                    )
                })?;

        match exists {
            Some(_) => Ok(CommitOutcome::Conflict),
            None => Err(DomainError::new(
                ErrorCode::PromoNotFound,
                format!("Promo not found: {}", id),
            )),
        }
    }
}

/// Database row representation of a promo.
#[derive(Debug, sqlx::FromRow)]
struct PromoRow {
    id: Uuid,
    company_id: Uuid,
    company_name: String,
    description: String,
    image_url: Option<String>,
    target: Json<Target>,
    mode: String,
    promo_common: Option<String>,
    max_count: i32,
    used_count: i32,
    codes: Vec<String>,
    used_codes: Vec<String>,
    active_from: Option<DateTime<Utc>>,
    active_until: Option<DateTime<Utc>>,
    active: bool,
    like_count: i64,
    comment_count: i64,
    capacity_version: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<PromoRow> for Promo {
    type Error = DomainError;

    fn try_from(row: PromoRow) -> Result<Self, Self::Error> {
        let capacity = match parse_mode(&row.mode)? {
            PromoMode::Common => Capacity::Common {
                code: row.promo_common.ok_or_else(|| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Promo {} has COMMON mode without a code", row.id),
                    )
                })?,
                max_count: to_u32("max_count", row.max_count)?,
                used_count: to_u32("used_count", row.used_count)?,
            },
            PromoMode::Unique => Capacity::Unique {
                codes: row.codes,
                used_codes: row.used_codes,
            },
        };

        Ok(Promo {
            id: PromoId::from_uuid(row.id),
            company_id: CompanyId::from_uuid(row.company_id),
            company_name: row.company_name,
            description: row.description,
            image_url: row.image_url,
            target: row.target.0,
            capacity,
            window: ActiveWindow {
                active_from: row.active_from.map(Timestamp::from_datetime),
                active_until: row.active_until.map(Timestamp::from_datetime),
            },
            active: row.active,
            like_count: u64::try_from(row.like_count).unwrap_or(0),
            comment_count: u64::try_from(row.comment_count).unwrap_or(0),
            capacity_version: row.capacity_version,
            created_at: Timestamp::from_datetime(row.created_at),
        })
    }
}

fn parse_mode(s: &str) -> Result<PromoMode, DomainError> {
    match s.to_uppercase().as_str() {
        "COMMON" => Ok(PromoMode::Common),
        "UNIQUE" => Ok(PromoMode::Unique),
        _ => Err(DomainError::new(
            ErrorCode::DatabaseError,
            format!("Invalid promo mode: {}", s),
        )),
    }
}

fn to_u32(column: &str, value: i32) -> Result<u32, DomainError> {
    u32::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Negative {} in promos: {}", column, value),
        )
    })
}

fn to_i32(column: &str, value: usize) -> Result<i32, DomainError> {
    i32::try_from(value).map_err(|_| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("{} does not fit a database integer: {}", column, value),
        )
    })
}

/// Column values for one capacity model.
#[derive(Debug, PartialEq, Eq)]
struct CapacityColumns {
    mode: &'static str,
    promo_common: Option<String>,
    max_count: i32,
    used_count: i32,
    codes: Vec<String>,
    used_codes: Vec<String>,
}

impl CapacityColumns {
    fn from_capacity(capacity: &Capacity) -> Result<Self, DomainError> {
        let (promo_common, codes, used_codes) = match capacity {
            Capacity::Common { code, .. } => (Some(code.clone()), Vec::new(), Vec::new()),
            Capacity::Unique { codes, used_codes } => (None, codes.clone(), used_codes.clone()),
        };
        Ok(Self {
            mode: capacity.mode().as_str(),
            promo_common,
            max_count: to_i32("max_count", capacity.limit())?,
            used_count: to_i32("used_count", capacity.used())?,
            codes,
            used_codes,
        })
    }
}

fn order_clause(sort: Option<PromoSort>) -> &'static str {
    match sort {
        None => "created_at DESC, seq DESC",
        Some(PromoSort::ActiveFrom) => "active_from DESC NULLS LAST, created_at DESC, seq DESC",
        Some(PromoSort::ActiveUntil) => "active_until DESC NULLS LAST, created_at DESC, seq DESC",
    }
}

const COMPANY_FILTER: &str = "company_id = $1 \
     AND (cardinality($2::text[]) = 0 \
          OR target->>'country' IS NULL \
          OR lower(target->>'country') = ANY($2::text[]))";

#[async_trait]
impl PromoRepository for PostgresPromoRepository {
    async fn insert(&self, promo: &Promo) -> Result<(), DomainError> {
        let capacity = CapacityColumns::from_capacity(&promo.capacity)?;

        sqlx::query(
            r#"
            INSERT INTO promos (
                id, company_id, company_name, description, image_url, target,
                mode, promo_common, max_count, used_count, codes, used_codes,
                active_from, active_until, active, like_count, comment_count,
                capacity_version, created_at
            ) VALUES (
                $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12,
                $13, $14, $15, $16, $17, $18, $19
            )
            "#,
        )
        .bind(promo.id.as_uuid())
        .bind(promo.company_id.as_uuid())
        .bind(&promo.company_name)
        .bind(&promo.description)
        .bind(&promo.image_url)
        .bind(Json(&promo.target))
        .bind(capacity.mode)
        .bind(&capacity.promo_common)
        .bind(capacity.max_count)
        .bind(capacity.used_count)
        .bind(&capacity.codes)
        .bind(&capacity.used_codes)
        .bind(promo.window.active_from.map(|t| *t.as_datetime()))
        .bind(promo.window.active_until.map(|t| *t.as_datetime()))
        .bind(promo.active)
        .bind(promo.like_count as i64)
        .bind(promo.comment_count as i64)
        .bind(promo.capacity_version)
        .bind(promo.created_at.as_datetime())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert promo: {}", e),
            )
        })?;

        Ok(())
    }

    async fn find_by_id(&self, id: &PromoId) -> Result<Option<Promo>, DomainError> {
        let sql = format!("SELECT {} FROM promos WHERE id = $1", PROMO_COLUMNS);
        let row: Option<PromoRow> = sqlx::query_as(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to fetch promo: {}", e),
                )
            })?;

        row.map(Promo::try_from).transpose()
    }

    async fn update(
        &self,
        promo: &Promo,
        expected_version: i64,
    ) -> Result<CommitOutcome, DomainError> {
        let capacity = CapacityColumns::from_capacity(&promo.capacity)?;

        let result = sqlx::query(
            r#"
            UPDATE promos SET
                description = $3,
                image_url = $4,
                target = $5,
                mode = $6,
                promo_common = $7,
                max_count = $8,
                used_count = $9,
                codes = $10,
                used_codes = $11,
                active_from = $12,
                active_until = $13,
                active = $14,
                capacity_version = capacity_version + 1
            WHERE id = $1 AND capacity_version = $2
            "#,
        )
        .bind(promo.id.as_uuid())
        .bind(expected_version)
        .bind(&promo.description)
        .bind(&promo.image_url)
        .bind(Json(&promo.target))
        .bind(capacity.mode)
        .bind(&capacity.promo_common)
        .bind(capacity.max_count)
        .bind(capacity.used_count)
        .bind(&capacity.codes)
        .bind(&capacity.used_codes)
        .bind(promo.window.active_from.map(|t| *t.as_datetime()))
        .bind(promo.window.active_until.map(|t| *t.as_datetime()))
        .bind(promo.active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to update promo: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return self.resolve_miss(&promo.id).await;
        }
        Ok(CommitOutcome::Committed)
    }

    async fn set_active(
        &self,
        id: &PromoId,
        expected_version: i64,
        active: bool,
    ) -> Result<CommitOutcome, DomainError> {
        let result = sqlx::query(
            r#"UPDATE promos SET active = $3 WHERE id = $1 AND capacity_version = $2"#,
        )
        .bind(id.as_uuid())
        .bind(expected_version)
        .bind(active)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to correct promo flag: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return self.resolve_miss(id).await;
        }
        Ok(CommitOutcome::Committed)
    }

    async fn commit_redemption(
        &self,
        commit: &RedemptionCommit,
    ) -> Result<CommitOutcome, DomainError> {
        let capacity = CapacityColumns::from_capacity(&commit.capacity)?;

        let mut tx = self.pool.begin().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to begin transaction: {}", e),
            )
        })?;

        let result = sqlx::query(
            r#"
            UPDATE promos SET
                used_count = $3,
                used_codes = $4,
                active = $5,
                capacity_version = capacity_version + 1
            WHERE id = $1 AND capacity_version = $2
            "#,
        )
        .bind(commit.promo_id.as_uuid())
        .bind(commit.expected_version)
        .bind(capacity.used_count)
        .bind(&capacity.used_codes)
        .bind(commit.active)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit capacity: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            drop(tx);
            return self.resolve_miss(&commit.promo_id).await;
        }

        let activation = &commit.activation;
        sqlx::query(
            r#"
            INSERT INTO activations (id, promo_id, user_id, country, activated_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(activation.id.as_uuid())
        .bind(activation.promo_id.as_uuid())
        .bind(activation.user_id.as_uuid())
        .bind(&activation.country)
        .bind(activation.activated_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to record activation: {}", e),
            )
        })?;

        tx.commit().await.map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to commit redemption: {}", e),
            )
        })?;

        Ok(CommitOutcome::Committed)
    }

    async fn list_by_company(
        &self,
        company_id: &CompanyId,
        query: &CompanyPromoQuery,
    ) -> Result<Page<Promo>, DomainError> {
        let countries: Vec<String> = query.countries.iter().map(|c| c.to_lowercase()).collect();

        let count_sql = format!("SELECT COUNT(*) FROM promos WHERE {}", COMPANY_FILTER);
        let (total,): (i64,) = sqlx::query_as(&count_sql)
            .bind(company_id.as_uuid())
            .bind(&countries)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to count company promos: {}", e),
                )
            })?;

        let sql = format!(
            "SELECT {} FROM promos WHERE {} ORDER BY {} LIMIT $3 OFFSET $4",
            PROMO_COLUMNS,
            COMPANY_FILTER,
            order_clause(query.sort_by)
        );
        let rows: Vec<PromoRow> = sqlx::query_as(&sql)
            .bind(company_id.as_uuid())
            .bind(&countries)
            .bind(i64::from(query.page.limit))
            .bind(i64::from(query.page.offset))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to list company promos: {}", e),
                )
            })?;

        let items = rows
            .into_iter()
            .map(Promo::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Page::new(items, total.max(0) as u64))
    }

    async fn find_feed_candidates(&self, filter: &FeedFilter) -> Result<Vec<Promo>, DomainError> {
        let sql = format!(
            r#"
            SELECT {} FROM promos
            WHERE (target->>'country' IS NULL OR lower(target->>'country') = lower($1))
              AND (target->>'age_from' IS NULL OR (target->>'age_from')::int <= $2)
              AND (target->>'age_until' IS NULL OR (target->>'age_until')::int >= $2)
              AND ($3::text IS NULL OR EXISTS (
                    SELECT 1
                    FROM jsonb_array_elements_text(COALESCE(target->'categories', '[]'::jsonb)) AS c(name)
                    WHERE lower(c.name) = lower($3)
              ))
            ORDER BY created_at DESC, seq DESC
            "#,
            PROMO_COLUMNS
        );

        let rows: Vec<PromoRow> = sqlx::query_as(&sql)
            .bind(&filter.audience.country)
            .bind(i32::from(filter.audience.age))
            .bind(&filter.category)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to load feed: {}", e),
                )
            })?;

        rows.into_iter().map(Promo::try_from).collect()
    }
}
