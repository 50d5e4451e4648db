//! PostgreSQL implementations of LikeRepository and CommentRepository.
//!
//! Each write that changes the set of likes or comments adjusts the promo's
//! counter inside the same transaction.

use std::collections::HashSet;

use crate::domain::comment::{Author, Comment};
use crate::domain::foundation::{
    CommentId, DomainError, ErrorCode, Page, PageRequest, PromoId, Timestamp, UserId,
};
use crate::ports::{CommentRepository, LikeRepository};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

fn promo_not_found(id: &PromoId) -> DomainError {
    DomainError::new(ErrorCode::PromoNotFound, format!("Promo not found: {}", id))
}

async fn begin(pool: &PgPool) -> Result<Transaction<'_, Postgres>, DomainError> {
    pool.begin().await.map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to begin transaction: {}", e),
        )
    })
}

async fn commit(tx: Transaction<'_, Postgres>) -> Result<(), DomainError> {
    tx.commit().await.map_err(|e| {
        DomainError::new(
            ErrorCode::DatabaseError,
            format!("Failed to commit transaction: {}", e),
        )
    })
}

/// Locks the promo row for the rest of the transaction.
async fn lock_promo(
    tx: &mut Transaction<'_, Postgres>,
    promo_id: &PromoId,
) -> Result<(), DomainError> {
    let found: Option<(Uuid,)> = sqlx::query_as(r#"SELECT id FROM promos WHERE id = $1 FOR UPDATE"#)
        .bind(promo_id.as_uuid())
        .fetch_optional(&mut **tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to lock promo: {}", e),
            )
        })?;

    found.map(|_| ()).ok_or_else(|| promo_not_found(promo_id))
}

// ════════════════════════════════════════════════════════════════════════════
// Likes
// ════════════════════════════════════════════════════════════════════════════

pub struct PostgresLikeRepository {
    pool: PgPool,
}

impl PostgresLikeRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeRepository for PostgresLikeRepository {
    async fn like(&self, user_id: &UserId, promo_id: &PromoId) -> Result<bool, DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_promo(&mut tx, promo_id).await?;

        let result = sqlx::query(
            r#"
            INSERT INTO promo_likes (user_id, promo_id)
            VALUES ($1, $2)
            ON CONFLICT (user_id, promo_id) DO NOTHING
            "#,
        )
        .bind(user_id.as_uuid())
        .bind(promo_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert like: {}", e),
            )
        })?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(r#"UPDATE promos SET like_count = like_count + 1 WHERE id = $1"#)
            .bind(promo_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to bump like count: {}", e),
                )
            })?;

        commit(tx).await?;
        Ok(true)
    }

    async fn unlike(&self, user_id: &UserId, promo_id: &PromoId) -> Result<bool, DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_promo(&mut tx, promo_id).await?;

        let result = sqlx::query(r#"DELETE FROM promo_likes WHERE user_id = $1 AND promo_id = $2"#)
            .bind(user_id.as_uuid())
            .bind(promo_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to delete like: {}", e),
                )
            })?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"UPDATE promos SET like_count = GREATEST(like_count - 1, 0) WHERE id = $1"#,
        )
        .bind(promo_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to drop like count: {}", e),
            )
        })?;

        commit(tx).await?;
        Ok(true)
    }

    async fn liked_among(
        &self,
        user_id: &UserId,
        promo_ids: &[PromoId],
    ) -> Result<HashSet<PromoId>, DomainError> {
        if promo_ids.is_empty() {
            return Ok(HashSet::new());
        }
        let ids: Vec<Uuid> = promo_ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<(Uuid,)> = sqlx::query_as(
            r#"SELECT promo_id FROM promo_likes WHERE user_id = $1 AND promo_id = ANY($2)"#,
        )
        .bind(user_id.as_uuid())
        .bind(&ids)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch likes: {}", e),
            )
        })?;

        Ok(rows.into_iter().map(|(id,)| PromoId::from_uuid(id)).collect())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Comments
// ════════════════════════════════════════════════════════════════════════════

pub struct PostgresCommentRepository {
    pool: PgPool,
}

impl PostgresCommentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct CommentRow {
    id: Uuid,
    promo_id: Uuid,
    author_id: Uuid,
    author_name: String,
    author_surname: String,
    author_avatar_url: Option<String>,
    text: String,
    created_at: DateTime<Utc>,
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: CommentId::from_uuid(row.id),
            promo_id: PromoId::from_uuid(row.promo_id),
            author_id: UserId::from_uuid(row.author_id),
            author: Author {
                name: row.author_name,
                surname: row.author_surname,
                avatar_url: row.author_avatar_url,
            },
            text: row.text,
            created_at: Timestamp::from_datetime(row.created_at),
        }
    }
}

#[async_trait]
impl CommentRepository for PostgresCommentRepository {
    async fn insert(&self, comment: &Comment) -> Result<(), DomainError> {
        let mut tx = begin(&self.pool).await?;
        lock_promo(&mut tx, &comment.promo_id).await?;

        sqlx::query(
            r#"
            INSERT INTO comments (
                id, promo_id, author_id, author_name, author_surname,
                author_avatar_url, text, created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(comment.id.as_uuid())
        .bind(comment.promo_id.as_uuid())
        .bind(comment.author_id.as_uuid())
        .bind(&comment.author.name)
        .bind(&comment.author.surname)
        .bind(&comment.author.avatar_url)
        .bind(&comment.text)
        .bind(comment.created_at.as_datetime())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to insert comment: {}", e),
            )
        })?;

        sqlx::query(r#"UPDATE promos SET comment_count = comment_count + 1 WHERE id = $1"#)
            .bind(comment.promo_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to bump comment count: {}", e),
                )
            })?;

        commit(tx).await
    }

    async fn find(
        &self,
        promo_id: &PromoId,
        comment_id: &CommentId,
    ) -> Result<Option<Comment>, DomainError> {
        let row: Option<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, promo_id, author_id, author_name, author_surname,
                   author_avatar_url, text, created_at
            FROM comments
            WHERE id = $1 AND promo_id = $2
            "#,
        )
        .bind(comment_id.as_uuid())
        .bind(promo_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to fetch comment: {}", e),
            )
        })?;

        Ok(row.map(Comment::from))
    }

    async fn list(
        &self,
        promo_id: &PromoId,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        let (total,): (i64,) =
            sqlx::query_as(r#"SELECT COUNT(*) FROM comments WHERE promo_id = $1"#)
                .bind(promo_id.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::new(
                        ErrorCode::DatabaseError,
                        format!("Failed to count comments: {}", e),
                    )
                })?;

        let rows: Vec<CommentRow> = sqlx::query_as(
            r#"
            SELECT id, promo_id, author_id, author_name, author_surname,
                   author_avatar_url, text, created_at
            FROM comments
            WHERE promo_id = $1
            ORDER BY created_at DESC, seq DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(promo_id.as_uuid())
        .bind(i64::from(page.limit))
        .bind(i64::from(page.offset))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to list comments: {}", e),
            )
        })?;

        Ok(Page::new(
            rows.into_iter().map(Comment::from).collect(),
            total.max(0) as u64,
        ))
    }

    async fn update(&self, comment: &Comment) -> Result<(), DomainError> {
        let result = sqlx::query(r#"UPDATE comments SET text = $3 WHERE id = $1 AND promo_id = $2"#)
            .bind(comment.id.as_uuid())
            .bind(comment.promo_id.as_uuid())
            .bind(&comment.text)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to update comment: {}", e),
                )
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::new(
                ErrorCode::CommentNotFound,
                format!("Comment not found: {}", comment.id),
            ));
        }
        Ok(())
    }

    async fn delete(&self, promo_id: &PromoId, comment_id: &CommentId) -> Result<bool, DomainError> {
        let mut tx = begin(&self.pool).await?;

        let result = sqlx::query(r#"DELETE FROM comments WHERE id = $1 AND promo_id = $2"#)
            .bind(comment_id.as_uuid())
            .bind(promo_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::new(
                    ErrorCode::DatabaseError,
                    format!("Failed to delete comment: {}", e),
                )
            })?;

        if result.rows_affected() == 0 {
            return Ok(false);
        }

        sqlx::query(
            r#"UPDATE promos SET comment_count = GREATEST(comment_count - 1, 0) WHERE id = $1"#,
        )
        .bind(promo_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            DomainError::new(
                ErrorCode::DatabaseError,
                format!("Failed to drop comment count: {}", e),
            )
        })?;

        commit(tx).await?;
        Ok(true)
    }
}
