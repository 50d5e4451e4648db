//! Comment repository port.

use crate::domain::comment::Comment;
use crate::domain::foundation::{CommentId, DomainError, Page, PageRequest, PromoId};
use async_trait::async_trait;

/// Comment persistence. Implementations keep the promo's `comment_count` in
/// step with inserts and deletes.
#[async_trait]
pub trait CommentRepository: Send + Sync {
    async fn insert(&self, comment: &Comment) -> Result<(), DomainError>;

    /// Find a comment of a given promo. A comment on another promo is `None`.
    async fn find(
        &self,
        promo_id: &PromoId,
        comment_id: &CommentId,
    ) -> Result<Option<Comment>, DomainError>;

    /// Comments on a promo, newest first.
    async fn list(&self, promo_id: &PromoId, page: PageRequest)
        -> Result<Page<Comment>, DomainError>;

    /// Persist an edited comment.
    ///
    /// # Errors
    ///
    /// - `CommentNotFound` if the comment doesn't exist
    async fn update(&self, comment: &Comment) -> Result<(), DomainError>;

    /// Delete a comment. Returns `false` if it did not exist on that promo.
    async fn delete(&self, promo_id: &PromoId, comment_id: &CommentId)
        -> Result<bool, DomainError>;
}
