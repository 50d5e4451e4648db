//! Likes and comments for the in-memory durable store.

use std::collections::HashSet;

use async_trait::async_trait;

use crate::domain::comment::Comment;
use crate::domain::foundation::{
    CommentId, DomainError, ErrorCode, Page, PageRequest, PromoId, UserId,
};
use crate::ports::{CommentRepository, LikeRepository};

use super::database::promo_not_found;
use super::InMemoryDatabase;

#[async_trait]
impl LikeRepository for InMemoryDatabase {
    async fn like(&self, user_id: &UserId, promo_id: &PromoId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        if !state.promos.contains_key(promo_id) {
            return Err(promo_not_found(promo_id));
        }
        if !state.likes.insert((*user_id, *promo_id)) {
            return Ok(false);
        }
        if let Some(promo) = state.promos.get_mut(promo_id) {
            promo.like_count += 1;
        }
        Ok(true)
    }

    async fn unlike(&self, user_id: &UserId, promo_id: &PromoId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        if !state.promos.contains_key(promo_id) {
            return Err(promo_not_found(promo_id));
        }
        if !state.likes.remove(&(*user_id, *promo_id)) {
            return Ok(false);
        }
        if let Some(promo) = state.promos.get_mut(promo_id) {
            promo.like_count = promo.like_count.saturating_sub(1);
        }
        Ok(true)
    }

    async fn liked_among(
        &self,
        user_id: &UserId,
        promo_ids: &[PromoId],
    ) -> Result<HashSet<PromoId>, DomainError> {
        let state = self.state.read().await;
        Ok(promo_ids
            .iter()
            .filter(|id| state.likes.contains(&(*user_id, **id)))
            .copied()
            .collect())
    }
}

#[async_trait]
impl CommentRepository for InMemoryDatabase {
    async fn insert(&self, comment: &Comment) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let promo = state
            .promos
            .get_mut(&comment.promo_id)
            .ok_or_else(|| promo_not_found(&comment.promo_id))?;
        promo.comment_count += 1;
        state.comments.push(comment.clone());
        Ok(())
    }

    async fn find(
        &self,
        promo_id: &PromoId,
        comment_id: &CommentId,
    ) -> Result<Option<Comment>, DomainError> {
        Ok(self
            .state
            .read()
            .await
            .comments
            .iter()
            .find(|c| &c.id == comment_id && &c.promo_id == promo_id)
            .cloned())
    }

    async fn list(
        &self,
        promo_id: &PromoId,
        page: PageRequest,
    ) -> Result<Page<Comment>, DomainError> {
        let state = self.state.read().await;
        let comments: Vec<Comment> = state
            .comments
            .iter()
            .rev()
            .filter(|c| &c.promo_id == promo_id)
            .cloned()
            .collect();
        Ok(Page::slice(comments, page))
    }

    async fn update(&self, comment: &Comment) -> Result<(), DomainError> {
        let mut state = self.state.write().await;
        let stored = state
            .comments
            .iter_mut()
            .find(|c| c.id == comment.id)
            .ok_or_else(|| {
                DomainError::new(
                    ErrorCode::CommentNotFound,
                    format!("Comment not found: {}", comment.id),
                )
            })?;
        stored.text = comment.text.clone();
        Ok(())
    }

    async fn delete(&self, promo_id: &PromoId, comment_id: &CommentId) -> Result<bool, DomainError> {
        let mut state = self.state.write().await;
        let before = state.comments.len();
        state
            .comments
            .retain(|c| !(&c.id == comment_id && &c.promo_id == promo_id));
        if state.comments.len() == before {
            return Ok(false);
        }
        if let Some(promo) = state.promos.get_mut(promo_id) {
            promo.comment_count = promo.comment_count.saturating_sub(1);
        }
        Ok(true)
    }
}
