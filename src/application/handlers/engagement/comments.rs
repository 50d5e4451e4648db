//! Comment handlers.
//!
//! A comment is addressed by `(promo_id, comment_id)`; a comment id under the
//! wrong promo is reported as not found. Only the author may edit or delete.

use std::sync::Arc;

use crate::application::handlers::lookup::{require_promo, require_user};
use crate::application::services::{PromoSummaryCache, UserCache};
use crate::domain::comment::Comment;
use crate::domain::foundation::{CommentId, Page, PageRequest, PromoId, Timestamp, UserId};
use crate::domain::promo::PromoError;
use crate::ports::CommentRepository;

async fn require_comment(
    comments: &dyn CommentRepository,
    promo_id: &PromoId,
    comment_id: &CommentId,
) -> Result<Comment, PromoError> {
    comments
        .find(promo_id, comment_id)
        .await?
        .ok_or(PromoError::CommentNotFound(*comment_id))
}

fn require_author(comment: &Comment, user_id: &UserId) -> Result<(), PromoError> {
    if comment.is_written_by(user_id) {
        Ok(())
    } else {
        Err(PromoError::NotCommentAuthor(comment.id))
    }
}

// ════════════════════════════════════════════════════════════════════════════
// CreateComment
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct CreateCommentCommand {
    pub user_id: UserId,
    pub promo_id: PromoId,
    pub text: String,
}

pub struct CreateCommentHandler {
    comments: Arc<dyn CommentRepository>,
    users: Arc<UserCache>,
    summaries: Arc<PromoSummaryCache>,
}

impl CreateCommentHandler {
    pub fn new(
        comments: Arc<dyn CommentRepository>,
        users: Arc<UserCache>,
        summaries: Arc<PromoSummaryCache>,
    ) -> Self {
        Self {
            comments,
            users,
            summaries,
        }
    }

    pub async fn handle(&self, cmd: CreateCommentCommand) -> Result<Comment, PromoError> {
        let user = require_user(&self.users, &cmd.user_id).await?;
        require_promo(&self.summaries, &cmd.promo_id).await?;

        let comment = Comment::write(
            cmd.promo_id,
            user.id,
            user.author(),
            cmd.text,
            Timestamp::now(),
        )?;
        self.comments.insert(&comment).await?;

        tracing::info!(promo_id = %comment.promo_id, comment_id = %comment.id, "Comment created");
        Ok(comment)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ListComments / GetComment
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Default)]
pub struct ListCommentsQuery {
    pub promo_id: PromoId,
    pub page: PageRequest,
}

pub struct ListCommentsHandler {
    comments: Arc<dyn CommentRepository>,
    summaries: Arc<PromoSummaryCache>,
}

impl ListCommentsHandler {
    pub fn new(comments: Arc<dyn CommentRepository>, summaries: Arc<PromoSummaryCache>) -> Self {
        Self {
            comments,
            summaries,
        }
    }

    /// Newest first.
    pub async fn handle(&self, query: ListCommentsQuery) -> Result<Page<Comment>, PromoError> {
        require_promo(&self.summaries, &query.promo_id).await?;
        Ok(self.comments.list(&query.promo_id, query.page).await?)
    }
}

#[derive(Debug, Clone)]
pub struct GetCommentQuery {
    pub promo_id: PromoId,
    pub comment_id: CommentId,
}

pub struct GetCommentHandler {
    comments: Arc<dyn CommentRepository>,
    summaries: Arc<PromoSummaryCache>,
}

impl GetCommentHandler {
    pub fn new(comments: Arc<dyn CommentRepository>, summaries: Arc<PromoSummaryCache>) -> Self {
        Self {
            comments,
            summaries,
        }
    }

    pub async fn handle(&self, query: GetCommentQuery) -> Result<Comment, PromoError> {
        require_promo(&self.summaries, &query.promo_id).await?;
        require_comment(self.comments.as_ref(), &query.promo_id, &query.comment_id).await
    }
}

// ════════════════════════════════════════════════════════════════════════════
// EditComment / DeleteComment
// ════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone)]
pub struct EditCommentCommand {
    pub user_id: UserId,
    pub promo_id: PromoId,
    pub comment_id: CommentId,
    pub text: String,
}

pub struct EditCommentHandler {
    comments: Arc<dyn CommentRepository>,
    summaries: Arc<PromoSummaryCache>,
}

impl EditCommentHandler {
    pub fn new(comments: Arc<dyn CommentRepository>, summaries: Arc<PromoSummaryCache>) -> Self {
        Self {
            comments,
            summaries,
        }
    }

    pub async fn handle(&self, cmd: EditCommentCommand) -> Result<Comment, PromoError> {
        require_promo(&self.summaries, &cmd.promo_id).await?;
        let mut comment =
            require_comment(self.comments.as_ref(), &cmd.promo_id, &cmd.comment_id).await?;
        require_author(&comment, &cmd.user_id)?;

        comment.edit(cmd.text)?;
        self.comments.update(&comment).await?;
        Ok(comment)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteCommentCommand {
    pub user_id: UserId,
    pub promo_id: PromoId,
    pub comment_id: CommentId,
}

pub struct DeleteCommentHandler {
    comments: Arc<dyn CommentRepository>,
    summaries: Arc<PromoSummaryCache>,
}

impl DeleteCommentHandler {
    pub fn new(comments: Arc<dyn CommentRepository>, summaries: Arc<PromoSummaryCache>) -> Self {
        Self {
            comments,
            summaries,
        }
    }

    pub async fn handle(&self, cmd: DeleteCommentCommand) -> Result<(), PromoError> {
        require_promo(&self.summaries, &cmd.promo_id).await?;
        let comment =
            require_comment(self.comments.as_ref(), &cmd.promo_id, &cmd.comment_id).await?;
        require_author(&comment, &cmd.user_id)?;

        // Lost a race with another delete of the same comment.
        if !self.comments.delete(&cmd.promo_id, &cmd.comment_id).await? {
            return Err(PromoError::CommentNotFound(cmd.comment_id));
        }
        tracing::info!(promo_id = %cmd.promo_id, comment_id = %cmd.comment_id, "Comment deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::handlers::test_support::Fixture;
    use crate::domain::foundation::ErrorCategory;
    use crate::domain::promo::{Capacity, Promo, Target};
    use crate::domain::user::User;

    struct Setup {
        fx: Fixture,
        author: User,
        promo: Promo,
    }

    async fn setup() -> Setup {
        let fx = Fixture::new();
        let company = fx.company("Bistro Ltd").await;
        let author = fx.user("author@example.com", 25, "US").await;
        let promo = fx
            .promo(&company, Capacity::common("ALPHA1", 5).unwrap(), Target::default())
            .await;
        Setup { fx, author, promo }
    }

    async fn write(s: &Setup, text: &str) -> Comment {
        CreateCommentHandler::new(s.fx.comments(), s.fx.users.clone(), s.fx.summaries.clone())
            .handle(CreateCommentCommand {
                user_id: s.author.id,
                promo_id: s.promo.id,
                text: text.to_string(),
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn create_snapshots_author_and_counts() {
        let s = setup().await;
        let comment = write(&s, "Great deal, used it twice").await;

        assert_eq!(comment.author.name, s.author.name);
        assert_eq!(s.fx.stored(&s.promo).await.comment_count, 1);
    }

    #[tokio::test]
    async fn list_is_newest_first_with_total() {
        let s = setup().await;
        let first = write(&s, "First comment here").await;
        let second = write(&s, "Second comment here").await;

        let page = ListCommentsHandler::new(s.fx.comments(), s.fx.summaries.clone())
            .handle(ListCommentsQuery {
                promo_id: s.promo.id,
                page: PageRequest::new(1, 0),
            })
            .await
            .unwrap();

        assert_eq!(page.total, 2);
        assert_eq!(page.items[0].id, second.id);
        assert_ne!(page.items[0].id, first.id);
    }

    #[tokio::test]
    async fn comment_under_other_promo_is_not_found() {
        let s = setup().await;
        let comment = write(&s, "Great deal, used it twice").await;
        let company = s.fx.company("Other Shop").await;
        let other = s
            .fx
            .promo(&company, Capacity::common("BRAVO2", 5).unwrap(), Target::default())
            .await;

        let err = GetCommentHandler::new(s.fx.comments(), s.fx.summaries.clone())
            .handle(GetCommentQuery {
                promo_id: other.id,
                comment_id: comment.id,
            })
            .await
            .unwrap_err();
        assert!(matches!(err, PromoError::CommentNotFound(_)));
    }

    #[tokio::test]
    async fn only_author_may_edit_or_delete() {
        let s = setup().await;
        let comment = write(&s, "Great deal, used it twice").await;
        let stranger = s.fx.user("stranger@example.com", 40, "DE").await;

        let err = EditCommentHandler::new(s.fx.comments(), s.fx.summaries.clone())
            .handle(EditCommentCommand {
                user_id: stranger.id,
                promo_id: s.promo.id,
                comment_id: comment.id,
                text: "Rewritten by someone else".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::PermissionDenied);

        let err = DeleteCommentHandler::new(s.fx.comments(), s.fx.summaries.clone())
            .handle(DeleteCommentCommand {
                user_id: stranger.id,
                promo_id: s.promo.id,
                comment_id: comment.id,
            })
            .await
            .unwrap_err();
        assert_eq!(err.category(), ErrorCategory::PermissionDenied);
    }

    #[tokio::test]
    async fn author_edits_then_deletes() {
        let s = setup().await;
        let comment = write(&s, "Great deal, used it twice").await;

        let edited = EditCommentHandler::new(s.fx.comments(), s.fx.summaries.clone())
            .handle(EditCommentCommand {
                user_id: s.author.id,
                promo_id: s.promo.id,
                comment_id: comment.id,
                text: "Great deal, used it three times".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(edited.text, "Great deal, used it three times");

        let delete = DeleteCommentHandler::new(s.fx.comments(), s.fx.summaries.clone());
        let cmd = DeleteCommentCommand {
            user_id: s.author.id,
            promo_id: s.promo.id,
            comment_id: comment.id,
        };
        delete.handle(cmd.clone()).await.unwrap();
        assert_eq!(s.fx.stored(&s.promo).await.comment_count, 0);

        let err = delete.handle(cmd).await.unwrap_err();
        assert_eq!(err.category(), ErrorCategory::NotFound);
    }
}
