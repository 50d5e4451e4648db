//! Likes and comments.

mod comments;
mod likes;

pub use comments::{
    CreateCommentCommand, CreateCommentHandler, DeleteCommentCommand, DeleteCommentHandler,
    EditCommentCommand, EditCommentHandler, GetCommentHandler, GetCommentQuery,
    ListCommentsHandler, ListCommentsQuery,
};
pub use likes::{
    LikePromoCommand, LikePromoHandler, LikeResult, UnlikePromoCommand, UnlikePromoHandler,
};
