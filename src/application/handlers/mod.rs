//! Application handlers.
//!
//! One command or query handler per caller-facing operation, grouped by area.

pub mod company;
pub mod engagement;
pub mod feed;
pub mod promo;
pub mod redemption;
pub mod user;

mod lookup;

#[cfg(test)]
pub(crate) mod test_support;

pub use company::{
    FindCompanyByEmailHandler, FindCompanyByEmailQuery, GetCompanyHandler, GetCompanyQuery,
    RegisterCompanyCommand, RegisterCompanyHandler, RegisterCompanyResult,
};
pub use engagement::{
    CreateCommentCommand, CreateCommentHandler, DeleteCommentCommand, DeleteCommentHandler,
    EditCommentCommand, EditCommentHandler, GetCommentHandler, GetCommentQuery,
    LikePromoCommand, LikePromoHandler, LikeResult, ListCommentsHandler, ListCommentsQuery,
    UnlikePromoCommand, UnlikePromoHandler,
};
pub use feed::{
    ActivationEntry, GetActivationHistoryHandler, GetActivationHistoryQuery, GetFeedHandler,
    GetFeedQuery, GetUserPromoHandler, GetUserPromoQuery,
};
pub use promo::{
    CreatePromoCommand, CreatePromoHandler, CreatePromoResult, EditPromoCommand,
    EditPromoHandler, EditPromoResult, GetCompanyPromoHandler, GetCompanyPromoQuery,
    GetPromoStatsHandler, GetPromoStatsQuery, ListCompanyPromosHandler, ListCompanyPromosQuery,
};
pub use redemption::{RedeemPromoCommand, RedeemPromoHandler, RedeemPromoResult};
pub use user::{
    FindUserByEmailHandler, FindUserByEmailQuery, GetUserHandler, GetUserQuery,
    RegisterUserCommand, RegisterUserHandler, RegisterUserResult, UpdateUserProfileCommand,
    UpdateUserProfileHandler,
};
