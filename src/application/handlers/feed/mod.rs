//! User-side promo queries.

mod get_activation_history;
mod get_feed;
mod get_user_promo;

pub use get_activation_history::{
    ActivationEntry, GetActivationHistoryHandler, GetActivationHistoryQuery,
};
pub use get_feed::{GetFeedHandler, GetFeedQuery};
pub use get_user_promo::{GetUserPromoHandler, GetUserPromoQuery};
