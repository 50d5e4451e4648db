//! Promo redemption.

mod redeem_promo;

pub use redeem_promo::{RedeemPromoCommand, RedeemPromoHandler, RedeemPromoResult};
