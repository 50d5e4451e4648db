//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (value objects, IDs, pagination, errors)
//! - `promo` - Promo aggregate, capacity, eligibility, availability and redemption rules
//! - `company` - Promo-owning companies
//! - `user` - Platform users
//! - `comment` - Comments on promos
//! - `fraud` - Fraud verdict value types

pub mod comment;
pub mod company;
pub mod foundation;
pub mod fraud;
pub mod promo;
pub mod user;
