//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresPromoRepository` - Promo aggregate with compare-and-swap capacity writes
//! - `PostgresActivationReader` - Redemption history and per-country statistics
//! - `PostgresCompanyRepository` / `PostgresUserRepository` - Account records
//! - `PostgresLikeRepository` / `PostgresCommentRepository` - Engagement with counters
//!
//! The schema lives in `migrations/` at the crate root.

mod account_repository;
mod activation_reader;
mod engagement_repository;
mod promo_repository;

pub use account_repository::{PostgresCompanyRepository, PostgresUserRepository};
pub use activation_reader::PostgresActivationReader;
pub use engagement_repository::{PostgresCommentRepository, PostgresLikeRepository};
pub use promo_repository::PostgresPromoRepository;
