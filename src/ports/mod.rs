//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Durable Store Ports
//!
//! - `PromoRepository` - Promo aggregate persistence and atomic redemption commits
//! - `ActivationReader` - Redemption history and statistics
//! - `CompanyRepository` / `UserRepository` - Account records
//! - `LikeRepository` / `CommentRepository` - Engagement
//!
//! ## Cache-Aside Ports
//!
//! - `CacheRecord` - Projection of a record into the ancillary store
//! - `RecordSource` / `RecordStore` - Durable side of a cached record
//! - `AncillaryStore` - TTL-evicted key/value store
//!
//! ## External Service Ports
//!
//! - `FraudVerdictService` - Single-attempt fraud verdict lookup

mod activation_reader;
mod ancillary_store;
mod comment_repository;
mod company_repository;
mod fraud_verdict_service;
mod like_repository;
mod promo_repository;
mod record_store;
mod user_repository;

pub use activation_reader::ActivationReader;
pub use ancillary_store::AncillaryStore;
pub use comment_repository::CommentRepository;
pub use company_repository::CompanyRepository;
pub use fraud_verdict_service::FraudVerdictService;
pub use like_repository::LikeRepository;
pub use promo_repository::{
    CommitOutcome, CompanyPromoQuery, FeedFilter, PromoRepository, PromoSort, RedemptionCommit,
};
pub use record_store::{record_key, CacheRecord, RecordFields, RecordSource, RecordStore};
pub use user_repository::UserRepository;
