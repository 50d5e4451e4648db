//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - Durable store (promos, activations, accounts, engagement)
//! - `redis` - Ancillary store for cache-aside records and fraud verdicts
//! - `fraud` - Fraud verdict service clients (HTTP, scripted mock)
//! - `memory` - In-memory durable and ancillary stores for tests and local runs

pub mod fraud;
pub mod memory;
pub mod postgres;
pub mod redis;

pub use fraud::{HttpFraudConfig, HttpFraudService, MockFraudService};
pub use memory::{InMemoryAncillaryStore, InMemoryDatabase};
pub use postgres::{
    PostgresActivationReader, PostgresCommentRepository, PostgresCompanyRepository,
    PostgresLikeRepository, PostgresPromoRepository, PostgresUserRepository,
};
pub use self::redis::RedisAncillaryStore;
