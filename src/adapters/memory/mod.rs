//! In-memory adapters.
//!
//! Implementations of every storage port for tests and local development.

mod accounts;
mod ancillary;
mod database;
mod engagement;

pub use ancillary::InMemoryAncillaryStore;
pub use database::InMemoryDatabase;
