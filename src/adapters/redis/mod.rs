//! Redis adapters.
//!
//! - `RedisAncillaryStore` - Cache-aside records, email indexes and fraud verdicts

mod ancillary_store;

pub use ancillary_store::RedisAncillaryStore;
