//! Fraud verdict service adapters.

mod http;
mod mock;

pub use http::{HttpFraudConfig, HttpFraudService};
pub use mock::MockFraudService;
