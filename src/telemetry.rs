//! Tracing subscriber initialisation.
//!
//! `RUST_LOG` wins over `runtime.log_filter`. Output is JSON lines or the
//! compact human format, per [`RuntimeConfig::json_logs`].

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::{SubscriberInitExt, TryInitError};
use tracing_subscriber::EnvFilter;

use crate::config::RuntimeConfig;

fn build_env_filter(config: &RuntimeConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_filter))
}

/// Install the global subscriber. Fails if one is already installed.
pub fn init_tracing(config: &RuntimeConfig) -> Result<(), TryInitError> {
    let registry = tracing_subscriber::registry().with(build_env_filter(config));

    if config.json_logs() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true),
            )
            .try_init()
    } else {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .compact()
                    .with_target(true)
                    .with_line_number(true),
            )
            .try_init()
    }
}
