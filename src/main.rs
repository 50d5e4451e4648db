//! Promo Platform service entry point.
//!
//! Loads configuration, initialises tracing, connects to the durable and
//! ancillary stores and the fraud service, then waits for shutdown. The
//! transport layer mounts [`AppHandlers`] from here.

use std::process;

use promo_platform::bootstrap::{AppHandlers, EngineSettings, Infrastructure};
use promo_platform::config::AppConfig;
use promo_platform::telemetry::init_tracing;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    let config = AppConfig::load().unwrap_or_else(|e| {
        eprintln!("Configuration error: {e}");
        process::exit(1);
    });
    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        process::exit(1);
    }

    if let Err(e) = init_tracing(&config.runtime) {
        eprintln!("Failed to initialise tracing: {e}");
        process::exit(1);
    }

    let infra = match Infrastructure::connect(&config).await {
        Ok(infra) => infra,
        Err(e) => {
            error!(error = %e, "Failed to connect infrastructure");
            process::exit(1);
        }
    };

    let _handlers = AppHandlers::build(infra, EngineSettings::from_config(&config));
    info!(
        environment = ?config.runtime.environment,
        fraud_service = %config.fraud.base_url,
        "Promo platform ready"
    );

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
    info!("Shutting down");
}
