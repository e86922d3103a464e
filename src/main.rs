//! acwardend - anti-cheat gatekeeper for a VR game backend.
//!
//! Serves device, behavior and VPN checks to cloud scripts, persists bans and
//! the allow list, and exposes an operator console.

mod config;
mod db;
mod error;
mod handlers;
mod http;
mod metrics;
mod notify;
mod store;
mod telemetry;

use crate::config::{Config, DATABASE_URL_ENV, validation};
use crate::http::AppState;
use crate::notify::Notifier;
use crate::store::PolicyStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args().nth(1);
    let mut config = Config::load_or_default(config_path.as_deref()).map_err(|e| {
        error!(path = ?config_path, error = %e, "Failed to load config");
        e
    })?;

    let database_url = std::env::var(DATABASE_URL_ENV).ok();
    config.storage = config.storage.with_database_url(database_url.as_deref());

    if let Err(errors) = validation::validate(&config) {
        for e in &errors {
            error!(error = %e, "Invalid configuration");
        }
        anyhow::bail!("configuration has {} error(s)", errors.len());
    }

    info!(
        server = %config.server.name,
        listen = %config.server.listen,
        backend = ?config.storage.backend,
        "Starting acwardend"
    );

    if config.server.metrics {
        metrics::init();
        info!("Metrics initialized");
    } else {
        info!("Metrics disabled");
    }

    let store = PolicyStore::open(&config.storage).await.map_err(|e| {
        error!(error = %e, "Failed to open policy store");
        e
    })?;

    // Seed the stored policy with defaults before the first request.
    let policy = store.get().await;
    info!(
        auto_ban = policy.auto_ban_enabled,
        ban_hours = policy.ban_duration_hours,
        "Policy loaded"
    );

    let state = AppState {
        store,
        notifier: Notifier::new(&config.webhook),
    };

    http::serve(config.server.listen, http::router(state, config.server.metrics)).await?;

    info!("acwardend stopped");
    Ok(())
}
