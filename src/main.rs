//! PrismDash server
//!
//! Loads configuration, starts the refresh loop and serves the dashboard.

use anyhow::{Context, Result};
use prismdash::config::{AppConfig, LoggingConfig};
use prismdash::dashboard::{start_server, DashboardContext, TabPreferenceStore};
use prismdash::fetcher::data_source_from_config;
use prismdash::refresh::run_refresh_loop;
use prismdash::state::AppState;
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);
    if logging.json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for Ctrl+C");
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load().context("Failed to load configuration")?;
    init_tracing(&config.logging);

    info!("📊 PrismDash starting");
    info!("{}", config);

    let state = Arc::new(AppState::new());
    let source = data_source_from_config(&config.data);
    let prefs = Arc::new(TabPreferenceStore::load(&config.dashboard.prefs_path));

    let refresh_task = tokio::spawn(run_refresh_loop(
        source,
        state.clone(),
        Duration::from_secs(config.refresh.interval_secs),
    ));

    let ctx = DashboardContext::new(state, prefs, &config);
    let result = start_server(ctx, &config.dashboard.bind_addr, shutdown_signal()).await;

    refresh_task.abort();
    info!("👋 PrismDash stopped");
    result
}
