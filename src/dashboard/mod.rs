//! Dashboard Module
//!
//! Serves the rendered page, a small JSON API and a WebSocket that announces
//! new snapshots. Only compiled when the `dashboard` feature is enabled.

mod api;
mod html;
mod prefs;
mod types;
mod websocket;

pub use api::create_router;
pub use html::{escape_html, render_chart_svg, render_dashboard_html, PageMeta};
pub use prefs::TabPreferenceStore;
pub use types::*;

use crate::config::AppConfig;
use crate::state::AppState;
use crate::view::ViewOptions;
use std::sync::Arc;

/// Everything the handlers need, cloned into each request
#[derive(Debug, Clone)]
pub struct DashboardContext {
    pub state: Arc<AppState>,
    pub prefs: Arc<TabPreferenceStore>,
    pub options: ViewOptions,
    pub refresh_secs: u64,
    pub bot_name: String,
}

impl DashboardContext {
    pub fn new(state: Arc<AppState>, prefs: Arc<TabPreferenceStore>, config: &AppConfig) -> Self {
        Self {
            state,
            prefs,
            options: config.view.to_options(),
            refresh_secs: config.refresh.interval_secs,
            bot_name: config.dashboard.bot_name.clone(),
        }
    }

    pub(crate) fn page_meta(&self) -> PageMeta {
        PageMeta {
            bot_name: self.bot_name.clone(),
            refresh_secs: self.refresh_secs,
        }
    }
}

/// Start the dashboard server and run until `shutdown` resolves
pub async fn start_server(
    ctx: DashboardContext,
    bind_addr: &str,
    shutdown: impl std::future::Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    let app = create_router(ctx);
    let listener = tokio::net::TcpListener::bind(bind_addr).await?;

    tracing::info!("🖥️ Dashboard starting on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;

    Ok(())
}
