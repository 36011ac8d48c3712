//! Dashboard HTTP API
//!
//! The rendered page plus JSON endpoints for the page script and for debugging.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use tower_http::cors::{Any, CorsLayer};

use super::types::*;
use super::websocket::websocket_handler;
use super::{render_dashboard_html, DashboardContext};
use crate::view::{build_dashboard_view, resolve_active_tab, Tab};

/// Create the router with all endpoints
pub fn create_router(ctx: DashboardContext) -> Router {
    Router::new()
        .route("/", get(get_page))
        .route("/api/view", get(get_view))
        .route("/api/snapshot", get(get_snapshot))
        .route("/api/tab", get(get_tab).post(set_tab))
        .route("/api/health", get(get_health))
        .route("/ws", get(websocket_handler))
        .with_state(ctx)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}

// ─────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────

/// GET / - Rendered dashboard; `?tab=` overrides the stored tab
async fn get_page(
    State(ctx): State<DashboardContext>,
    Query(query): Query<PageQuery>,
) -> Html<String> {
    let snapshot = ctx.state.snapshot().await;
    let view = build_dashboard_view(&snapshot, &ctx.options);
    let active = resolve_active_tab(query.tab.as_deref(), ctx.prefs.get().await);
    Html(render_dashboard_html(&view, active, &ctx.page_meta()))
}

/// GET /api/view - View model behind the page
async fn get_view(State(ctx): State<DashboardContext>) -> impl IntoResponse {
    let snapshot = ctx.state.snapshot().await;
    Json(ApiResponse::success(build_dashboard_view(
        &snapshot,
        &ctx.options,
    )))
}

/// GET /api/snapshot - Normalized data as currently published
async fn get_snapshot(State(ctx): State<DashboardContext>) -> impl IntoResponse {
    let snapshot = ctx.state.snapshot().await;
    Json(ApiResponse::success(snapshot.as_ref().clone()))
}

/// GET /api/tab
async fn get_tab(State(ctx): State<DashboardContext>) -> impl IntoResponse {
    Json(ApiResponse::success(TabResponse {
        active: ctx.prefs.get().await,
        available: Tab::ALL.to_vec(),
    }))
}

/// POST /api/tab - Remember the active tab
async fn set_tab(
    State(ctx): State<DashboardContext>,
    Json(req): Json<TabRequest>,
) -> impl IntoResponse {
    let Some(tab) = Tab::from_id(&req.tab) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ApiResponse::<TabResponse>::error(format!(
                "Unknown tab: {}",
                req.tab
            ))),
        );
    };

    if let Err(e) = ctx.prefs.set(tab).await {
        tracing::warn!(error = %e, %tab, "Failed to persist tab preference");
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::error(e.to_string())),
        );
    }

    (
        StatusCode::OK,
        Json(ApiResponse::success(TabResponse {
            active: Some(tab),
            available: Tab::ALL.to_vec(),
        })),
    )
}

/// GET /api/health
async fn get_health(State(ctx): State<DashboardContext>) -> impl IntoResponse {
    let snapshot = ctx.state.snapshot().await;
    Json(ApiResponse::success(HealthResponse {
        generation: snapshot.generation,
        last_cycle: ctx.state.last_report().await,
        refresh_interval_secs: ctx.refresh_secs,
        server_time: chrono::Utc::now().timestamp_millis(),
    }))
}
