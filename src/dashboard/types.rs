//! Dashboard API Types
//!
//! DTOs for HTTP/WebSocket communication with the browser page.

use crate::state::CycleReport;
use crate::view::Tab;
use serde::{Deserialize, Serialize};

// ─────────────────────────────────────────────────────────────────
// Requests
// ─────────────────────────────────────────────────────────────────

/// `?tab=` deep link on the page route
#[derive(Debug, Clone, Deserialize, Default)]
pub struct PageQuery {
    pub tab: Option<String>,
}

/// Body of `POST /api/tab`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabRequest {
    pub tab: String,
}

// ─────────────────────────────────────────────────────────────────
// Responses
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TabResponse {
    /// Stored preference, `None` until a tab has been chosen
    pub active: Option<Tab>,
    pub available: Vec<Tab>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Generation of the snapshot currently served
    pub generation: u64,
    pub last_cycle: Option<CycleReport>,
    pub refresh_interval_secs: u64,
    pub server_time: i64,
}

// ─────────────────────────────────────────────────────────────────
// WebSocket Message Types
// ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum WsMessage {
    /// A newer snapshot was published
    SnapshotUpdated { generation: u64 },
    /// Heartbeat
    Heartbeat(i64),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}
