//! Configuration sections

use crate::view::{TradeListPolicy, ViewOptions};
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Base URL (`http(s)://...`) or local directory holding the JSON files
    pub location: String,
    /// Per-request timeout in milliseconds (HTTP only)
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RefreshConfig {
    /// Seconds between refresh cycles
    pub interval_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ViewConfig {
    /// Most recent trades to show; 0 shows all
    pub max_trades: usize,
    /// Show newest trades first
    pub newest_first: bool,
    /// Most recent AI log entries to show; 0 shows all
    pub max_logs: usize,
    /// Decimals for trade quantities
    pub quantity_decimals: usize,
    /// Y-axis labels on the equity chart
    pub y_ticks: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardConfig {
    /// Address the HTTP server binds to
    pub bind_addr: String,
    /// JSON file holding the active tab preference
    pub prefs_path: String,
    /// Name shown in the page header
    pub bot_name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl ViewConfig {
    pub fn to_options(&self) -> ViewOptions {
        let cap = |n: usize| if n == 0 { None } else { Some(n) };
        ViewOptions {
            trade_policy: TradeListPolicy {
                limit: cap(self.max_trades),
                newest_first: self.newest_first,
            },
            max_logs: cap(self.max_logs),
            quantity_decimals: self.quantity_decimals,
            y_ticks: self.y_ticks,
        }
    }
}
