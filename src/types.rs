//! Core types used throughout PrismDash
//!
//! Canonical records produced by the normalizer and the snapshot they live in.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The three JSON resources read on every refresh cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resource {
    AccountHistory,
    Trades,
    AiLogs,
}

impl Resource {
    pub const ALL: [Resource; 3] = [Resource::AccountHistory, Resource::Trades, Resource::AiLogs];

    /// File name relative to the data location
    pub fn file_name(&self) -> &'static str {
        match self {
            Resource::AccountHistory => "account_history.json",
            Resource::Trades => "trades.json",
            Resource::AiLogs => "ai_logs.json",
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Resource::AccountHistory => write!(f, "account_history"),
            Resource::Trades => write!(f, "trades"),
            Resource::AiLogs => write!(f, "ai_logs"),
        }
    }
}

/// One account equity sample
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EquityPoint {
    /// Epoch milliseconds
    pub timestamp: i64,
    pub value: f64,
}

impl EquityPoint {
    pub fn new(timestamp: i64, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// Position side of a closed trade
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    Long,
    Short,
    /// Source had no side, or one we don't recognize
    #[default]
    Unknown,
}

impl Side {
    /// Parse case-insensitively. Buy/sell wording maps onto long/short.
    pub fn parse(s: &str) -> Self {
        match s.trim().to_uppercase().as_str() {
            "LONG" | "BUY" => Side::Long,
            "SHORT" | "SELL" => Side::Short,
            _ => Side::Unknown,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Long => write!(f, "LONG"),
            Side::Short => write!(f, "SHORT"),
            Side::Unknown => write!(f, "-"),
        }
    }
}

/// A closed trade in canonical shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Trade {
    pub symbol: String,
    pub side: Side,
    pub qty: f64,
    pub entry_price: f64,
    pub close_price: f64,
    /// ISO-8601 as provided by the source, or empty
    pub close_time: String,
    pub pnl: f64,
    pub pnl_percent: f64,
    /// Free-form holding time as provided by the source, or empty
    pub duration: String,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.pnl > 0.0
    }
}

/// One (possibly merged) AI commentary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct AiLogEntry {
    /// Display form of the time, exactly as the source wrote it
    pub time: String,
    pub analysis: String,
}

/// Complete normalized state produced by one refresh cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Snapshot {
    pub account_history: Vec<EquityPoint>,
    pub last_updated: Option<String>,
    pub trades: Vec<Trade>,
    pub ai_logs: Vec<AiLogEntry>,
    /// Refresh cycle that produced this snapshot (0 = nothing fetched yet)
    pub generation: u64,
    /// Epoch ms when the producing cycle started
    pub fetched_at: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_parse_is_case_insensitive() {
        assert_eq!(Side::parse("long"), Side::Long);
        assert_eq!(Side::parse("Buy"), Side::Long);
        assert_eq!(Side::parse(" SELL "), Side::Short);
        assert_eq!(Side::parse("short"), Side::Short);
        assert_eq!(Side::parse("flat"), Side::Unknown);
        assert_eq!(Side::parse(""), Side::Unknown);
    }

    #[test]
    fn test_side_serializes_uppercase() {
        assert_eq!(serde_json::to_string(&Side::Long).unwrap(), "\"LONG\"");
        assert_eq!(serde_json::to_string(&Side::Short).unwrap(), "\"SHORT\"");
    }

    #[test]
    fn test_resource_file_names() {
        let files: Vec<_> = Resource::ALL.iter().map(|r| r.file_name()).collect();
        assert_eq!(
            files,
            vec!["account_history.json", "trades.json", "ai_logs.json"]
        );
    }
}
