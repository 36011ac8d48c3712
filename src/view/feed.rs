//! Trade list and AI log feed

use super::{format_number, format_signed_usd, format_time_label, format_usd};
use crate::types::{AiLogEntry, Trade};
use serde::{Deserialize, Serialize};

pub const DEFAULT_MAX_TRADES: usize = 100;
pub const DEFAULT_MAX_LOGS: usize = 50;
pub const DEFAULT_QUANTITY_DECIMALS: usize = 4;

/// Which trades to show and in what order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeListPolicy {
    /// Keep only the most recent `limit` trades; `None` keeps all
    pub limit: Option<usize>,
    pub newest_first: bool,
}

impl Default for TradeListPolicy {
    fn default() -> Self {
        Self {
            limit: Some(DEFAULT_MAX_TRADES),
            newest_first: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Positive,
    Negative,
}

impl Tone {
    pub fn of(pnl: f64) -> Self {
        if pnl >= 0.0 {
            Tone::Positive
        } else {
            Tone::Negative
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            Tone::Positive => "positive",
            Tone::Negative => "negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeRow {
    pub symbol: String,
    pub side: String,
    pub entry_price: String,
    pub close_price: String,
    pub qty: String,
    pub pnl: String,
    pub pnl_percent: String,
    pub duration: String,
    pub close_time: String,
    pub tone: Tone,
}

impl TradeRow {
    pub fn from_trade(trade: &Trade, quantity_decimals: usize) -> Self {
        let or_dash = |s: &str| {
            if s.is_empty() {
                "-".to_string()
            } else {
                s.to_string()
            }
        };

        Self {
            symbol: or_dash(&trade.symbol),
            side: trade.side.to_string(),
            entry_price: format_usd(trade.entry_price),
            close_price: format_usd(trade.close_price),
            qty: format_number(trade.qty, quantity_decimals),
            pnl: format_signed_usd(trade.pnl),
            pnl_percent: format!("{:+.2}%", trade.pnl_percent),
            duration: or_dash(&trade.duration),
            close_time: format_time_label(&trade.close_time).unwrap_or_else(|| "-".to_string()),
            tone: Tone::of(trade.pnl),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct TradeListView {
    pub rows: Vec<TradeRow>,
    /// Trades in the snapshot before the policy was applied
    pub total: usize,
}

pub fn build_trade_list(
    trades: &[Trade],
    policy: &TradeListPolicy,
    quantity_decimals: usize,
) -> TradeListView {
    let start = policy
        .limit
        .map(|limit| trades.len().saturating_sub(limit))
        .unwrap_or(0);
    let selected = &trades[start..];

    let mut rows: Vec<TradeRow> = selected
        .iter()
        .map(|t| TradeRow::from_trade(t, quantity_decimals))
        .collect();
    if policy.newest_first {
        rows.reverse();
    }

    TradeListView {
        rows,
        total: trades.len(),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct LogFeedView {
    pub rows: Vec<AiLogEntry>,
    pub total: usize,
}

/// `logs` is already newest first, so the cap keeps the head.
pub fn build_log_feed(logs: &[AiLogEntry], limit: Option<usize>) -> LogFeedView {
    let take = limit.unwrap_or(logs.len()).min(logs.len());
    LogFeedView {
        rows: logs[..take].to_vec(),
        total: logs.len(),
    }
}
