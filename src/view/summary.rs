//! Summary statistics for the header cards

use super::{format_signed_usd, format_usd};
use crate::types::Snapshot;
use serde::{Deserialize, Serialize};

/// Shown instead of a win rate when there are no trades
pub const PLACEHOLDER: &str = "--";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SummaryStats {
    /// Value of the last equity point
    pub current_value: Option<f64>,
    pub highest_value: Option<f64>,
    pub lowest_value: Option<f64>,
    pub total_trades: usize,
    pub wins: usize,
    /// Percent in [0, 100]; `None` with zero trades
    pub win_rate: Option<f64>,
    pub total_pnl: f64,
    pub ai_analysis_count: usize,
}

impl SummaryStats {
    pub fn win_rate_label(&self) -> String {
        match self.win_rate {
            Some(rate) => format!("{:.1}%", rate),
            None => PLACEHOLDER.to_string(),
        }
    }
}

/// Aggregates over the whole snapshot, independent of the chart window.
pub fn compute_summary(snapshot: &Snapshot) -> SummaryStats {
    let values = snapshot.account_history.iter().map(|p| p.value);
    let highest_value = values.clone().reduce(f64::max);
    let lowest_value = values.reduce(f64::min);

    let total_trades = snapshot.trades.len();
    let wins = snapshot.trades.iter().filter(|t| t.is_win()).count();
    let win_rate = if total_trades > 0 {
        Some(wins as f64 / total_trades as f64 * 100.0)
    } else {
        None
    };

    SummaryStats {
        current_value: snapshot.account_history.last().map(|p| p.value),
        highest_value,
        lowest_value,
        total_trades,
        wins,
        win_rate,
        total_pnl: snapshot.trades.iter().map(|t| t.pnl).sum(),
        ai_analysis_count: snapshot.ai_logs.len(),
    }
}

/// Display strings for the summary cards
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct SummaryView {
    pub stats: SummaryStats,
    pub current_value: String,
    pub highest_value: String,
    pub lowest_value: String,
    pub win_rate: String,
    pub total_pnl: String,
}

pub fn build_summary_view(snapshot: &Snapshot) -> SummaryView {
    let stats = compute_summary(snapshot);
    let money = |v: Option<f64>| v.map(format_usd).unwrap_or_else(|| PLACEHOLDER.to_string());

    SummaryView {
        current_value: money(stats.current_value),
        highest_value: money(stats.highest_value),
        lowest_value: money(stats.lowest_value),
        win_rate: stats.win_rate_label(),
        total_pnl: format_signed_usd(stats.total_pnl),
        stats,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AiLogEntry, EquityPoint, Trade};

    fn trade(pnl: f64) -> Trade {
        Trade {
            pnl,
            ..Trade::default()
        }
    }

    #[test]
    fn test_equity_extremes_and_current() {
        let snapshot = Snapshot {
            account_history: vec![
                EquityPoint::new(1, 100.0),
                EquityPoint::new(2, 150.0),
                EquityPoint::new(3, 90.0),
            ],
            ..Snapshot::default()
        };
        let stats = compute_summary(&snapshot);
        assert_eq!(stats.highest_value, Some(150.0));
        assert_eq!(stats.lowest_value, Some(90.0));
        assert_eq!(stats.current_value, Some(90.0));
    }

    #[test]
    fn test_win_rate_counts_strictly_positive_pnl() {
        let snapshot = Snapshot {
            trades: vec![trade(10.0), trade(0.0), trade(-5.0), trade(2.5)],
            ..Snapshot::default()
        };
        let stats = compute_summary(&snapshot);
        assert_eq!(stats.total_trades, 4);
        assert_eq!(stats.wins, 2);
        assert_eq!(stats.win_rate_label(), "50.0%");
        assert!((stats.total_pnl - 7.5).abs() < 1e-9);
    }

    #[test]
    fn test_no_trades_uses_placeholder() {
        let stats = compute_summary(&Snapshot::default());
        assert_eq!(stats.win_rate, None);
        assert_eq!(stats.win_rate_label(), PLACEHOLDER);
        assert_ne!(stats.win_rate_label(), "0.0%");
        assert_ne!(stats.win_rate_label(), "NaN%");
    }

    #[test]
    fn test_all_losses_is_a_real_zero() {
        let snapshot = Snapshot {
            trades: vec![trade(-1.0)],
            ..Snapshot::default()
        };
        assert_eq!(compute_summary(&snapshot).win_rate_label(), "0.0%");
    }

    #[test]
    fn test_summary_view_labels() {
        let snapshot = Snapshot {
            account_history: vec![EquityPoint::new(1, 12345.678)],
            ai_logs: vec![AiLogEntry::default(), AiLogEntry::default()],
            ..Snapshot::default()
        };
        let view = build_summary_view(&snapshot);
        assert_eq!(view.current_value, "$12,345.68");
        assert_eq!(view.win_rate, PLACEHOLDER);
        assert_eq!(view.stats.ai_analysis_count, 2);

        let empty = build_summary_view(&Snapshot::default());
        assert_eq!(empty.highest_value, PLACEHOLDER);
    }
}
