//! View models
//!
//! Pure functions from a `Snapshot` to everything the display layer shows.
//! Nothing in here touches HTML, sockets or the clock.

pub mod chart;
pub mod feed;
pub mod summary;
pub mod tabs;

pub use chart::{build_chart_view, compute_chart_range, ChartRange, ChartView, WindowPolicy};
pub use feed::{
    build_log_feed, build_trade_list, LogFeedView, Tone, TradeListPolicy, TradeListView, TradeRow,
};
pub use summary::{build_summary_view, compute_summary, SummaryStats, SummaryView};
pub use tabs::{resolve_active_tab, Tab};

use crate::normalize::parse_time_str;
use crate::types::Snapshot;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Knobs for the variant differences between dashboard builds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewOptions {
    pub trade_policy: TradeListPolicy,
    /// `None` shows every log entry
    pub max_logs: Option<usize>,
    pub quantity_decimals: usize,
    pub y_ticks: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            trade_policy: TradeListPolicy::default(),
            max_logs: Some(feed::DEFAULT_MAX_LOGS),
            quantity_decimals: feed::DEFAULT_QUANTITY_DECIMALS,
            y_ticks: chart::DEFAULT_Y_TICKS,
        }
    }
}

/// Everything one page render needs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct DashboardView {
    pub summary: SummaryView,
    pub chart: ChartView,
    pub trades: TradeListView,
    pub logs: LogFeedView,
    pub last_updated: Option<String>,
    pub generation: u64,
}

pub fn build_dashboard_view(snapshot: &Snapshot, options: &ViewOptions) -> DashboardView {
    DashboardView {
        summary: build_summary_view(snapshot),
        chart: build_chart_view(&snapshot.account_history, options.y_ticks),
        trades: build_trade_list(
            &snapshot.trades,
            &options.trade_policy,
            options.quantity_decimals,
        ),
        logs: build_log_feed(&snapshot.ai_logs, options.max_logs),
        last_updated: snapshot
            .last_updated
            .as_deref()
            .and_then(format_time_label),
        generation: snapshot.generation,
    }
}

// ─────────────────────────────────────────────────────────────────
// Formatting
// ─────────────────────────────────────────────────────────────────

/// Fixed decimals with `,` thousands grouping. Non-finite input renders as 0.
pub fn format_number(value: f64, decimals: usize) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let raw = format!("{:.*}", decimals, value.abs());
    let (int_part, frac_part) = match raw.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (raw.as_str(), None),
    };

    let mut out = String::with_capacity(raw.len() + int_part.len() / 3 + 1);
    let rounds_to_zero = raw.chars().all(|c| c == '0' || c == '.');
    if value < 0.0 && !rounds_to_zero {
        out.push('-');
    }
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    if let Some(frac) = frac_part {
        out.push('.');
        out.push_str(frac);
    }
    out
}

/// `$1,234.50`, `-$3.00`
pub fn format_usd(value: f64) -> String {
    let body = format_number(value, 2);
    match body.strip_prefix('-') {
        Some(abs) => format!("-${}", abs),
        None => format!("${}", body),
    }
}

/// Like `format_usd` but always signed: `+$12.00`, `-$3.00`
pub fn format_signed_usd(value: f64) -> String {
    let s = format_usd(value);
    if s.starts_with('-') {
        s
    } else {
        format!("+{}", s)
    }
}

/// Human form of a source time string. Unparseable input is shown as written,
/// empty input yields `None`.
pub fn format_time_label(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let label = parse_time_str(raw)
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S UTC").to_string())
        .unwrap_or_else(|| raw.to_string());
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AiLogEntry, EquityPoint, Trade};

    #[test]
    fn test_format_number_grouping() {
        assert_eq!(format_number(0.0, 2), "0.00");
        assert_eq!(format_number(999.999, 2), "1,000.00");
        assert_eq!(format_number(1234567.891, 2), "1,234,567.89");
        assert_eq!(format_number(-1234.5, 2), "-1,234.50");
        assert_eq!(format_number(0.12345, 4), "0.1235");
        assert_eq!(format_number(123456.0, 0), "123,456");
        assert_eq!(format_number(f64::NAN, 2), "0.00");
    }

    #[test]
    fn test_negative_that_rounds_to_zero_has_no_sign() {
        assert_eq!(format_number(-0.001, 2), "0.00");
        assert_eq!(format_signed_usd(-0.001), "+$0.00");
    }

    #[test]
    fn test_usd_formats() {
        assert_eq!(format_usd(1234.5), "$1,234.50");
        assert_eq!(format_usd(-3.0), "-$3.00");
        assert_eq!(format_signed_usd(12.0), "+$12.00");
        assert_eq!(format_signed_usd(-3.0), "-$3.00");
    }

    #[test]
    fn test_time_label() {
        assert_eq!(
            format_time_label("2024-03-01T12:00:00Z").as_deref(),
            Some("2024-03-01 12:00:00 UTC")
        );
        assert_eq!(format_time_label("late").as_deref(), Some("late"));
        assert_eq!(format_time_label("  "), None);
    }

    #[test]
    fn test_dashboard_view_composes_all_panels() {
        let snapshot = Snapshot {
            account_history: vec![EquityPoint::new(1_700_000_000_000, 1000.0)],
            last_updated: Some("2023-11-14T22:13:20Z".to_string()),
            trades: vec![Trade {
                pnl: 5.0,
                ..Trade::default()
            }],
            ai_logs: vec![AiLogEntry {
                time: "2023-11-14 22:00:00".to_string(),
                analysis: "hold".to_string(),
            }],
            generation: 7,
            fetched_at: 0,
        };
        let view = build_dashboard_view(&snapshot, &ViewOptions::default());

        assert_eq!(view.generation, 7);
        assert_eq!(view.chart.points.len(), 1);
        assert_eq!(view.trades.rows.len(), 1);
        assert_eq!(view.logs.rows.len(), 1);
        assert_eq!(view.summary.win_rate, "100.0%");
        assert_eq!(view.last_updated.as_deref(), Some("2023-11-14 22:13:20 UTC"));
    }

    #[test]
    fn test_extreme_timestamps_do_not_break_the_view() {
        let raw = serde_json::json!({ "timestamps": [-1e20, 1e20], "values": [1, 2] });
        let history = crate::normalize::normalize_account_history(&raw, 0);
        let snapshot = Snapshot {
            account_history: history.points,
            ..Snapshot::default()
        };
        let view = build_dashboard_view(&snapshot, &ViewOptions::default());
        let range = view.chart.range.unwrap();
        assert!(range.x_min <= range.x_max);
        assert_eq!(view.chart.points.len(), 2);

        let sixty: Vec<EquityPoint> = (0..60).map(|i| EquityPoint::new(i64::MIN, i as f64)).collect();
        let snapshot = Snapshot {
            account_history: sixty,
            ..Snapshot::default()
        };
        let view = build_dashboard_view(&snapshot, &ViewOptions::default());
        assert_eq!(view.chart.range.unwrap().x_min, i64::MIN);
    }
}
