//! Equity chart range
//!
//! Y bounds pad the observed min/max by 10% of the range (never below zero).
//! The X window adapts to how many points exist: everything for small series,
//! then the most recent 12h, then the most recent 24h.

use crate::types::EquityPoint;
use serde::{Deserialize, Serialize};

const HOUR_MS: i64 = 3_600_000;
pub const Y_PADDING_RATIO: f64 = 0.10;
pub const X_END_PADDING_RATIO: f64 = 0.05;
/// Series up to this length are shown whole
pub const ALL_POINTS_MAX: usize = 10;
/// Series up to this length get the 12h window, longer ones 24h
pub const HALF_DAY_MAX: usize = 50;
pub const DEFAULT_Y_TICKS: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowPolicy {
    All,
    Recent12h,
    Recent24h,
}

impl WindowPolicy {
    pub fn for_count(count: usize) -> Self {
        if count <= ALL_POINTS_MAX {
            WindowPolicy::All
        } else if count <= HALF_DAY_MAX {
            WindowPolicy::Recent12h
        } else {
            WindowPolicy::Recent24h
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            WindowPolicy::All => "All",
            WindowPolicy::Recent12h => "Last 12h",
            WindowPolicy::Recent24h => "Last 24h",
        }
    }

    /// Look-back span, `None` for the whole series
    pub fn span_ms(&self) -> Option<i64> {
        match self {
            WindowPolicy::All => None,
            WindowPolicy::Recent12h => Some(12 * HOUR_MS),
            WindowPolicy::Recent24h => Some(24 * HOUR_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartRange {
    pub policy: WindowPolicy,
    pub x_min: i64,
    pub x_max: i64,
    pub y_min: f64,
    pub y_max: f64,
}

/// Axis bounds for a series, `None` when it is empty.
pub fn compute_chart_range(points: &[EquityPoint]) -> Option<ChartRange> {
    let first = points.first()?;

    let (mut lo, mut hi) = (first.value, first.value);
    let (mut earliest, mut latest) = (first.timestamp, first.timestamp);
    for p in points {
        lo = lo.min(p.value);
        hi = hi.max(p.value);
        earliest = earliest.min(p.timestamp);
        latest = latest.max(p.timestamp);
    }

    let range = hi - lo;
    let y_min = (lo - Y_PADDING_RATIO * range).max(0.0);
    let y_max = hi + Y_PADDING_RATIO * range;

    let policy = WindowPolicy::for_count(points.len());
    let x_min = match policy.span_ms() {
        Some(span) => earliest.max(latest.saturating_sub(span)),
        None => earliest,
    };
    let pad = (latest.saturating_sub(x_min) as f64 * X_END_PADDING_RATIO).round() as i64;

    Some(ChartRange {
        policy,
        x_min,
        x_max: latest.saturating_add(pad),
        y_min,
        y_max,
    })
}

/// Chart data handed to the display layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct ChartView {
    pub range: Option<ChartRange>,
    /// Points inside the X window, in received order
    pub points: Vec<EquityPoint>,
    pub y_ticks: Vec<f64>,
}

pub fn build_chart_view(points: &[EquityPoint], tick_count: usize) -> ChartView {
    let Some(range) = compute_chart_range(points) else {
        return ChartView::default();
    };

    let visible = points
        .iter()
        .filter(|p| p.timestamp >= range.x_min)
        .copied()
        .collect();

    ChartView {
        range: Some(range),
        points: visible,
        y_ticks: y_ticks(range.y_min, range.y_max, tick_count),
    }
}

fn y_ticks(y_min: f64, y_max: f64, count: usize) -> Vec<f64> {
    if count < 2 || y_max <= y_min {
        return vec![y_min];
    }
    let step = (y_max - y_min) / (count - 1) as f64;
    (0..count).map(|i| y_min + step * i as f64).collect()
}
