//! Normalizer
//!
//! Maps the loosely-shaped JSON written by the trading bot into canonical records.
//! Every function here is pure and total: malformed input degrades to defaults or
//! empty sequences, never to an error or a panic.

pub mod time;

use crate::types::{AiLogEntry, EquityPoint, Side, Trade};
use serde_json::{Map, Value};
use std::collections::HashMap;

pub use time::{parse_time_str, timestamp_ms};

/// Spacing used when the equity file carries values but no timestamps
pub const SYNTHETIC_INTERVAL_MS: i64 = 60_000;

// ─────────────────────────────────────────────────────────────────
// Alias lists (first present wins)
// ─────────────────────────────────────────────────────────────────

pub const SYMBOL_ALIASES: &[&str] = &["symbol", "coin", "asset", "pair", "ticker"];
pub const SIDE_ALIASES: &[&str] = &["side", "direction", "position_side", "type"];
pub const QTY_ALIASES: &[&str] = &["qty", "quantity", "size", "amount"];
pub const ENTRY_PRICE_ALIASES: &[&str] = &[
    "entry_price",
    "entry",
    "open_price",
    "entryPrice",
    "avg_entry_price",
];
pub const CLOSE_PRICE_ALIASES: &[&str] =
    &["close_price", "exit_price", "exit", "close", "closePrice"];
pub const CLOSE_TIME_ALIASES: &[&str] = &[
    "close_time",
    "exit_time",
    "closed_at",
    "closeTime",
    "entry_time",
    "time",
];
pub const PNL_ALIASES: &[&str] = &["pnl", "realized_pnl", "profit", "pnl_usd", "net_pnl"];
pub const PNL_PERCENT_ALIASES: &[&str] =
    &["pnl_percent", "pnl_pct", "pnlPercent", "return_pct", "roi"];
pub const DURATION_ALIASES: &[&str] = &["duration", "hold_time"];

pub const LOG_TIME_ALIASES: &[&str] = &["time", "timestamp"];
pub const LOG_ANALYSIS_ALIASES: &[&str] = &["analysis", "message", "text"];

const TRADE_WRAPPERS: &[&str] = &["trades", "data", "items"];
const LOG_WRAPPERS: &[&str] = &["logs", "ai_logs", "data", "items"];

// ─────────────────────────────────────────────────────────────────
// Generic helpers
// ─────────────────────────────────────────────────────────────────

/// Value of the first alias that is present and not `null`.
pub fn first_present<'a>(obj: &'a Map<String, Value>, aliases: &[&str]) -> Option<&'a Value> {
    aliases
        .iter()
        .find_map(|key| obj.get(*key).filter(|v| !v.is_null()))
}

/// Coerce a JSON value into a finite number, defaulting to 0.
///
/// Strings may carry currency symbols, thousands separators, whitespace and a
/// percent sign, e.g. `"$1,234.50"` or `" -3.2 % "`.
pub fn coerce_number(value: Option<&Value>) -> f64 {
    match value {
        Some(Value::Number(n)) => n.as_f64().filter(|v| v.is_finite()).unwrap_or(0.0),
        Some(Value::String(s)) => parse_numeric_str(s).unwrap_or(0.0),
        _ => 0.0,
    }
}

fn parse_numeric_str(s: &str) -> Option<f64> {
    let cleaned: String = s
        .chars()
        .filter(|c| !matches!(c, '$' | '€' | '£' | '¥' | ',' | '%') && !c.is_whitespace())
        .collect();
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Display text of a scalar value; containers and absent values become empty.
fn text_of(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => match n.as_i64() {
            Some(i) => i.to_string(),
            None => n.to_string(),
        },
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

/// Records of a list resource: a bare array, or an array under one wrapper key.
fn record_list<'a>(raw: &'a Value, wrappers: &[&str]) -> &'a [Value] {
    match raw {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => wrappers
            .iter()
            .find_map(|key| obj.get(*key).and_then(Value::as_array))
            .map(Vec::as_slice)
            .unwrap_or(&[]),
        _ => &[],
    }
}

// ─────────────────────────────────────────────────────────────────
// Equity history
// ─────────────────────────────────────────────────────────────────

/// Normalized contents of `account_history.json`
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AccountHistory {
    pub points: Vec<EquityPoint>,
    pub last_updated: Option<String>,
}

/// Pair timestamps with values by index, truncating to the shorter array.
///
/// A timestamp that can't be parsed takes the previous valid one (the first
/// valid one if it leads the series, 0 if none is valid) rather than dropping
/// the pair, so output index `i` always corresponds to input index `i`.
pub fn to_pairs(timestamps: &[Value], values: &[Value]) -> Vec<EquityPoint> {
    let parsed: Vec<Option<i64>> = timestamps
        .iter()
        .take(values.len())
        .map(timestamp_ms)
        .collect();
    let mut last_valid = parsed.iter().flatten().next().copied().unwrap_or(0);

    parsed
        .into_iter()
        .zip(values)
        .map(|(ts, value)| {
            let ts = ts.unwrap_or(last_valid);
            last_valid = ts;
            EquityPoint::new(ts, coerce_number(Some(value)))
        })
        .collect()
}

/// Place values one `SYNTHETIC_INTERVAL_MS` apart, the last one at `now_ms`.
pub fn synthesize_timestamps(values: &[Value], now_ms: i64) -> Vec<EquityPoint> {
    let n = values.len() as i64;
    values
        .iter()
        .enumerate()
        .map(|(i, value)| {
            let steps_back = n - 1 - i as i64;
            EquityPoint::new(
                now_ms - steps_back * SYNTHETIC_INTERVAL_MS,
                coerce_number(Some(value)),
            )
        })
        .collect()
}

/// Normalize `{ timestamps, values, last_updated? }`.
pub fn normalize_account_history(raw: &Value, now_ms: i64) -> AccountHistory {
    let Some(obj) = raw.as_object() else {
        return AccountHistory::default();
    };

    let values = obj
        .get("values")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[]);
    let timestamps = obj.get("timestamps").and_then(Value::as_array);

    let points = match timestamps {
        Some(ts) => to_pairs(ts, values),
        None => synthesize_timestamps(values, now_ms),
    };

    let last_updated = obj
        .get("last_updated")
        .map(|v| text_of(Some(v)))
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            timestamps
                .and_then(|ts| ts.last())
                .map(|v| text_of(Some(v)))
                .filter(|s| !s.is_empty())
        });

    AccountHistory {
        points,
        last_updated,
    }
}

// ─────────────────────────────────────────────────────────────────
// Trades
// ─────────────────────────────────────────────────────────────────

/// Resolve every canonical trade field from its alias list.
pub fn normalize_trade(obj: &Map<String, Value>) -> Trade {
    let number = |aliases: &[&str]| coerce_number(first_present(obj, aliases));
    let text = |aliases: &[&str]| text_of(first_present(obj, aliases)).trim().to_string();

    Trade {
        symbol: text(SYMBOL_ALIASES),
        side: Side::parse(&text(SIDE_ALIASES)),
        qty: number(QTY_ALIASES).abs(),
        entry_price: number(ENTRY_PRICE_ALIASES).abs(),
        close_price: number(CLOSE_PRICE_ALIASES).abs(),
        close_time: text(CLOSE_TIME_ALIASES),
        pnl: number(PNL_ALIASES),
        pnl_percent: number(PNL_PERCENT_ALIASES),
        duration: text(DURATION_ALIASES),
    }
}

/// Normalize `trades.json`. Elements that aren't objects are skipped.
pub fn normalize_trades(raw: &Value) -> Vec<Trade> {
    record_list(raw, TRADE_WRAPPERS)
        .iter()
        .filter_map(Value::as_object)
        .map(normalize_trade)
        .collect()
}

// ─────────────────────────────────────────────────────────────────
// AI logs
// ─────────────────────────────────────────────────────────────────

/// Sort key of a log time: epoch ms, or 0 when unparseable.
pub fn log_sort_key(time: &str) -> i64 {
    parse_time_str(time).unwrap_or(0)
}

fn normalize_log_entry(obj: &Map<String, Value>) -> AiLogEntry {
    AiLogEntry {
        time: text_of(first_present(obj, LOG_TIME_ALIASES)),
        analysis: text_of(first_present(obj, LOG_ANALYSIS_ALIASES)),
    }
}

fn append_analysis(target: &mut String, part: &str) {
    if part.is_empty() {
        return;
    }
    if !target.is_empty() {
        target.push_str("\n\n");
    }
    target.push_str(part);
}

/// Merge entries with identical `time` strings, then sort newest first.
///
/// Merged analysis keeps first-occurrence order. The sort is stable, so
/// applying this to its own output changes nothing.
pub fn merge_and_sort_logs(entries: Vec<AiLogEntry>) -> Vec<AiLogEntry> {
    let mut merged: Vec<AiLogEntry> = Vec::with_capacity(entries.len());
    let mut by_time: HashMap<String, usize> = HashMap::new();

    for entry in entries {
        match by_time.get(&entry.time) {
            Some(&idx) => append_analysis(&mut merged[idx].analysis, &entry.analysis),
            None => {
                by_time.insert(entry.time.clone(), merged.len());
                merged.push(entry);
            }
        }
    }

    merged.sort_by_key(|e| std::cmp::Reverse(log_sort_key(&e.time)));
    merged
}

/// Normalize `ai_logs.json`.
pub fn normalize_ai_logs(raw: &Value) -> Vec<AiLogEntry> {
    let entries = record_list(raw, LOG_WRAPPERS)
        .iter()
        .filter_map(Value::as_object)
        .map(normalize_log_entry)
        .collect();
    merge_and_sort_logs(entries)
}
