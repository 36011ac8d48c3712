//! PrismDash Library
//!
//! Polls a trading bot's published JSON (equity history, closed trades,
//! AI commentary), normalizes it into one snapshot and renders a dashboard.

pub mod config;
pub mod fetcher;
pub mod normalize;
pub mod refresh;
pub mod state;
pub mod types;
pub mod view;

#[cfg(feature = "dashboard")]
pub mod dashboard;
