//! Tab navigation state
//!
//! Exactly one panel is visible. A deep link (`?tab=`) beats the stored
//! preference, which beats the default.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum Tab {
    #[default]
    Trades,
    AiLogs,
    Performance,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Trades, Tab::AiLogs, Tab::Performance];

    /// Stable id used in URLs, DOM ids and the preference file
    pub fn id(&self) -> &'static str {
        match self {
            Tab::Trades => "trades",
            Tab::AiLogs => "ai-logs",
            Tab::Performance => "performance",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tab::Trades => "Trades",
            Tab::AiLogs => "AI Logs",
            Tab::Performance => "Performance",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        let id = id.trim();
        Tab::ALL.into_iter().find(|t| t.id().eq_ignore_ascii_case(id))
    }
}

impl fmt::Display for Tab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

/// Pick the visible tab. Unknown deep-link ids are ignored.
pub fn resolve_active_tab(deep_link: Option<&str>, stored: Option<Tab>) -> Tab {
    deep_link
        .and_then(Tab::from_id)
        .or(stored)
        .unwrap_or_default()
}
