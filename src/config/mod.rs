//! Configuration management for PrismDash
//!
//! Loads from optional config files + environment variables via .env

mod types;

pub use types::*;

use anyhow::{bail, Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub refresh: RefreshConfig,
    pub view: ViewConfig,
    pub dashboard: DashboardConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self> {
        // Load .env file first
        dotenvy::dotenv().ok();

        let config = Self::builder()?
            // Load config file if exists
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            // Override with environment variables (PRISMDASH__*)
            .add_source(Environment::with_prefix("PRISMDASH").separator("__"))
            .build()
            .context("Failed to build configuration")?;

        let app_config: AppConfig = config
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        app_config.validate()?;

        Ok(app_config)
    }

    /// Built-in defaults only, no files or environment
    pub fn defaults() -> Result<Self> {
        let config = Self::builder()?
            .build()
            .context("Failed to build configuration")?;
        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    fn builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let builder = Config::builder()
            // Data defaults
            .set_default("data.location", "./data")?
            .set_default("data.timeout_ms", 10_000)?
            // Refresh defaults
            .set_default("refresh.interval_secs", 60)?
            // View defaults
            .set_default("view.max_trades", 100)?
            .set_default("view.newest_first", true)?
            .set_default("view.max_logs", 50)?
            .set_default("view.quantity_decimals", 4)?
            .set_default("view.y_ticks", 5)?
            // Dashboard defaults
            .set_default("dashboard.bind_addr", "127.0.0.1:8080")?
            .set_default("dashboard.prefs_path", "./prismdash_prefs.json")?
            .set_default("dashboard.bot_name", "PRISM X Bot")?
            // Logging defaults
            .set_default("logging.json", false)?;
        Ok(builder)
    }

    /// Reject values that would make the service misbehave
    pub fn validate(&self) -> Result<()> {
        if self.data.location.trim().is_empty() {
            bail!("data.location must not be empty");
        }
        if self.refresh.interval_secs == 0 {
            bail!("refresh.interval_secs must be at least 1");
        }
        if self.view.quantity_decimals > 12 {
            bail!("view.quantity_decimals must be at most 12");
        }
        Ok(())
    }

    /// Generate a digest of the config for logging
    pub fn digest(&self) -> String {
        format!(
            "data={} every={}s max_trades={} max_logs={} bind={}",
            self.data.location,
            self.refresh.interval_secs,
            self.view.max_trades,
            self.view.max_logs,
            self.dashboard.bind_addr
        )
    }
}

impl std::fmt::Display for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.digest())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::ViewOptions;

    #[test]
    fn test_defaults_deserialize_and_validate() {
        let cfg = AppConfig::defaults().unwrap();
        cfg.validate().unwrap();
        assert_eq!(cfg.data.location, "./data");
        assert_eq!(cfg.refresh.interval_secs, 60);
        assert_eq!(cfg.view.max_trades, 100);
        assert_eq!(cfg.view.max_logs, 50);
        assert!(!cfg.logging.json);
    }

    #[test]
    fn test_view_options_zero_means_uncapped() {
        let mut cfg = AppConfig::defaults().unwrap();
        assert_eq!(cfg.view.to_options(), ViewOptions::default());

        cfg.view.max_trades = 0;
        cfg.view.max_logs = 0;
        let opts = cfg.view.to_options();
        assert_eq!(opts.trade_policy.limit, None);
        assert_eq!(opts.max_logs, None);
    }

    #[test]
    fn test_validate_rejects_zero_interval() {
        let mut cfg = AppConfig::defaults().unwrap();
        cfg.refresh.interval_secs = 0;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_digest_mentions_location() {
        let cfg = AppConfig::defaults().unwrap();
        assert!(cfg.to_string().contains("data=./data"));
    }
}
