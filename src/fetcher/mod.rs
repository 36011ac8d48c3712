//! Fetcher
//!
//! Reads the three dashboard resources from an HTTP base URL or a local data
//! directory. Each resource succeeds or fails on its own.

use crate::config::DataConfig;
use crate::types::Resource;
use async_trait::async_trait;
use serde_json::Value;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

/// Why a single resource could not be read
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("transport error fetching {resource}: {source}")]
    Transport {
        resource: Resource,
        #[source]
        source: reqwest::Error,
    },

    #[error("{resource} returned HTTP {status}")]
    Status { resource: Resource, status: u16 },

    #[error("{resource} body is not valid JSON: {source}")]
    Decode {
        resource: Resource,
        #[source]
        source: serde_json::Error,
    },

    #[error("reading {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Somewhere the dashboard JSON files can be read from
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn fetch(&self, resource: Resource) -> Result<Value, FetchError>;

    /// Human-readable location, for logs
    fn describe(&self) -> String;
}

// ─────────────────────────────────────────────────────────────────
// HTTP
// ─────────────────────────────────────────────────────────────────

/// `<base_url>/<file>?t=<now ms>`; the timestamp defeats intermediate caches.
pub fn cache_busted_url(base_url: &str, file: &str, now_ms: i64) -> String {
    format!("{}/{}?t={}", base_url.trim_end_matches('/'), file, now_ms)
}

pub struct HttpDataSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpDataSource {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_default(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn fetch(&self, resource: Resource) -> Result<Value, FetchError> {
        let url = cache_busted_url(
            &self.base_url,
            resource.file_name(),
            chrono::Utc::now().timestamp_millis(),
        );
        debug!(%resource, %url, "Fetching resource");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|source| FetchError::Transport { resource, source })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                resource,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|source| FetchError::Transport { resource, source })?;
        serde_json::from_slice(&body).map_err(|source| FetchError::Decode { resource, source })
    }

    fn describe(&self) -> String {
        self.base_url.clone()
    }
}

// ─────────────────────────────────────────────────────────────────
// Local directory
// ─────────────────────────────────────────────────────────────────

pub struct DirDataSource {
    dir: PathBuf,
}

impl DirDataSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

#[async_trait]
impl DataSource for DirDataSource {
    async fn fetch(&self, resource: Resource) -> Result<Value, FetchError> {
        let path = self.dir.join(resource.file_name());
        debug!(%resource, path = %path.display(), "Reading resource");

        let bytes = tokio::fs::read(&path).await.map_err(|source| FetchError::Io {
            path: path.display().to_string(),
            source,
        })?;
        serde_json::from_slice(&bytes).map_err(|source| FetchError::Decode { resource, source })
    }

    fn describe(&self) -> String {
        self.dir.display().to_string()
    }
}

/// HTTP for `http(s)://` locations, local directory otherwise.
pub fn data_source_from_config(cfg: &DataConfig) -> Arc<dyn DataSource> {
    let location = cfg.location.trim();
    if location.starts_with("http://") || location.starts_with("https://") {
        Arc::new(HttpDataSource::new(
            location,
            Duration::from_millis(cfg.timeout_ms),
        ))
    } else {
        Arc::new(DirDataSource::new(location))
    }
}

// ─────────────────────────────────────────────────────────────────
// One cycle's worth of fetches
// ─────────────────────────────────────────────────────────────────

/// Raw results of one concurrent fetch round
#[derive(Debug)]
pub struct FetchBatch {
    pub account_history: Result<Value, FetchError>,
    pub trades: Result<Value, FetchError>,
    pub ai_logs: Result<Value, FetchError>,
}

/// Fetch all three resources concurrently. No result affects another.
pub async fn fetch_all(source: &dyn DataSource) -> FetchBatch {
    let (account_history, trades, ai_logs) = tokio::join!(
        source.fetch(Resource::AccountHistory),
        source.fetch(Resource::Trades),
        source.fetch(Resource::AiLogs),
    );
    FetchBatch {
        account_history,
        trades,
        ai_logs,
    }
}
