//! Application state
//!
//! Holds the latest published snapshot. Refresh cycles may overlap, so every
//! cycle is stamped with a generation when it starts and a result is only
//! published if nothing newer has been published already.

use crate::types::{Resource, Snapshot};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, RwLock};
use tracing::debug;

/// Outcome of one refresh cycle, kept for `/api/health`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CycleReport {
    pub generation: u64,
    pub started_at: i64,
    pub finished_at: i64,
    /// Resource and error text for every fetch that failed
    pub failures: Vec<ResourceFailure>,
    /// False when a newer cycle had already published
    pub published: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceFailure {
    pub resource: Resource,
    pub error: String,
}

#[derive(Debug)]
pub struct AppState {
    snapshot: RwLock<Arc<Snapshot>>,
    last_report: RwLock<Option<CycleReport>>,
    next_generation: AtomicU64,
    published_tx: watch::Sender<u64>,
}

impl Default for AppState {
    fn default() -> Self {
        let (published_tx, _) = watch::channel(0);
        Self {
            snapshot: RwLock::new(Arc::new(Snapshot::default())),
            last_report: RwLock::new(None),
            next_generation: AtomicU64::new(1),
            published_tx,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve the generation for a cycle that is about to start
    pub fn begin_cycle(&self) -> u64 {
        self.next_generation.fetch_add(1, Ordering::SeqCst)
    }

    /// Current snapshot. Cheap: clones the `Arc`, not the data.
    pub async fn snapshot(&self) -> Arc<Snapshot> {
        self.snapshot.read().await.clone()
    }

    /// Replace the snapshot if `snapshot.generation` is newer than the
    /// published one. Returns whether it was published.
    pub async fn publish(&self, snapshot: Snapshot) -> bool {
        let generation = snapshot.generation;
        let mut current = self.snapshot.write().await;
        if generation <= current.generation {
            debug!(
                generation,
                published = current.generation,
                "Discarding stale snapshot"
            );
            return false;
        }
        *current = Arc::new(snapshot);
        drop(current);

        self.published_tx.send_replace(generation);
        true
    }

    /// Record the report unless a newer cycle already reported
    pub async fn record_report(&self, report: CycleReport) {
        let mut last = self.last_report.write().await;
        let newer = last
            .as_ref()
            .map_or(true, |prev| report.generation >= prev.generation);
        if newer {
            *last = Some(report);
        }
    }

    pub async fn last_report(&self) -> Option<CycleReport> {
        self.last_report.read().await.clone()
    }

    /// Receives the generation of every published snapshot
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.published_tx.subscribe()
    }
}
