//! Refresh cycle
//!
//! fetch (concurrently) -> normalize (independently) -> publish (whole snapshot).
//! A timer drives the loop; the first tick fires immediately.

use crate::fetcher::{fetch_all, DataSource, FetchBatch, FetchError};
use crate::normalize::{normalize_account_history, normalize_ai_logs, normalize_trades};
use crate::state::{AppState, CycleReport, ResourceFailure};
use crate::types::{Resource, Snapshot};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{info, warn};

fn ok_or_record(
    resource: Resource,
    result: Result<Value, FetchError>,
    failures: &mut Vec<ResourceFailure>,
) -> Option<Value> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(%resource, error = %e, "Resource unavailable, showing it empty");
            failures.push(ResourceFailure {
                resource,
                error: e.to_string(),
            });
            None
        }
    }
}

/// Turn one fetch round into a snapshot. A failed resource contributes an
/// empty sequence; the others are unaffected.
pub fn build_snapshot(
    batch: FetchBatch,
    generation: u64,
    now_ms: i64,
) -> (Snapshot, Vec<ResourceFailure>) {
    let mut failures = Vec::new();

    let account = ok_or_record(Resource::AccountHistory, batch.account_history, &mut failures)
        .map(|raw| normalize_account_history(&raw, now_ms))
        .unwrap_or_default();
    let trades = ok_or_record(Resource::Trades, batch.trades, &mut failures)
        .map(|raw| normalize_trades(&raw))
        .unwrap_or_default();
    let ai_logs = ok_or_record(Resource::AiLogs, batch.ai_logs, &mut failures)
        .map(|raw| normalize_ai_logs(&raw))
        .unwrap_or_default();

    let snapshot = Snapshot {
        account_history: account.points,
        last_updated: account.last_updated,
        trades,
        ai_logs,
        generation,
        fetched_at: now_ms,
    };
    (snapshot, failures)
}

/// Run one full cycle against `source` and publish the result.
pub async fn run_cycle(source: &dyn DataSource, state: &AppState) -> CycleReport {
    let generation = state.begin_cycle();
    let started_at = chrono::Utc::now().timestamp_millis();

    let batch = fetch_all(source).await;
    let (snapshot, failures) = build_snapshot(batch, generation, started_at);

    let (points, trades, logs) = (
        snapshot.account_history.len(),
        snapshot.trades.len(),
        snapshot.ai_logs.len(),
    );
    let published = state.publish(snapshot).await;

    if published {
        info!(
            generation,
            points,
            trades,
            logs,
            failed = failures.len(),
            "🔄 Snapshot refreshed"
        );
    } else {
        info!(generation, "Refresh superseded by a newer cycle");
    }

    let report = CycleReport {
        generation,
        started_at,
        finished_at: chrono::Utc::now().timestamp_millis(),
        failures,
        published,
    };
    state.record_report(report.clone()).await;
    report
}

/// Refresh forever. Each tick spawns its own cycle, so a slow cycle never
/// delays the next one; the generation check in `AppState::publish` keeps
/// the newest result.
pub async fn run_refresh_loop(
    source: Arc<dyn DataSource>,
    state: Arc<AppState>,
    interval: Duration,
) {
    info!(source = %source.describe(), every = ?interval, "Starting refresh loop");

    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;
        let source = source.clone();
        let state = state.clone();
        tokio::spawn(async move {
            run_cycle(source.as_ref(), &state).await;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetcher::MockDataSource;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::mpsc;

    fn healthy_payload(resource: Resource) -> Value {
        match resource {
            Resource::AccountHistory => json!({
                "timestamps": ["2024-03-01T10:00:00Z", "2024-03-01T10:01:00Z"],
                "values": [1000, "1,010.5"]
            }),
            Resource::Trades => json!([
                { "symbol": "BTC", "side": "long", "pnl": 12.5 },
                { "symbol": "ETH", "side": "short", "pnl": -3 }
            ]),
            Resource::AiLogs => json!([
                { "time": "2024-03-01 10:00:00", "analysis": "Trend intact" }
            ]),
        }
    }

    fn mock_failing(failing: Option<Resource>) -> MockDataSource {
        let mut source = MockDataSource::new();
        source.expect_fetch().returning(move |resource| {
            if Some(resource) == failing {
                Err(FetchError::Status {
                    resource,
                    status: 500,
                })
            } else {
                Ok(healthy_payload(resource))
            }
        });
        source.expect_describe().return_const("mock".to_string());
        source
    }

    #[tokio::test]
    async fn test_cycle_publishes_all_resources() {
        let state = AppState::new();
        let report = run_cycle(&mock_failing(None), &state).await;

        assert!(report.published);
        assert!(report.failures.is_empty());

        let snapshot = state.snapshot().await;
        assert_eq!(snapshot.generation, report.generation);
        assert_eq!(snapshot.account_history.len(), 2);
        assert_eq!(snapshot.account_history[1].value, 1010.5);
        assert_eq!(snapshot.trades.len(), 2);
        assert_eq!(snapshot.ai_logs.len(), 1);
    }

    #[tokio::test]
    async fn test_http_500_empties_only_that_resource() {
        let state = AppState::new();
        let report = run_cycle(&mock_failing(Some(Resource::Trades)), &state).await;

        assert!(report.published);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].resource, Resource::Trades);
        assert!(report.failures[0].error.contains("500"));

        let snapshot = state.snapshot().await;
        assert!(snapshot.trades.is_empty());
        assert_eq!(snapshot.account_history.len(), 2);
        assert_eq!(snapshot.ai_logs.len(), 1);
    }

    #[tokio::test]
    async fn test_failure_resets_previously_loaded_resource() {
        let state = AppState::new();
        run_cycle(&mock_failing(None), &state).await;
        assert_eq!(state.snapshot().await.ai_logs.len(), 1);

        run_cycle(&mock_failing(Some(Resource::AiLogs)), &state).await;
        let snapshot = state.snapshot().await;
        assert!(snapshot.ai_logs.is_empty());
        assert_eq!(snapshot.trades.len(), 2);
    }

    #[tokio::test]
    async fn test_superseded_cycle_is_not_published() {
        let state = AppState::new();
        state
            .publish(Snapshot {
                generation: 100,
                ..Snapshot::default()
            })
            .await;

        let report = run_cycle(&mock_failing(None), &state).await;
        assert!(!report.published);
        assert_eq!(state.snapshot().await.generation, 100);
        assert!(state.snapshot().await.trades.is_empty());
    }

    #[test]
    fn test_build_snapshot_all_failed_is_empty() {
        let err = |resource: Resource| -> Result<Value, FetchError> {
            Err(FetchError::Status {
                resource,
                status: 503,
            })
        };
        let batch = FetchBatch {
            account_history: err(Resource::AccountHistory),
            trades: err(Resource::Trades),
            ai_logs: err(Resource::AiLogs),
        };
        let (snapshot, failures) = build_snapshot(batch, 4, 1_000);

        assert_eq!(failures.len(), 3);
        assert!(snapshot.account_history.is_empty());
        assert!(snapshot.trades.is_empty());
        assert!(snapshot.ai_logs.is_empty());
        assert_eq!(snapshot.last_updated, None);
        assert_eq!(snapshot.generation, 4);
    }

    // ============================================================================
    // Refresh loop timing
    // ============================================================================

    #[tokio::test(start_paused = true)]
    async fn test_loop_runs_at_startup_then_every_interval() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let mut source = MockDataSource::new();
        source.expect_fetch().returning(move |resource| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(healthy_payload(resource))
        });
        source.expect_describe().return_const("mock".to_string());

        let state = Arc::new(AppState::new());
        let mut published = state.subscribe();
        let started = tokio::time::Instant::now();
        let interval = Duration::from_secs(60);
        let handle = tokio::spawn(run_refresh_loop(Arc::new(source), state.clone(), interval));

        published.changed().await.unwrap();
        let first = *published.borrow_and_update();
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        tokio::time::advance(interval).await;
        published.changed().await.unwrap();
        let second = *published.borrow_and_update();
        assert!(second > first);
        assert_eq!(calls.load(Ordering::SeqCst), 6);
        assert_eq!(state.snapshot().await.generation, second);

        handle.abort();
    }

    /// Announces every fetch, then takes `delay` to answer
    struct SlowSource {
        started: mpsc::UnboundedSender<Resource>,
        delay: Duration,
    }

    #[async_trait]
    impl DataSource for SlowSource {
        async fn fetch(&self, resource: Resource) -> Result<Value, FetchError> {
            let _ = self.started.send(resource);
            tokio::time::sleep(self.delay).await;
            Ok(healthy_payload(resource))
        }

        fn describe(&self) -> String {
            "slow".to_string()
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_next_tick_starts_while_slow_cycle_in_flight() {
        let interval = Duration::from_secs(10);
        let (started_tx, mut started_rx) = mpsc::unbounded_channel();
        let source = SlowSource {
            started: started_tx,
            delay: interval * 6,
        };

        let state = Arc::new(AppState::new());
        let handle = tokio::spawn(run_refresh_loop(Arc::new(source), state.clone(), interval));

        for _ in 0..3 {
            started_rx.recv().await.unwrap();
        }
        assert!(started_rx.try_recv().is_err());

        tokio::time::advance(interval).await;
        for _ in 0..3 {
            started_rx.recv().await.unwrap();
        }
        // Two cycles in flight, neither has published
        assert_eq!(state.snapshot().await.generation, 0);

        let mut published = state.subscribe();
        while *published.borrow_and_update() < 2 {
            published.changed().await.unwrap();
        }
        assert!(state.snapshot().await.generation >= 2);

        handle.abort();
    }
}
