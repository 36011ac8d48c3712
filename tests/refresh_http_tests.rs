//! Refresh cycle against a real HTTP data source

#![cfg(feature = "dashboard")]

#[cfg(test)]
mod tests {
    use axum::{http::StatusCode, routing::get, Json, Router};
    use prismdash::fetcher::{fetch_all, DataSource, FetchError, HttpDataSource};
    use prismdash::refresh::run_cycle;
    use prismdash::state::AppState;
    use prismdash::types::Resource;
    use serde_json::json;
    use std::time::Duration;

    // ============================================================================
    // Helpers
    // ============================================================================

    /// Serves account history and AI logs; `trades.json` answers 500.
    async fn spawn_bot_server() -> String {
        let app = Router::new()
            .route(
                "/account_history.json",
                get(|| async {
                    Json(json!({
                        "timestamps": [1_709_287_200_000i64, 1_709_287_260_000i64, 1_709_287_320_000i64],
                        "values": [1000.0, 1012.5, 1008.0],
                        "last_updated": "2024-03-01T10:02:00Z"
                    }))
                }),
            )
            .route(
                "/trades.json",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route(
                "/ai_logs.json",
                get(|| async {
                    Json(json!({
                        "logs": [
                            { "time": "2024-03-01 10:00:00", "analysis": "Momentum fading" },
                            { "time": "2024-03-01 10:05:00", "message": "Reduced exposure" }
                        ]
                    }))
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    // ============================================================================
    // Tests
    // ============================================================================

    #[tokio::test]
    async fn test_server_error_empties_only_trades() {
        let base = spawn_bot_server().await;
        let source = HttpDataSource::new(base, Duration::from_secs(5));
        let state = AppState::new();

        let report = run_cycle(&source, &state).await;
        assert!(report.published);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].resource, Resource::Trades);

        let snapshot = state.snapshot().await;
        assert!(snapshot.trades.is_empty());
        assert_eq!(snapshot.account_history.len(), 3);
        assert_eq!(snapshot.account_history[1].value, 1012.5);
        assert_eq!(snapshot.last_updated.as_deref(), Some("2024-03-01T10:02:00Z"));

        // Newest first
        assert_eq!(snapshot.ai_logs.len(), 2);
        assert_eq!(snapshot.ai_logs[0].analysis, "Reduced exposure");
    }

    #[tokio::test]
    async fn test_status_error_carries_code() {
        let base = spawn_bot_server().await;
        let source = HttpDataSource::new(base, Duration::from_secs(5));

        let batch = fetch_all(&source).await;
        assert!(batch.account_history.is_ok());
        assert!(batch.ai_logs.is_ok());
        match batch.trades {
            Err(FetchError::Status { resource, status }) => {
                assert_eq!(resource, Resource::Trades);
                assert_eq!(status, 500);
            }
            other => panic!("expected status error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let source = HttpDataSource::new(format!("http://{}", addr), Duration::from_secs(2));
        let result = source.fetch(Resource::AiLogs).await;
        assert!(matches!(result, Err(FetchError::Transport { .. })));
    }
}
