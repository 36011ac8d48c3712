//! WebSocket push
//!
//! Tells connected pages when a newer snapshot has been published so they can
//! reload instead of waiting for their own timer.

use super::types::WsMessage;
use super::DashboardContext;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use futures_util::{SinkExt, StreamExt};
use std::time::Duration;

const HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

/// GET /ws
pub async fn websocket_handler(
    ws: WebSocketUpgrade,
    State(ctx): State<DashboardContext>,
) -> Response {
    ws.on_upgrade(move |socket| handle_websocket(socket, ctx))
}

enum Outgoing {
    Text(String),
    Pong(Vec<u8>),
}

fn encode(msg: &WsMessage) -> Option<String> {
    serde_json::to_string(msg).ok()
}

async fn handle_websocket(socket: WebSocket, ctx: DashboardContext) {
    tracing::info!("🖥️ New WebSocket connection");

    let (mut sender, mut receiver) = socket.split();
    let mut published = ctx.state.subscribe();

    // Current generation first, so a page rendered before a publish catches up
    let current = *published.borrow_and_update();
    if let Some(json) = encode(&WsMessage::SnapshotUpdated {
        generation: current,
    }) {
        if sender.send(Message::Text(json)).await.is_err() {
            return;
        }
    }

    let (out_tx, mut out_rx) = tokio::sync::mpsc::channel::<Outgoing>(32);
    let send_task = tokio::spawn(async move {
        while let Some(msg) = out_rx.recv().await {
            let result = match msg {
                Outgoing::Text(text) => sender.send(Message::Text(text)).await,
                Outgoing::Pong(data) => sender.send(Message::Pong(data)).await,
            };
            if result.is_err() {
                break;
            }
        }
    });

    let mut heartbeat = tokio::time::interval(HEARTBEAT_INTERVAL);
    heartbeat.tick().await;

    loop {
        tokio::select! {
            changed = published.changed() => {
                if changed.is_err() {
                    break;
                }
                let generation = *published.borrow_and_update();
                let Some(json) = encode(&WsMessage::SnapshotUpdated { generation }) else {
                    continue;
                };
                if out_tx.send(Outgoing::Text(json)).await.is_err() {
                    break;
                }
            }
            _ = heartbeat.tick() => {
                let Some(json) = encode(&WsMessage::Heartbeat(chrono::Utc::now().timestamp_millis())) else {
                    continue;
                };
                if out_tx.send(Outgoing::Text(json)).await.is_err() {
                    break;
                }
            }
            incoming = receiver.next() => {
                match incoming {
                    Some(Ok(Message::Ping(data))) => {
                        if out_tx.send(Outgoing::Pong(data)).await.is_err() {
                            break;
                        }
                    }
                    Some(Ok(Message::Text(text))) => {
                        tracing::debug!("Received WebSocket message: {}", text);
                    }
                    Some(Ok(Message::Close(_))) | None | Some(Err(_)) => break,
                    _ => {}
                }
            }
        }
    }

    send_task.abort();
    tracing::info!("🖥️ WebSocket connection closed");
}
