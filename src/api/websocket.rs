use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::IntoResponse,
};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::time::{interval, Duration};

use super::rest::AppState;

const UPDATE_INTERVAL_SECS: u64 = 30;
const HEARTBEAT_INTERVAL_SECS: u64 = 10;
const CHUNK_SIZE: usize = 50;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut update_ticker = interval(Duration::from_secs(UPDATE_INTERVAL_SECS));
    let mut heartbeat_ticker = interval(Duration::from_secs(HEARTBEAT_INTERVAL_SECS));

    loop {
        tokio::select! {
            _ = update_ticker.tick() => {
                let pools = state.cache.latest_pool_prices();

                // Send in chunks so a big snapshot does not become one
                // giant frame
                for chunk in pools.chunks(CHUNK_SIZE) {
                    let msg = serde_json::json!({
                        "type": "pool_update",
                        "count": chunk.len(),
                        "data": chunk,
                    });

                    match tokio::time::timeout(
                        Duration::from_secs(5),
                        sender.send(Message::Text(msg.to_string()))
                    ).await {
                        Ok(Ok(_)) => {},
                        _ => return,
                    }
                }

                let prices = state.cache.latest_usd_prices();
                if !prices.is_empty() {
                    let msg = serde_json::json!({
                        "type": "usd_prices",
                        "count": prices.len(),
                        "data": prices,
                    });
                    if sender.send(Message::Text(msg.to_string())).await.is_err() {
                        return;
                    }
                }
            }

            _ = heartbeat_ticker.tick() => {
                if sender.send(Message::Ping(vec![])).await.is_err() {
                    return;
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(cmd) = serde_json::from_str::<serde_json::Value>(&text) {
                            if cmd["type"] == "ping" {
                                let _ = sender.send(Message::Text(r#"{"type":"pong"}"#.to_string())).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => return,
                    Some(Ok(Message::Pong(_))) => {},
                    _ => {}
                }
            }
        }
    }
}
