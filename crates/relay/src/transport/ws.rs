// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Downstream WebSocket handler for position subscribers.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::IntoResponse;
use futures_util::{SinkExt, StreamExt};
use marshal::message::RelayMessage;
use tokio::sync::broadcast::error::RecvError;

use crate::state::{ClientGuard, RelayState};

/// `GET /` — WebSocket upgrade for a position subscriber.
pub async fn ws_handler(
    State(state): State<Arc<RelayState>>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    ws.on_upgrade(move |socket| handle_ws(socket, state))
}

/// Per-connection WebSocket handler.
///
/// Sends the last known position on connect, then forwards every broadcast.
/// Client messages are read only to notice disconnects.
async fn handle_ws(socket: WebSocket, state: Arc<RelayState>) {
    let _guard = ClientGuard::register(&state);
    let (mut rx, last) = state.subscribe_with_last().await;
    let (mut ws_tx, mut ws_rx) = socket.split();

    if let Some(position) = last {
        let text = RelayMessage::position(position).to_json();
        if ws_tx.send(Message::Text(text.into())).await.is_err() {
            return;
        }
    }

    loop {
        tokio::select! {
            _ = state.shutdown.cancelled() => {
                let _ = ws_tx.send(Message::Close(None)).await;
                break;
            }

            msg = rx.recv() => {
                match msg {
                    Ok(text) => {
                        if ws_tx.send(Message::Text(text.into())).await.is_err() {
                            break;
                        }
                    }
                    Err(RecvError::Lagged(n)) => {
                        tracing::debug!(lagged = n, "websocket client lagged, skipping");
                        continue;
                    }
                    Err(RecvError::Closed) => break,
                }
            }

            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(e)) => {
                        tracing::debug!(err = %e, "websocket client error");
                        break;
                    }
                    _ => {}
                }
            }
        }
    }
}
