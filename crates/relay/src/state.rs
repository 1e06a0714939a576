// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use marshal::message::RelayMessage;
use marshal::position::Position;
use tokio::sync::{broadcast, RwLock};
use tokio_util::sync::CancellationToken;

use crate::config::RelayConfig;

/// Shared relay state.
pub struct RelayState {
    pub config: RelayConfig,
    pub shutdown: CancellationToken,
    /// Serialized [`RelayMessage`]s fanned out to every WebSocket client.
    tx: broadcast::Sender<String>,
    last_position: RwLock<Option<Position>>,
    clients: AtomicUsize,
}

impl RelayState {
    pub fn new(config: RelayConfig, shutdown: CancellationToken) -> Self {
        let (tx, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            config,
            shutdown,
            tx,
            last_position: RwLock::new(None),
            clients: AtomicUsize::new(0),
        }
    }

    /// Remember `position` and broadcast it. Returns how many clients it
    /// was queued for.
    ///
    /// The write guard is held across the send, so broadcast order matches
    /// the order in which `last_position` was written.
    pub async fn publish(&self, position: Position) -> usize {
        let mut last = self.last_position.write().await;
        *last = Some(position);
        let text = RelayMessage::position(position).to_json();
        // No subscribers is not an error.
        self.tx.send(text).unwrap_or(0)
    }

    /// Subscribe and read the last position as one step.
    ///
    /// Any publish lands either in the returned position or in the
    /// receiver, never both and never neither.
    pub async fn subscribe_with_last(&self) -> (broadcast::Receiver<String>, Option<Position>) {
        let last = self.last_position.read().await;
        (self.tx.subscribe(), *last)
    }

    pub async fn last_position(&self) -> Option<Position> {
        *self.last_position.read().await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<String> {
        self.tx.subscribe()
    }

    pub fn client_count(&self) -> usize {
        self.clients.load(Ordering::Relaxed)
    }
}

/// Counts a connected WebSocket client for as long as it is alive.
pub struct ClientGuard {
    state: Arc<RelayState>,
}

impl ClientGuard {
    pub fn register(state: &Arc<RelayState>) -> Self {
        let count = state.clients.fetch_add(1, Ordering::Relaxed) + 1;
        tracing::info!(clients = count, "websocket client connected");
        Self { state: Arc::clone(state) }
    }
}

impl Drop for ClientGuard {
    fn drop(&mut self) {
        let count = self.state.clients.fetch_sub(1, Ordering::Relaxed).saturating_sub(1);
        tracing::info!(clients = count, "websocket client disconnected");
    }
}

#[cfg(test)]
#[path = "state_tests.rs"]
mod tests;
