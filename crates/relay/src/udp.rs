// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! UDP ingest: one datagram in, at most one position broadcast out.

use std::net::SocketAddr;
use std::sync::Arc;

use marshal::position::Position;
use tokio::net::UdpSocket;

use crate::state::RelayState;

/// Largest datagram read; longer payloads are truncated.
pub const MAX_DATAGRAM: usize = 1024;

/// Spawn the receive loop. It runs until the relay shuts down.
pub fn spawn_udp_listener(
    state: Arc<RelayState>,
    socket: UdpSocket,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            tokio::select! {
                _ = state.shutdown.cancelled() => break,
                result = socket.recv_from(&mut buf) => match result {
                    Ok((len, peer)) => {
                        handle_datagram(&state, &buf[..len], peer).await;
                    }
                    Err(e) => {
                        tracing::warn!(err = %e, "udp receive failed");
                    }
                }
            }
        }
        tracing::debug!("udp listener stopped");
    })
}

/// Validate a datagram and broadcast it if it holds a position.
pub async fn handle_datagram(
    state: &RelayState,
    bytes: &[u8],
    peer: SocketAddr,
) -> Option<Position> {
    let text = String::from_utf8_lossy(bytes);
    tracing::debug!(%peer, payload = ?text.trim(), "udp datagram received");

    match Position::extract(&text) {
        Ok(position) => {
            let clients = state.publish(position).await;
            tracing::info!(%peer, %position, clients, "position broadcast");
            Some(position)
        }
        Err(e) => {
            tracing::warn!(%peer, payload = ?text.trim(), err = %e, "invalid position dropped");
            None
        }
    }
}

#[cfg(test)]
#[path = "udp_tests.rs"]
mod tests;
