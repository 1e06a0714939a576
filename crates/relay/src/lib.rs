// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Marshal relay: accepts plain-text positions over UDP and pushes them to
//! WebSocket subscribers as JSON.

pub mod config;
pub mod error;
pub mod state;
pub mod transport;
pub mod udp;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::{TcpListener, UdpSocket};
use tokio_util::sync::CancellationToken;

use crate::config::RelayConfig;
use crate::state::RelayState;
use crate::transport::build_router;
use crate::udp::spawn_udp_listener;

/// A relay with both sockets bound but not yet serving.
pub struct Relay {
    state: Arc<RelayState>,
    udp: UdpSocket,
    listener: TcpListener,
}

impl Relay {
    pub async fn bind(config: RelayConfig, shutdown: CancellationToken) -> anyhow::Result<Self> {
        let udp = UdpSocket::bind(config.udp_addr())
            .await
            .with_context(|| format!("bind udp {}", config.udp_addr()))?;
        let listener = TcpListener::bind(config.ws_addr())
            .await
            .with_context(|| format!("bind websocket {}", config.ws_addr()))?;
        let state = Arc::new(RelayState::new(config, shutdown));
        Ok(Self { state, udp, listener })
    }

    pub fn udp_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.udp.local_addr()?)
    }

    pub fn ws_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    pub fn state(&self) -> Arc<RelayState> {
        Arc::clone(&self.state)
    }

    /// Serve until the shutdown token is cancelled.
    pub async fn serve(self) -> anyhow::Result<()> {
        let Self { state, udp, listener } = self;
        let shutdown = state.shutdown.clone();

        tracing::info!("udp listening on {}", udp.local_addr()?);
        tracing::info!("websocket listening on ws://{}", listener.local_addr()?);

        let udp_task = spawn_udp_listener(Arc::clone(&state), udp);
        let router = build_router(state);
        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown.clone().cancelled_owned())
            .await;

        shutdown.cancel();
        if let Err(e) = udp_task.await {
            tracing::debug!(err = %e, "udp task join failed");
        }
        served?;
        Ok(())
    }
}

/// Run the relay until shutdown.
pub async fn run(config: RelayConfig, shutdown: CancellationToken) -> anyhow::Result<()> {
    Relay::bind(config, shutdown).await?.serve().await
}
