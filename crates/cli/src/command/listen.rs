// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `marshal listen` — print every message from the WebSocket server until
//! interrupted or disconnected.

use tokio_util::sync::CancellationToken;

use crate::config::ListenArgs;
use crate::message::RelayMessage;
use crate::ws::{CloseInfo, EventHandler, ListenExit, WsListener};

/// Prints each lifecycle event as a status line.
#[derive(Debug, Default)]
pub struct ConsoleHandler {
    pub received: usize,
    pub errors: usize,
}

impl ConsoleHandler {
    /// Status lines for one inbound message.
    pub fn describe(message: &serde_json::Value) -> Vec<String> {
        let mut lines = vec![format!("WebSocket received: {message}")];
        if let Some(RelayMessage::Position { value, .. }) = RelayMessage::from_value(message) {
            lines.push(format!("Position: {:.1}%", value * 100.0));
        }
        lines
    }
}

impl EventHandler for ConsoleHandler {
    fn on_open(&mut self, url: &str) {
        tracing::info!(url, "websocket open");
        println!("WebSocket connected");
    }

    fn on_message(&mut self, message: serde_json::Value) {
        self.received += 1;
        for line in Self::describe(&message) {
            println!("{line}");
        }
    }

    fn on_error(&mut self, error: &anyhow::Error) {
        self.errors += 1;
        println!("WebSocket error: {error:#}");
    }

    fn on_close(&mut self, info: Option<CloseInfo>) {
        if let Some(info) = info {
            tracing::info!(code = info.code, reason = %info.reason, "websocket closed by peer");
        }
        println!("WebSocket closed");
    }
}

pub async fn run(args: &ListenArgs, shutdown: CancellationToken) -> ListenExit {
    let listener = WsListener::new(args.ws.ws_url.clone());
    let mut handler = ConsoleHandler::default();

    println!("Connecting to WebSocket...");
    let exit = listener.run(&mut handler, shutdown).await;
    tracing::info!(?exit, received = handler.received, errors = handler.errors, "listener stopped");
    exit
}

#[cfg(test)]
#[path = "listen_tests.rs"]
mod tests;
