// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! WebSocket client side of the probes.
//!
//! [`WsListener`] owns one connection and drives an [`EventHandler`] through
//! open, message, error and close events until the connection ends or the
//! shutdown token fires. It never reconnects.

use std::time::Duration;

use anyhow::Context;
use futures_util::StreamExt;
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::protocol::CloseFrame;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tokio_util::sync::CancellationToken;

use crate::error::ProbeErrorKind;

/// Relay WebSocket endpoint used unless overridden.
pub const DEFAULT_WS_URL: &str = "ws://localhost:8081";

pub type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Perform the WebSocket handshake.
pub async fn connect(url: &str) -> anyhow::Result<WsStream> {
    let (stream, _) = tokio_tungstenite::connect_async(url)
        .await
        .with_context(|| format!("connect {url}"))
        .context(ProbeErrorKind::Connect)?;
    Ok(stream)
}

/// Block until the next data frame and return it as text.
///
/// Binary frames are decoded lossily; control frames are skipped.
pub async fn recv_text(stream: &mut WsStream) -> anyhow::Result<String> {
    loop {
        match stream.next().await {
            Some(Ok(Message::Text(text))) => return Ok(text.to_string()),
            Some(Ok(Message::Binary(bytes))) => {
                return Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            Some(Ok(Message::Close(_))) | None => {
                return Err(anyhow::anyhow!("server closed the connection"))
                    .context(ProbeErrorKind::Closed)
            }
            Some(Ok(_)) => continue,
            Some(Err(e)) => return Err(e).context(ProbeErrorKind::Receive),
        }
    }
}

/// [`recv_text`] bounded by an optional timeout.
pub async fn recv_text_within(
    stream: &mut WsStream,
    timeout: Option<Duration>,
) -> anyhow::Result<String> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, recv_text(stream))
            .await
            .map_err(|_| anyhow::anyhow!("no message within {limit:?}"))
            .context(ProbeErrorKind::Timeout)?,
        None => recv_text(stream).await,
    }
}

/// Close details reported by the peer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloseInfo {
    pub code: u16,
    pub reason: String,
}

impl From<CloseFrame> for CloseInfo {
    fn from(frame: CloseFrame) -> Self {
        Self { code: frame.code.into(), reason: frame.reason.as_str().to_owned() }
    }
}

/// Subscriber for connection lifecycle events.
pub trait EventHandler: Send {
    fn on_open(&mut self, _url: &str) {}

    /// A text frame that parsed as JSON.
    fn on_message(&mut self, message: serde_json::Value);

    fn on_error(&mut self, _error: &anyhow::Error) {}

    /// Called exactly once when the run ends, for any reason.
    fn on_close(&mut self, _info: Option<CloseInfo>) {}
}

/// How a listener run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListenExit {
    /// The shutdown token fired.
    Interrupted,
    /// The peer closed the connection.
    Closed,
    /// Handshake or transport failure.
    Failed,
}

/// Long-running WebSocket listener.
pub struct WsListener {
    url: String,
}

impl WsListener {
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Connect and dispatch events to `handler` until the connection ends or
    /// `shutdown` is cancelled.
    pub async fn run<H: EventHandler>(
        &self,
        handler: &mut H,
        shutdown: CancellationToken,
    ) -> ListenExit {
        let mut stream = tokio::select! {
            _ = shutdown.cancelled() => {
                handler.on_close(None);
                return ListenExit::Interrupted;
            }
            result = connect(&self.url) => match result {
                Ok(stream) => stream,
                Err(e) => {
                    handler.on_error(&e);
                    handler.on_close(None);
                    return ListenExit::Failed;
                }
            }
        };

        tracing::debug!(url = %self.url, "listener connected");
        handler.on_open(&self.url);

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    if let Err(e) = stream.close(None).await {
                        tracing::debug!(err = %e, "close handshake failed");
                    }
                    handler.on_close(None);
                    return ListenExit::Interrupted;
                }
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => {
                            match serde_json::from_str::<serde_json::Value>(&text) {
                                Ok(value) => handler.on_message(value),
                                Err(e) => {
                                    let err = anyhow::Error::new(e)
                                        .context(format!("payload {:?}", text.as_str()))
                                        .context(ProbeErrorKind::Decode);
                                    handler.on_error(&err);
                                }
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            handler.on_close(frame.map(CloseInfo::from));
                            return ListenExit::Closed;
                        }
                        None => {
                            handler.on_close(None);
                            return ListenExit::Closed;
                        }
                        Some(Ok(_)) => {} // Ignore binary, ping, pong.
                        Some(Err(e)) => {
                            let err = anyhow::Error::new(e).context(ProbeErrorKind::Receive);
                            handler.on_error(&err);
                            handler.on_close(None);
                            return ListenExit::Failed;
                        }
                    }
                }
            }
        }
    }
}

#[cfg(test)]
#[path = "ws_tests.rs"]
mod tests;
