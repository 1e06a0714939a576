// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test infrastructure: loopback UDP capture, a scripted WebSocket
//! server, and assertion helpers.

use std::net::SocketAddr;
use std::time::{Duration, Instant};

use futures_util::{SinkExt, StreamExt};
use tokio::net::{TcpListener, UdpSocket};
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;

/// A datagram captured by [`UdpCapture`].
#[derive(Debug, Clone)]
pub struct Datagram {
    pub payload: String,
    pub at: Instant,
}

/// UDP listener on `127.0.0.1:0` that records every datagram it receives.
pub struct UdpCapture {
    addr: SocketAddr,
    rx: mpsc::UnboundedReceiver<Datagram>,
    handle: tokio::task::JoinHandle<()>,
}

impl UdpCapture {
    pub async fn bind() -> anyhow::Result<Self> {
        let socket = UdpSocket::bind("127.0.0.1:0").await?;
        let addr = socket.local_addr()?;
        let (tx, rx) = mpsc::unbounded_channel();
        let handle = tokio::spawn(async move {
            let mut buf = [0u8; 1024];
            while let Ok((len, _)) = socket.recv_from(&mut buf).await {
                let payload = String::from_utf8_lossy(&buf[..len]).into_owned();
                if tx.send(Datagram { payload, at: Instant::now() }).is_err() {
                    break;
                }
            }
        });
        Ok(Self { addr, rx, handle })
    }

    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Next datagram, or an error after `timeout`.
    pub async fn recv(&mut self, timeout: Duration) -> anyhow::Result<Datagram> {
        tokio::time::timeout(timeout, self.rx.recv())
            .await
            .map_err(|_| anyhow::anyhow!("udp recv timeout"))?
            .ok_or_else(|| anyhow::anyhow!("udp capture closed"))
    }

    /// Collect exactly `count` datagrams, each within `timeout` of the last.
    pub async fn recv_n(&mut self, count: usize, timeout: Duration) -> anyhow::Result<Vec<Datagram>> {
        let mut out = Vec::with_capacity(count);
        for _ in 0..count {
            out.push(self.recv(timeout).await?);
        }
        Ok(out)
    }

    /// Datagrams already received, without waiting.
    pub fn drain(&mut self) -> Vec<Datagram> {
        let mut out = Vec::new();
        while let Ok(d) = self.rx.try_recv() {
            out.push(d);
        }
        out
    }
}

impl Drop for UdpCapture {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// What the scripted WebSocket server does with each accepted connection.
#[derive(Debug, Clone)]
pub enum ServerScript {
    /// Send these text frames, then wait for the client to go away.
    Send(Vec<String>),
    /// Send these text frames, then close the connection.
    SendThenClose(Vec<String>),
    /// Send a single binary frame, then wait.
    Binary(Vec<u8>),
}

/// Spawn a WebSocket server on a random port that plays `script` to every
/// client.
///
/// Returns the `ws://` URL and a join handle for the accept loop.
pub async fn spawn_ws_server(
    script: ServerScript,
) -> anyhow::Result<(String, tokio::task::JoinHandle<()>)> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let handle = tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let script = script.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = tokio_tungstenite::accept_async(stream).await else {
                    return;
                };
                let (frames, close) = match script {
                    ServerScript::Send(texts) => {
                        (texts.into_iter().map(|t| Message::Text(t.into())).collect(), false)
                    }
                    ServerScript::SendThenClose(texts) => {
                        (texts.into_iter().map(|t| Message::Text(t.into())).collect(), true)
                    }
                    ServerScript::Binary(bytes) => (vec![Message::Binary(bytes.into())], false),
                };
                for frame in frames {
                    if ws.send(frame).await.is_err() {
                        return;
                    }
                }
                if close {
                    let _ = ws.close(None).await;
                }
                while let Some(Ok(_)) = ws.next().await {}
            });
        }
    });
    Ok((format!("ws://{addr}"), handle))
}

/// A TCP port with nothing listening on it.
pub fn refused_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Assert that `$expr` is `Err` and its message contains `$substr`.
#[macro_export]
macro_rules! assert_err_contains {
    ($expr:expr, $substr:expr) => {{
        let result = $expr;
        let err = result.expect_err(concat!("expected Err for: ", stringify!($expr)));
        let msg = format!("{err:#}");
        assert!(msg.contains($substr), "expected error containing {:?}, got: {msg:?}", $substr);
    }};
}
