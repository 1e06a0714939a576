// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end smoke tests that spawn the real `marshal-relay` binary and
//! drive it with the `marshal` probes.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio_tungstenite::tungstenite::Message;

use marshal::test_support::{spawn_ws_server, ServerScript};
use marshal_specs::{free_udp_port, interrupt, run_marshal, spawn_marshal, RelayProcess};

const TIMEOUT: Duration = Duration::from_secs(10);

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;

async fn next_json(stream: &mut WsStream) -> anyhow::Result<serde_json::Value> {
    loop {
        let msg = tokio::time::timeout(TIMEOUT, stream.next())
            .await?
            .ok_or_else(|| anyhow::anyhow!("ws stream closed"))??;
        if let Message::Text(text) = msg {
            return Ok(serde_json::from_str(&text)?);
        }
    }
}

// -- Relay --------------------------------------------------------------------

#[tokio::test]
async fn relay_health() -> anyhow::Result<()> {
    let relay = RelayProcess::start()?;
    relay.wait_healthy(TIMEOUT).await?;

    let resp: serde_json::Value =
        reqwest::get(format!("{}/api/v1/health", relay.base_url())).await?.json().await?;

    assert_eq!(resp["status"], "running");
    assert_eq!(resp["clients"], 0);
    assert!(resp["last_position"].is_null());
    Ok(())
}

// -- Probes -------------------------------------------------------------------

#[tokio::test]
async fn sequence_reaches_websocket_subscriber() -> anyhow::Result<()> {
    let relay = RelayProcess::start()?;
    relay.wait_healthy(TIMEOUT).await?;

    let (mut ws, _) = tokio_tungstenite::connect_async(relay.ws_url()).await?;
    relay.wait_clients(1, TIMEOUT).await?;

    let port = relay.udp_port().to_string();
    let out = run_marshal(&["sequence", &port, "--host", "127.0.0.1"], TIMEOUT).await?;
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert!(out.stdout.contains("Test complete"));

    for expected in [0.1, 0.2, 0.3, 0.4, 0.5, 0.6, 0.7, 0.8, 0.9] {
        let msg = next_json(&mut ws).await?;
        assert_eq!(msg["type"], "position");
        assert_eq!(msg["value"], expected);
    }
    Ok(())
}

#[tokio::test]
async fn once_leaves_last_position_at_point_eight() -> anyhow::Result<()> {
    let relay = RelayProcess::start()?;
    relay.wait_healthy(TIMEOUT).await?;

    let port = relay.udp_port().to_string();
    let out =
        run_marshal(&["once", "--host", "127.0.0.1", "--udp-port", &port], TIMEOUT).await?;
    assert_eq!(out.code, Some(0), "stderr: {}", out.stderr);
    assert!(out.stdout.contains("Sending UDP: 0.5"));
    assert!(out.stdout.contains("Sending UDP: 0.8"));

    let resp: serde_json::Value =
        reqwest::get(format!("{}/api/v1/health", relay.base_url())).await?.json().await?;
    assert_eq!(resp["last_position"], 0.8);
    Ok(())
}

#[tokio::test]
async fn check_against_relay_reports_both_ok() -> anyhow::Result<()> {
    let relay = RelayProcess::start()?;
    relay.wait_healthy(TIMEOUT).await?;

    // Seed a position so the WebSocket probe gets a message on connect.
    let port = relay.udp_port().to_string();
    let seeded = run_marshal(
        &["send", "0.3", "--host", "127.0.0.1", "--udp-port", &port],
        TIMEOUT,
    )
    .await?;
    assert_eq!(seeded.code, Some(0), "stderr: {}", seeded.stderr);
    tokio::time::sleep(Duration::from_millis(200)).await;

    let out = run_marshal(
        &[
            "check",
            "--host",
            "127.0.0.1",
            "--udp-port",
            &port,
            "--ws-url",
            &relay.ws_url(),
            "--timeout-ms",
            "5000",
        ],
        TIMEOUT,
    )
    .await?;
    assert_eq!(out.code, Some(0));
    assert!(out.stdout.contains("Result: WebSocket=ok, UDP=ok"), "stdout: {}", out.stdout);
    Ok(())
}

#[tokio::test]
async fn check_without_server_still_exits_zero() -> anyhow::Result<()> {
    let ws_port = marshal_specs::free_port()?;
    let udp_port = free_udp_port()?.to_string();
    let out = run_marshal(
        &[
            "check",
            "--host",
            "127.0.0.1",
            "--udp-port",
            &udp_port,
            "--ws-url",
            &format!("ws://127.0.0.1:{ws_port}"),
        ],
        TIMEOUT,
    )
    .await?;
    assert_eq!(out.code, Some(0));
    assert!(out.stdout.contains("WebSocket=fail"), "stdout: {}", out.stdout);
    Ok(())
}

#[tokio::test]
async fn send_rejects_out_of_range_with_usage_code() -> anyhow::Result<()> {
    let udp_port = free_udp_port()?.to_string();
    let out = run_marshal(&["send", "1.5", "--udp-port", &udp_port], TIMEOUT).await?;
    assert_eq!(out.code, Some(2));
    assert!(out.stderr.contains("between 0 and 1"), "stderr: {}", out.stderr);
    Ok(())
}

#[tokio::test]
async fn sigint_stops_check_blocked_on_silent_server() -> anyhow::Result<()> {
    let (url, _server) = spawn_ws_server(ServerScript::Send(vec![])).await?;
    let udp_port = free_udp_port()?.to_string();
    let mut child = spawn_marshal(&[
        "check",
        "--host",
        "127.0.0.1",
        "--udp-port",
        &udp_port,
        "--ws-url",
        &url,
    ])?;

    // Wait until the receive is in progress.
    let stdout = child.stdout.take().ok_or_else(|| anyhow::anyhow!("stdout not piped"))?;
    let mut lines = BufReader::new(stdout).lines();
    tokio::time::timeout(TIMEOUT, async {
        while let Some(line) = lines.next_line().await? {
            if line.contains("WebSocket connected") {
                return Ok(());
            }
        }
        anyhow::bail!("marshal check exited before connecting")
    })
    .await??;

    let pid = child.id().ok_or_else(|| anyhow::anyhow!("marshal already exited"))?;
    interrupt(pid)?;

    let status = tokio::time::timeout(Duration::from_secs(1), child.wait()).await??;
    assert_eq!(status.code(), Some(130));
    Ok(())
}
