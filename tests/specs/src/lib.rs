// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test harness for end-to-end binary smoke tests.
//!
//! Spawns the real `marshal-relay` binary as a subprocess and drives it with
//! the real `marshal` binary over UDP and WebSocket.

use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::time::Duration;

/// Resolve the path to a compiled workspace binary.
pub fn workspace_binary(name: &str) -> PathBuf {
    let manifest = Path::new(env!("CARGO_MANIFEST_DIR"));
    // tests/specs → tests → workspace root
    let workspace = manifest.parent().and_then(|p| p.parent()).unwrap_or(manifest);
    workspace.join("target").join("debug").join(name)
}

/// Find a free TCP port by binding to :0 then releasing.
pub fn free_port() -> anyhow::Result<u16> {
    let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
    Ok(listener.local_addr()?.port())
}

/// Find a free UDP port by binding to :0 then releasing.
pub fn free_udp_port() -> anyhow::Result<u16> {
    let socket = std::net::UdpSocket::bind("127.0.0.1:0")?;
    Ok(socket.local_addr()?.port())
}

/// Captured result of one `marshal` invocation.
#[derive(Debug)]
pub struct MarshalOutput {
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Spawn the `marshal` binary with `args`, stdout and stderr piped.
pub fn spawn_marshal(args: &[&str]) -> anyhow::Result<tokio::process::Child> {
    let binary = workspace_binary("marshal");
    anyhow::ensure!(binary.exists(), "marshal binary not found at {}", binary.display());

    let child = tokio::process::Command::new(&binary)
        .args(args)
        .env_remove("MARSHAL_HOST")
        .env_remove("MARSHAL_UDP_PORT")
        .env_remove("MARSHAL_WS_URL")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()?;
    Ok(child)
}

/// Deliver SIGINT to a running process.
pub fn interrupt(pid: u32) -> anyhow::Result<()> {
    let status = Command::new("kill").args(["-INT", &pid.to_string()]).status()?;
    anyhow::ensure!(status.success(), "kill -INT {pid} failed: {status}");
    Ok(())
}

/// Run the `marshal` binary to completion with `args`.
pub async fn run_marshal(args: &[&str], timeout: Duration) -> anyhow::Result<MarshalOutput> {
    let child = spawn_marshal(args)?;
    let output = tokio::time::timeout(timeout, child.wait_with_output())
        .await
        .map_err(|_| anyhow::anyhow!("marshal {args:?} did not exit within {timeout:?}"))??;

    Ok(MarshalOutput {
        code: output.status.code(),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
    })
}

/// A running `marshal-relay` process that is killed on drop.
pub struct RelayProcess {
    child: Child,
    udp_port: u16,
    ws_port: u16,
}

impl RelayProcess {
    /// Spawn the relay on free loopback ports.
    pub fn start() -> anyhow::Result<Self> {
        let binary = workspace_binary("marshal-relay");
        anyhow::ensure!(binary.exists(), "marshal-relay binary not found at {}", binary.display());

        let udp_port = free_udp_port()?;
        let ws_port = free_port()?;

        let child = Command::new(&binary)
            .args([
                "--host",
                "127.0.0.1",
                "--udp-port",
                &udp_port.to_string(),
                "--ws-port",
                &ws_port.to_string(),
                "--log-format",
                "text",
                "--log-level",
                "warn",
            ])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()?;

        Ok(Self { child, udp_port, ws_port })
    }

    pub fn udp_port(&self) -> u16 {
        self.udp_port
    }

    /// Base URL for HTTP requests.
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.ws_port)
    }

    /// WebSocket URL.
    pub fn ws_url(&self) -> String {
        format!("ws://127.0.0.1:{}", self.ws_port)
    }

    /// Poll health until responsive.
    pub async fn wait_healthy(&self, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/v1/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("relay did not become healthy within {timeout:?}");
            }
            if let Ok(resp) = client.get(&url).send().await {
                if resp.status().is_success() {
                    return Ok(());
                }
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    /// Poll health until `clients` subscribers are connected.
    pub async fn wait_clients(&self, clients: u64, timeout: Duration) -> anyhow::Result<()> {
        let deadline = tokio::time::Instant::now() + timeout;
        let client = reqwest::Client::new();
        let url = format!("{}/api/v1/health", self.base_url());
        loop {
            if tokio::time::Instant::now() > deadline {
                anyhow::bail!("relay never reported {clients} clients within {timeout:?}");
            }
            let body: serde_json::Value = client.get(&url).send().await?.json().await?;
            if body["clients"].as_u64() == Some(clients) {
                return Ok(());
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }
}

impl Drop for RelayProcess {
    fn drop(&mut self) {
        let _ = self.child.kill();
        let _ = self.child.wait();
    }
}
