// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::udp::{Target, DEFAULT_HOST, DEFAULT_SEQUENCE_PORT, DEFAULT_UDP_PORT};
use crate::ws::DEFAULT_WS_URL;

/// Connectivity probes for the marshal UDP and WebSocket services.
#[derive(Debug, Parser)]
#[command(name = "marshal", version, about)]
pub struct Config {
    /// Log format (json or text).
    #[arg(long, global = true, env = "MARSHAL_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, global = true, env = "MARSHAL_LOG_LEVEL", default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send 0.5 then 0.8 over UDP, one second apart.
    Once(OnceArgs),
    /// Send 0.1 through 0.9 over UDP, 200ms apart.
    Sequence(SequenceArgs),
    /// Probe the WebSocket server and the UDP listener once each.
    Check(CheckArgs),
    /// Stay connected to the WebSocket server and log every message.
    Listen(ListenArgs),
    /// Send a position, a sweep, or positions typed on stdin.
    Send(SendArgs),
}

/// UDP destination shared by the fixed-port subcommands.
#[derive(Debug, Clone, Args)]
pub struct UdpArgs {
    /// Destination host.
    #[arg(long, env = "MARSHAL_HOST", default_value = DEFAULT_HOST)]
    pub host: String,

    /// Destination UDP port.
    #[arg(long, env = "MARSHAL_UDP_PORT", default_value_t = DEFAULT_UDP_PORT)]
    pub udp_port: u16,
}

impl UdpArgs {
    pub fn target(&self) -> Target {
        Target::new(self.host.clone(), self.udp_port)
    }
}

#[derive(Debug, Clone, Args)]
pub struct WsArgs {
    /// WebSocket server URL.
    #[arg(long, env = "MARSHAL_WS_URL", default_value = DEFAULT_WS_URL)]
    pub ws_url: String,
}

#[derive(Debug, Clone, Args)]
pub struct OnceArgs {
    #[command(flatten)]
    pub udp: UdpArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SequenceArgs {
    /// Destination UDP port.
    #[arg(default_value_t = DEFAULT_SEQUENCE_PORT)]
    pub port: u16,

    /// Destination host.
    #[arg(long, env = "MARSHAL_HOST", default_value = DEFAULT_HOST)]
    pub host: String,
}

impl SequenceArgs {
    pub fn target(&self) -> Target {
        Target::new(self.host.clone(), self.port)
    }
}

#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    #[command(flatten)]
    pub udp: UdpArgs,

    #[command(flatten)]
    pub ws: WsArgs,

    /// Give up waiting for a WebSocket message after this many milliseconds.
    /// Waits forever when unset.
    #[arg(long, env = "MARSHAL_CHECK_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,
}

impl CheckArgs {
    pub fn receive_timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }
}

#[derive(Debug, Clone, Args)]
pub struct ListenArgs {
    #[command(flatten)]
    pub ws: WsArgs,
}

#[derive(Debug, Clone, Args)]
pub struct SendArgs {
    #[command(flatten)]
    pub udp: UdpArgs,

    /// Position to send, between 0 and 1.
    #[arg(conflicts_with_all = ["sweep", "interactive"])]
    pub value: Option<String>,

    /// Send 0 through 1 in steps of 0.1.
    #[arg(long, conflicts_with = "interactive")]
    pub sweep: bool,

    /// Read positions from stdin (`test` runs a sweep, `quit` exits).
    #[arg(long)]
    pub interactive: bool,

    /// Delay between sweep steps in milliseconds.
    #[arg(long, default_value_t = 1000)]
    pub interval_ms: u64,
}

impl SendArgs {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

impl Config {
    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        match self.log_format.as_str() {
            "json" | "text" => {}
            other => anyhow::bail!("invalid log format: {other} (expected json or text)"),
        }

        match &self.command {
            Command::Check(args) => validate_ws_url(&args.ws.ws_url)?,
            Command::Listen(args) => validate_ws_url(&args.ws.ws_url)?,
            Command::Send(args) => {
                if args.value.is_none() && !args.sweep && !args.interactive {
                    anyhow::bail!("send requires a value, --sweep, or --interactive");
                }
            }
            Command::Once(_) | Command::Sequence(_) => {}
        }

        Ok(())
    }
}

fn validate_ws_url(url: &str) -> anyhow::Result<()> {
    if url.starts_with("ws://") || url.starts_with("wss://") {
        Ok(())
    } else {
        anyhow::bail!("--ws-url must start with ws:// or wss://, got {url}")
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
