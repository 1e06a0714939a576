// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

/// UDP to WebSocket position relay.
#[derive(Debug, Clone, clap::Parser)]
#[command(name = "marshal-relay", version, about)]
pub struct RelayConfig {
    /// Host to bind both listeners on.
    #[arg(long, default_value = "0.0.0.0", env = "MARSHAL_RELAY_HOST")]
    pub host: String,

    /// UDP port that accepts position datagrams.
    #[arg(long, default_value_t = 8888, env = "MARSHAL_RELAY_UDP_PORT")]
    pub udp_port: u16,

    /// Port for WebSocket clients and the HTTP API.
    #[arg(long, default_value_t = 8081, env = "MARSHAL_RELAY_WS_PORT")]
    pub ws_port: u16,

    /// Messages buffered per WebSocket client before it starts skipping.
    #[arg(long, default_value_t = 256, env = "MARSHAL_RELAY_BROADCAST_CAPACITY")]
    pub broadcast_capacity: usize,

    /// Log format (json or text).
    #[arg(long, env = "MARSHAL_LOG_FORMAT", default_value = "text")]
    pub log_format: String,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "MARSHAL_LOG_LEVEL", default_value = "info")]
    pub log_level: String,
}

impl RelayConfig {
    pub fn udp_addr(&self) -> String {
        format!("{}:{}", self.host, self.udp_port)
    }

    pub fn ws_addr(&self) -> String {
        format!("{}:{}", self.host, self.ws_port)
    }

    /// Validate the configuration after parsing.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.broadcast_capacity == 0 {
            anyhow::bail!("--broadcast-capacity must be at least 1");
        }
        match self.log_format.as_str() {
            "json" | "text" => Ok(()),
            other => anyhow::bail!("invalid log format: {other} (expected json or text)"),
        }
    }

    /// Loopback config on ephemeral ports for tests.
    #[doc(hidden)]
    pub fn test() -> Self {
        Self {
            host: "127.0.0.1".into(),
            udp_port: 0,
            ws_port: 0,
            broadcast_capacity: 16,
            log_format: "text".into(),
            log_level: "debug".into(),
        }
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
