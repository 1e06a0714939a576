// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Connectionless UDP sender for position payloads.
//!
//! Each call sends exactly one datagram whose bytes are the literal text of
//! the value. Nothing is ever read back.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::Context;
use tokio::net::UdpSocket;

use crate::error::ProbeErrorKind;

/// Host the probes send to unless overridden.
pub const DEFAULT_HOST: &str = "localhost";

/// Port of the relay's UDP listener.
pub const DEFAULT_UDP_PORT: u16 = 8888;

/// Default port for `marshal sequence`.
pub const DEFAULT_SEQUENCE_PORT: u16 = 8889;

/// Destination of a UDP probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub host: String,
    pub port: u16,
}

impl Target {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self { host: host.into(), port }
    }
}

impl Default for Target {
    fn default() -> Self {
        Self::new(DEFAULT_HOST, DEFAULT_UDP_PORT)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

/// One ephemeral UDP socket bound for a single target.
///
/// The socket is closed when the sender is dropped.
pub struct UdpSender {
    socket: UdpSocket,
    dest: SocketAddr,
    target: Target,
}

impl UdpSender {
    /// Resolve `target` and bind a local socket of the matching family.
    ///
    /// IPv4 addresses are preferred so that `localhost` reaches listeners
    /// bound to `127.0.0.1`.
    pub async fn bind(target: &Target) -> anyhow::Result<Self> {
        let dest = resolve(target).await?;
        let local: SocketAddr = if dest.is_ipv4() {
            SocketAddr::from(([0, 0, 0, 0], 0))
        } else {
            SocketAddr::from(([0u16; 8], 0))
        };
        let socket = UdpSocket::bind(local).await.context(ProbeErrorKind::Connect)?;
        tracing::debug!(target = %target, dest = %dest, "udp socket bound");
        Ok(Self { socket, dest, target: target.clone() })
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    /// Resolved destination address.
    pub fn dest(&self) -> SocketAddr {
        self.dest
    }

    /// Send `payload` as a single datagram.
    pub async fn send_value(&self, payload: &str) -> anyhow::Result<usize> {
        let sent = self
            .socket
            .send_to(payload.as_bytes(), self.dest)
            .await
            .context(ProbeErrorKind::Send)?;
        tracing::debug!(dest = %self.dest, payload, bytes = sent, "udp datagram sent");
        Ok(sent)
    }
}

async fn resolve(target: &Target) -> anyhow::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host((target.host.as_str(), target.port))
        .await
        .with_context(|| format!("resolve {target}"))
        .context(ProbeErrorKind::Resolve)?
        .collect();
    addrs
        .iter()
        .find(|a| a.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| anyhow::anyhow!("no addresses for {target}"))
        .context(ProbeErrorKind::Resolve)
}

/// A fixed list of values sent with a fixed delay after each one.
#[derive(Debug, Clone, PartialEq)]
pub struct Schedule {
    pub values: Vec<f64>,
    pub interval: Duration,
}

impl Schedule {
    /// `0.5` then `0.8`, one second apart.
    pub fn single_probe() -> Self {
        Self { values: vec![0.5, 0.8], interval: Duration::from_secs(1) }
    }

    /// `0.1` through `0.9`, 200ms apart.
    pub fn sequence() -> Self {
        Self { values: tenths(1..=9), interval: Duration::from_millis(200) }
    }

    /// `0` through `1` in steps of `0.1`.
    pub fn sweep(interval: Duration) -> Self {
        Self { values: tenths(0..=10), interval }
    }

    /// Datagram payloads in send order.
    pub fn payloads(&self) -> impl Iterator<Item = String> + '_ {
        self.values.iter().map(|v| v.to_string())
    }
}

// k / 10.0 rounds to the same double as the literal, so `to_string` yields
// exactly one decimal.
fn tenths(range: std::ops::RangeInclusive<u32>) -> Vec<f64> {
    range.map(|k| f64::from(k) / 10.0).collect()
}

/// Send every value of `schedule`, sleeping `interval` after each send.
///
/// `on_send` is called with each payload just before it goes out.
pub async fn send_schedule<F>(
    sender: &UdpSender,
    schedule: &Schedule,
    mut on_send: F,
) -> anyhow::Result<()>
where
    F: FnMut(&str),
{
    for payload in schedule.payloads() {
        on_send(&payload);
        sender.send_value(&payload).await?;
        tokio::time::sleep(schedule.interval).await;
    }
    Ok(())
}

#[cfg(test)]
#[path = "udp_tests.rs"]
mod tests;
