// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `marshal check` — one-shot WebSocket and UDP connectivity probe.
//!
//! Each probe makes a single attempt. Failures are printed and folded into
//! the final summary; they never abort the command.

use std::fmt;
use std::time::Duration;

use crate::config::CheckArgs;
use crate::error::ProbeErrorKind;
use crate::udp::{Target, UdpSender};
use crate::ws;

/// Pause after the UDP probe datagram before closing the socket.
const UDP_SETTLE: Duration = Duration::from_millis(500);

/// Pass/fail outcome of both probes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CheckReport {
    pub websocket: bool,
    pub udp: bool,
}

impl fmt::Display for CheckReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Result: WebSocket={}, UDP={}", verdict(self.websocket), verdict(self.udp))
    }
}

fn verdict(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "fail"
    }
}

pub async fn run(args: &CheckArgs) -> CheckReport {
    println!("Testing connections...");

    println!("\n1. Testing WebSocket:");
    let websocket = probe_websocket(&args.ws.ws_url, args.receive_timeout()).await;

    println!("\n2. Testing UDP:");
    let udp = probe_udp(&args.udp.target(), UDP_SETTLE).await;

    let report = CheckReport { websocket, udp };
    println!("\n{report}");
    report
}

/// Connect, wait for one message, close. True only if a message arrived.
pub async fn probe_websocket(url: &str, timeout: Option<Duration>) -> bool {
    let attempt = async {
        let mut stream = ws::connect(url).await?;
        println!("WebSocket connected");

        let message = ws::recv_text_within(&mut stream, timeout).await?;
        println!("Message received: {message}");

        if let Err(e) = stream.close(None).await {
            tracing::debug!(err = %e, "websocket close failed");
        }
        println!("WebSocket connection closed");
        anyhow::Ok(())
    };

    match attempt.await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(kind = ?ProbeErrorKind::of(&e), "websocket probe failed");
            println!("WebSocket error: {e:#}");
            false
        }
    }
}

/// Send a single `0.5` datagram. True if the send succeeded.
pub async fn probe_udp(target: &Target, settle: Duration) -> bool {
    let attempt = async {
        let sender = UdpSender::bind(target).await?;
        println!("Sending UDP data to {target}");
        sender.send_value("0.5").await?;
        tokio::time::sleep(settle).await;
        drop(sender);
        println!("UDP data sent");
        anyhow::Ok(())
    };

    match attempt.await {
        Ok(()) => true,
        Err(e) => {
            tracing::debug!(kind = ?ProbeErrorKind::of(&e), "udp probe failed");
            println!("UDP error: {e:#}");
            false
        }
    }
}

#[cfg(test)]
#[path = "check_tests.rs"]
mod tests;
