// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `marshal once` — send `0.5` then `0.8` to the UDP listener.

use crate::config::OnceArgs;
use crate::udp::{send_schedule, Schedule, UdpSender};

/// Socket errors propagate to the caller.
pub async fn run(args: &OnceArgs) -> anyhow::Result<()> {
    let target = args.udp.target();
    let sender = UdpSender::bind(&target).await?;

    println!("Sending UDP data to {target}");
    send_schedule(&sender, &Schedule::single_probe(), |payload| {
        println!("Sending UDP: {payload}");
    })
    .await?;
    drop(sender);

    println!("Test complete");
    Ok(())
}
