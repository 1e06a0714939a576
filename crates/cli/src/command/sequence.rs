// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `marshal sequence [PORT]` — send `0.1` through `0.9` over UDP.

use crate::config::SequenceArgs;
use crate::udp::{send_schedule, Schedule, UdpSender};

pub async fn run(args: &SequenceArgs) -> anyhow::Result<()> {
    let target = args.target();
    let sender = UdpSender::bind(&target).await?;

    println!("Sending UDP data to {target}");
    send_schedule(&sender, &Schedule::sequence(), |payload| {
        println!("Sending UDP: {payload}");
    })
    .await?;
    drop(sender);

    println!("Test complete");
    Ok(())
}
