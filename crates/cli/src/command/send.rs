// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `marshal send` — drive the display position by hand.
//!
//! Sends one validated position, a `0..1` sweep, or reads positions line by
//! line from stdin.

use std::time::Duration;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::config::SendArgs;
use crate::position::Position;
use crate::udp::{send_schedule, Schedule, UdpSender};

/// Run the `marshal send` subcommand. Returns a process exit code.
pub async fn run(args: &SendArgs) -> anyhow::Result<i32> {
    if let Some(ref raw) = args.value {
        let position = match raw.parse::<Position>() {
            Ok(p) => p,
            Err(e) => {
                eprintln!("error: invalid position: {e}");
                return Ok(2);
            }
        };
        let sender = UdpSender::bind(&args.udp.target()).await?;
        send_position(&sender, position).await?;
        return Ok(0);
    }

    let sender = UdpSender::bind(&args.udp.target()).await?;
    if args.sweep {
        sweep(&sender, args.interval()).await?;
        return Ok(0);
    }

    if args.interactive {
        println!("Interactive UDP control");
        println!("Enter values between 0 and 1 to set the position");
        println!("Enter \"test\" for an automatic sweep");
        println!("Enter \"quit\" to exit");
        interactive(BufReader::new(tokio::io::stdin()), &sender, args.interval()).await?;
        return Ok(0);
    }

    eprintln!("usage: marshal send <VALUE> | --sweep | --interactive");
    Ok(2)
}

pub async fn send_position(sender: &UdpSender, position: Position) -> anyhow::Result<()> {
    sender.send_value(&position.to_string()).await?;
    println!("Position sent: {position} ({:.1}%)", position.percent());
    Ok(())
}

pub async fn sweep(sender: &UdpSender, interval: Duration) -> anyhow::Result<()> {
    println!("Sending positions 0 to 1 in steps of 0.1");
    send_schedule(sender, &Schedule::sweep(interval), |payload| {
        println!("Position sent: {payload}");
    })
    .await?;
    println!("Sweep complete");
    Ok(())
}

/// One parsed line of interactive input.
#[derive(Debug, Clone, PartialEq)]
pub enum InteractiveCommand {
    Quit,
    Sweep,
    Send(Position),
    Invalid(String),
    Empty,
}

impl InteractiveCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => Self::Empty,
            "quit" => Self::Quit,
            "test" => Self::Sweep,
            other => match other.parse::<Position>() {
                Ok(p) => Self::Send(p),
                Err(_) => Self::Invalid(other.to_owned()),
            },
        }
    }
}

/// Read commands from `reader` until `quit` or end of input.
///
/// Returns the number of positions sent.
pub async fn interactive<R>(
    reader: R,
    sender: &UdpSender,
    interval: Duration,
) -> anyhow::Result<usize>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = reader.lines();
    let mut sent = 0;

    while let Some(line) = lines.next_line().await? {
        match InteractiveCommand::parse(&line) {
            InteractiveCommand::Quit => break,
            InteractiveCommand::Sweep => {
                sweep(sender, interval).await?;
                sent += Schedule::sweep(interval).values.len();
            }
            InteractiveCommand::Send(position) => {
                send_position(sender, position).await?;
                sent += 1;
            }
            InteractiveCommand::Invalid(text) => {
                println!("Invalid value {text:?}: enter a number between 0 and 1");
            }
            InteractiveCommand::Empty => {}
        }
    }

    Ok(sent)
}

#[cfg(test)]
#[path = "send_tests.rs"]
mod tests;
