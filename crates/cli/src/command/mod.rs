// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI subcommands: `once`, `sequence`, `check`, `listen`, `send`.

pub mod check;
pub mod listen;
pub mod once;
pub mod send;
pub mod sequence;

use tokio_util::sync::CancellationToken;

use crate::config::Command;

/// Exit code for a run cut short by SIGINT or SIGTERM (128 + SIGINT).
pub const EXIT_INTERRUPTED: i32 = 130;

/// Run the selected subcommand. Returns a process exit code.
///
/// `listen` watches `shutdown` itself so it can close its socket cleanly.
/// Every other subcommand is abandoned as soon as `shutdown` fires.
pub async fn run(command: Command, shutdown: CancellationToken) -> anyhow::Result<i32> {
    if matches!(command, Command::Listen(_)) {
        return dispatch(command, shutdown).await;
    }

    tokio::select! {
        result = dispatch(command, shutdown.clone()) => result,
        _ = shutdown.cancelled() => {
            tracing::info!("interrupted");
            Ok(EXIT_INTERRUPTED)
        }
    }
}

async fn dispatch(command: Command, shutdown: CancellationToken) -> anyhow::Result<i32> {
    match command {
        Command::Once(args) => {
            once::run(&args).await?;
            Ok(0)
        }
        Command::Sequence(args) => {
            sequence::run(&args).await?;
            Ok(0)
        }
        Command::Check(args) => {
            check::run(&args).await;
            Ok(0)
        }
        Command::Listen(args) => {
            listen::run(&args, shutdown).await;
            Ok(0)
        }
        Command::Send(args) => send::run(&args).await,
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
