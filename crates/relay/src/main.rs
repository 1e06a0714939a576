// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use clap::Parser;
use tokio_util::sync::CancellationToken;
use tracing::error;

use marshal::logging::init_tracing;
use marshal::signal::spawn_signal_handler;
use marshal_relay::config::RelayConfig;

#[tokio::main]
async fn main() {
    let config = RelayConfig::parse();

    if let Err(e) = config.validate() {
        eprintln!("error: {e}");
        std::process::exit(2);
    }

    init_tracing(&config.log_level, &config.log_format);

    let shutdown = CancellationToken::new();
    spawn_signal_handler(shutdown.clone());

    if let Err(e) = marshal_relay::run(config, shutdown).await {
        error!("fatal: {e:#}");
        std::process::exit(1);
    }
}
