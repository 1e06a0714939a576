// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Marshal: connectivity probes for the position relay's UDP listener and
//! WebSocket server, plus the wire types both sides share.

pub mod command;
pub mod config;
pub mod error;
pub mod logging;
pub mod message;
pub mod position;
pub mod signal;
pub mod test_support;
pub mod udp;
pub mod ws;
