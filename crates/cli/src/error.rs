// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use serde::{Deserialize, Serialize};
use std::fmt;

/// Failure categories for probe I/O.
///
/// Attached to `anyhow` errors as context so callers can recover the
/// category with [`ProbeErrorKind::of`]. The probes themselves report a
/// plain pass/fail and never branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProbeErrorKind {
    Resolve,
    Connect,
    Send,
    Receive,
    Closed,
    Decode,
    Timeout,
}

impl ProbeErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Resolve => "RESOLVE",
            Self::Connect => "CONNECT",
            Self::Send => "SEND",
            Self::Receive => "RECEIVE",
            Self::Closed => "CLOSED",
            Self::Decode => "DECODE",
            Self::Timeout => "TIMEOUT",
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            Self::Resolve => "address resolution failed",
            Self::Connect => "connection failed",
            Self::Send => "send failed",
            Self::Receive => "receive failed",
            Self::Closed => "connection closed",
            Self::Decode => "invalid JSON",
            Self::Timeout => "timed out",
        }
    }

    /// Recover the kind attached to an error, if any.
    pub fn of(err: &anyhow::Error) -> Option<Self> {
        err.downcast_ref::<Self>().copied()
    }
}

impl fmt::Display for ProbeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.describe())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
