// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON messages pushed by the relay to WebSocket clients.

use serde::{Deserialize, Serialize};

use crate::position::Position;

/// Server-to-client message.
///
/// Serializes as `{"type":"position","value":0.5,"timestamp":1700000000000}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum RelayMessage {
    Position { value: f64, timestamp: u64 },
}

impl RelayMessage {
    /// Position update stamped with the current time.
    pub fn position(position: Position) -> Self {
        Self::Position { value: position.value(), timestamp: epoch_ms() }
    }

    /// Interpret an arbitrary JSON value as a relay message, if it is one.
    pub fn from_value(value: &serde_json::Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    pub fn to_json(&self) -> String {
        // Serializing a plain tagged struct cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }
}

/// Return current epoch millis.
pub fn epoch_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

#[cfg(test)]
#[path = "message_tests.rs"]
mod tests;
