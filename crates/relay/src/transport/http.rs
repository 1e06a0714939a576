// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP handlers for the relay.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use marshal::position::Position;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::state::RelayState;

// -- Request/Response types ---------------------------------------------------

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub clients: usize,
    pub last_position: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct PositionRequest {
    pub position: f64,
}

#[derive(Debug, Serialize)]
pub struct PositionResponse {
    pub success: bool,
    pub position: f64,
}

// -- Handlers -----------------------------------------------------------------

/// `GET /api/v1/health`
pub async fn health(State(s): State<Arc<RelayState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "running".to_owned(),
        clients: s.client_count(),
        last_position: s.last_position().await.map(Position::value),
    })
}

/// `POST /api/v1/position` — inject a position as if it arrived over UDP.
///
/// The body is parsed by hand so malformed JSON gets the error envelope
/// instead of axum's plain-text rejection.
pub async fn post_position(
    State(s): State<Arc<RelayState>>,
    body: Bytes,
) -> Result<Json<PositionResponse>, ApiError> {
    let req: PositionRequest = serde_json::from_slice(&body)?;
    let position = Position::new(req.position)?;

    let clients = s.publish(position).await;
    tracing::info!(%position, clients, "position injected over http");
    Ok(Json(PositionResponse { success: true, position: position.value() }))
}
