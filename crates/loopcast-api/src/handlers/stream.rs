//! Relay control surface: start, stop, status.
//!
//! Start and stop are fire-and-forget for the caller; process death after a
//! successful start surfaces only through subsequent status queries.

use crate::error::{ErrorResponse, HttpAppError};
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    Json,
};
use loopcast_core::models::{StartStreamRequest, StopStreamResponse};
use loopcast_core::AppError;
use loopcast_relay::{RelayStatus, StopOutcome};
use serde::Deserialize;
use std::sync::Arc;

const DEFAULT_LOG_TAIL: usize = 30;

#[derive(Debug, Deserialize)]
pub struct StatusQuery {
    /// Number of trailing log lines to include
    lines: Option<usize>,
}

#[utoipa::path(
    post,
    path = "/stream/start",
    tag = "stream",
    request_body = StartStreamRequest,
    responses(
        (status = 200, description = "Relay session launched", body = RelayStatus),
        (status = 400, description = "Empty stream key", body = ErrorResponse),
        (status = 404, description = "Source file not found", body = ErrorResponse),
        (status = 409, description = "A session is already running", body = ErrorResponse),
        (status = 500, description = "Relay process failed to launch", body = ErrorResponse)
    )
)]
pub async fn start_stream(
    State(state): State<Arc<AppState>>,
    Json(request): Json<StartStreamRequest>,
) -> Result<Json<RelayStatus>, HttpAppError> {
    let source = state
        .storage
        .path_for(&request.filename)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No stored file named {}", request.filename)))?;

    state
        .relay
        .start(&source, &request.stream_key, request.vertical)
        .await?;

    Ok(Json(state.relay.status(DEFAULT_LOG_TAIL).await))
}

#[utoipa::path(
    post,
    path = "/stream/stop",
    tag = "stream",
    responses(
        (status = 200, description = "Session stopped, or nothing to stop", body = StopStreamResponse)
    )
)]
pub async fn stop_stream(State(state): State<Arc<AppState>>) -> Json<StopStreamResponse> {
    let response = match state.relay.stop().await {
        StopOutcome::Stopped => StopStreamResponse {
            stopped: true,
            message: "Relay session stopped".to_string(),
        },
        StopOutcome::NotRunning => StopStreamResponse {
            stopped: false,
            message: "No relay session running".to_string(),
        },
    };
    Json(response)
}

#[utoipa::path(
    get,
    path = "/stream/status",
    tag = "stream",
    params(
        ("lines" = Option<usize>, Query, description = "Trailing log lines to include (default 30)")
    ),
    responses(
        (status = 200, description = "Current lifecycle state and recent log", body = RelayStatus)
    )
)]
pub async fn stream_status(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatusQuery>,
) -> Json<RelayStatus> {
    let tail = query.lines.unwrap_or(DEFAULT_LOG_TAIL);
    Json(state.relay.status(tail).await)
}
