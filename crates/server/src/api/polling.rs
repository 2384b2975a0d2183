//! Polling API handlers.

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::{orchestrator_error, ErrorResponse, MessageResponse};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct StartPollingRequest {
    pub event_id: String,
    pub interval_ms: u64,
}

pub async fn start(
    State(state): State<Arc<AppState>>,
    Json(req): Json<StartPollingRequest>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .orchestrator()
        .start_polling(&req.event_id, Duration::from_millis(req.interval_ms))
        .await
        .map_err(orchestrator_error)?;

    Ok(Json(MessageResponse {
        success: true,
        message: format!("polling started for event {}", req.event_id.trim()),
    }))
}

pub async fn stop(State(state): State<Arc<AppState>>) -> Json<MessageResponse> {
    state.orchestrator().stop_polling().await;
    Json(MessageResponse {
        success: true,
        message: "polling stopped".to_string(),
    })
}
