//! Printing API handlers.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;

use super::{error_response, orchestrator_error, ErrorResponse, MessageResponse};
use crate::state::AppState;

#[derive(Serialize)]
pub struct PrintEventResponse {
    pub success: bool,
    pub queued: usize,
}

/// Queue and print every pending photo of an event.
pub async fn print_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<Json<PrintEventResponse>, (StatusCode, Json<ErrorResponse>)> {
    let queued = state
        .orchestrator()
        .print_event(&event_id)
        .await
        .map_err(orchestrator_error)?;

    Ok(Json(PrintEventResponse {
        success: true,
        queued,
    }))
}

#[derive(Serialize)]
pub struct PrintersResponse {
    pub success: bool,
    pub printers: Vec<String>,
}

pub async fn list_printers(State(state): State<Arc<AppState>>) -> Json<PrintersResponse> {
    Json(PrintersResponse {
        success: true,
        printers: state.dispatcher().list_printers().await,
    })
}

pub async fn self_test(
    State(state): State<Arc<AppState>>,
) -> Result<Json<MessageResponse>, (StatusCode, Json<ErrorResponse>)> {
    state
        .dispatcher()
        .self_test()
        .await
        .map_err(|e| error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(MessageResponse {
        success: true,
        message: "test page printed".to_string(),
    }))
}
