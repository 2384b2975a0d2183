//! Queue API handlers.

use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use printbooth_core::{OrchestratorStatus, PrinterStatus};

use crate::state::AppState;

/// Combined view of the job queue and the physical print queue.
#[derive(Serialize)]
pub struct QueueStatusResponse {
    pub success: bool,
    pub orchestrator: OrchestratorStatus,
    pub printer: PrinterStatus,
}

pub async fn get_status(State(state): State<Arc<AppState>>) -> Json<QueueStatusResponse> {
    Json(QueueStatusResponse {
        success: true,
        orchestrator: state.orchestrator().status().await,
        printer: state.dispatcher().status(),
    })
}

#[derive(Serialize)]
pub struct ClearQueueResponse {
    pub success: bool,
    pub cleared: usize,
}

pub async fn clear(State(state): State<Arc<AppState>>) -> Json<ClearQueueResponse> {
    Json(ClearQueueResponse {
        success: true,
        cleared: state.orchestrator().clear_queue().await,
    })
}
