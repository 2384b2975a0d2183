use axum::{extract::State, Json};
use serde::Serialize;
use std::sync::Arc;

use printbooth_core::SanitizedConfig;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub success: bool,
    pub status: String,
    pub version: String,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        success: true,
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
pub struct ConfigResponse {
    pub success: bool,
    pub config: SanitizedConfig,
}

pub async fn get_config(State(state): State<Arc<AppState>>) -> Json<ConfigResponse> {
    Json(ConfigResponse {
        success: true,
        config: state.sanitized_config(),
    })
}
