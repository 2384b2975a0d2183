pub mod handlers;
pub mod polling;
pub mod printing;
pub mod queue;
pub mod routes;

pub use routes::create_router;

use axum::http::StatusCode;
use axum::Json;
use printbooth_core::{GatewayError, OrchestratorError};
use serde::Serialize;

/// Error payload shared by all endpoints.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

/// Simple message response.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub success: bool,
    pub message: String,
}

pub(crate) fn error_response(
    status: StatusCode,
    error: impl Into<String>,
) -> (StatusCode, Json<ErrorResponse>) {
    (
        status,
        Json(ErrorResponse {
            success: false,
            error: error.into(),
        }),
    )
}

/// Map orchestrator errors onto HTTP statuses.
pub(crate) fn orchestrator_error(err: OrchestratorError) -> (StatusCode, Json<ErrorResponse>) {
    let status = match &err {
        OrchestratorError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
        OrchestratorError::Gateway(GatewayError::RateLimited) => StatusCode::TOO_MANY_REQUESTS,
        OrchestratorError::Gateway(GatewayError::NotFound(_)) => StatusCode::NOT_FOUND,
        OrchestratorError::Gateway(_) => StatusCode::BAD_GATEWAY,
        OrchestratorError::Printer(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    error_response(status, err.to_string())
}
