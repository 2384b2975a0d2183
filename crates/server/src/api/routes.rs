use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::{handlers, polling, printing, queue};
use crate::state::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        // Health and config
        .route("/health", get(handlers::health))
        .route("/config", get(handlers::get_config))
        // Queue
        .route("/queue/status", get(queue::get_status))
        .route("/queue/clear", post(queue::clear))
        // Printing
        .route("/print/event/{event_id}", post(printing::print_event))
        .route("/printers", get(printing::list_printers))
        .route("/printers/self-test", post(printing::self_test))
        // Polling
        .route("/polling/start", post(polling::start))
        .route("/polling/stop", post(polling::stop))
        .with_state(state);

    Router::new()
        .nest("/api/v1", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}
