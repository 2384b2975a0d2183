//! Print job orchestration.
//!
//! The orchestrator discovers pending photos on the remote service and drives
//! them through print jobs:
//! - **Discovery**: polling loop or manual trigger, rate-limit aware
//! - **Drain**: sequential (one job at a time), retries up to a cap
//! - **Circuit breaker**: repeated rate limits pause discovery for a window

mod config;
mod engine;
mod types;

pub use config::OrchestratorConfig;
pub use engine::PrintOrchestrator;
pub use types::{JobStatus, OrchestratorError, OrchestratorStatus, PrintJob};
