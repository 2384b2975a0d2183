//! Types for the print orchestrator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::gateway::GatewayError;
use crate::printer::PrinterError;

/// Errors that can occur during orchestration.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    /// Caller-supplied argument was rejected.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Photo service error.
    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Printer error.
    #[error("printer error: {0}")]
    Printer(#[from] PrinterError),
}

/// Lifecycle state of a print job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Waiting in the queue.
    Queued,
    /// Currently being fetched and printed.
    Printing,
    /// Printed successfully.
    Completed,
    /// Exhausted all attempts.
    Failed,
}

impl JobStatus {
    /// Terminal states never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

/// One photo's journey through the print queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrintJob {
    pub id: Uuid,
    pub photo_id: String,
    pub event_id: String,
    pub status: JobStatus,
    /// Print attempts consumed so far.
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
    /// Set when the job reaches a terminal state.
    pub completed_at: Option<DateTime<Utc>>,
    /// Most recent failure, kept across retries.
    pub error: Option<String>,
}

impl PrintJob {
    pub fn new(photo_id: &str, event_id: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            photo_id: photo_id.to_string(),
            event_id: event_id.to_string(),
            status: JobStatus::Queued,
            attempts: 0,
            created_at: Utc::now(),
            completed_at: None,
            error: None,
        }
    }
}

/// Current status of the orchestrator.
#[derive(Debug, Clone, Serialize)]
pub struct OrchestratorStatus {
    /// Whether a polling loop is armed.
    pub polling: bool,
    /// Event the polling loop is watching.
    pub event_id: Option<String>,
    /// Jobs waiting in the queue.
    pub queue_len: usize,
    /// Whether a drain is in flight.
    pub processing: bool,
    /// Snapshot of live jobs: queued plus the one printing. Jobs that
    /// settled terminally are gone.
    pub jobs: Vec<PrintJob>,
    /// Consecutive rate-limited fetches so far.
    pub consecutive_rate_limits: u32,
    /// When set, discovery is paused until this instant.
    pub breaker_open_until: Option<DateTime<Utc>>,
}
