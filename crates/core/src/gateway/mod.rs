//! Remote photo service integration.
//!
//! The gateway is the only component that talks to the remote photo service.
//! It normalizes the service's heterogeneous response shapes into the fixed
//! [`PhotoRecord`] form consumed by the rest of the system.

mod remote;
mod types;

pub use remote::RemotePhotoGateway;
pub use types::*;

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur when interacting with the photo service.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Rate limit exceeded (HTTP 429).
    #[error("Rate limit exceeded, please wait before retrying")]
    RateLimited,

    /// Resource not found (404).
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Photo service returned an error.
    #[error("Photo service error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to parse response.
    #[error("Failed to parse response: {0}")]
    Parse(String),

    /// Client not configured (missing base URL, etc.).
    #[error("Gateway not configured: {0}")]
    NotConfigured(String),
}

/// Trait for photo service clients.
///
/// Implemented by [`RemotePhotoGateway`] and by the mock in
/// [`crate::testing`], allowing the orchestrator to run against either.
#[async_trait]
pub trait PhotoGateway: Send + Sync {
    /// Fetch up to `limit` photos for an event, filtered by print status.
    async fn fetch_pending(
        &self,
        event_id: &str,
        status: &str,
        limit: usize,
    ) -> Result<PendingPhotos, GatewayError>;

    /// Fetch a single photo, including its image payload.
    async fn fetch_photo(&self, photo_id: &str) -> Result<PhotoRecord, GatewayError>;

    /// Report the outcome of a print attempt back to the service.
    ///
    /// Callers treat failures here as non-fatal.
    async fn report_status(
        &self,
        photo_id: &str,
        outcome: PrintOutcome,
    ) -> Result<(), GatewayError>;
}
