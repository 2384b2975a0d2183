//! Mock photo gateway for testing.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::gateway::{
    GatewayError, PendingPhotos, PhotoGateway, PhotoRecord, PrintOutcome,
};

/// Scripted response for one `fetch_pending` call.
///
/// `GatewayError` is not `Clone`, so the script stores an owned description
/// and the mock builds a fresh error per call.
#[derive(Debug, Clone)]
pub enum PendingResponse {
    Photos(Vec<PhotoRecord>),
    RateLimited,
    ServiceError(u16, String),
}

/// A recorded `fetch_pending` call for test assertions.
#[derive(Debug, Clone)]
pub struct RecordedFetch {
    pub event_id: String,
    pub status: String,
    pub limit: usize,
}

/// Mock implementation of the PhotoGateway trait.
///
/// Provides controllable behavior for testing:
/// - Script `fetch_pending` responses call by call (exhausted script yields
///   an empty photo list)
/// - Serve photos for `fetch_photo` from a configured map
/// - Record every fetch and every reported outcome for assertions
#[derive(Default)]
pub struct MockPhotoGateway {
    /// Scripted responses, consumed front to back.
    pending_script: Arc<RwLock<VecDeque<PendingResponse>>>,
    /// Photos served by `fetch_photo`.
    photos: Arc<RwLock<HashMap<String, PhotoRecord>>>,
    /// Photo ids whose `fetch_photo` fails with a service error.
    failing_photos: Arc<RwLock<HashSet<String>>>,
    /// Photo ids whose `report_status` fails with a service error.
    failing_reports: Arc<RwLock<HashSet<String>>>,
    /// Recorded `fetch_pending` calls.
    fetches: Arc<RwLock<Vec<RecordedFetch>>>,
    /// Recorded `fetch_photo` calls (photo ids, in order).
    photo_fetches: Arc<RwLock<Vec<String>>>,
    /// Recorded `report_status` calls.
    reports: Arc<RwLock<Vec<(String, PrintOutcome)>>>,
}

impl MockPhotoGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a scripted response for the next unconsumed `fetch_pending`.
    pub async fn push_pending(&self, response: PendingResponse) {
        self.pending_script.write().await.push_back(response);
    }

    /// Make `fetch_photo` serve this photo.
    pub async fn insert_photo(&self, photo: PhotoRecord) {
        self.photos.write().await.insert(photo.id.clone(), photo);
    }

    /// Make `fetch_photo` fail for this photo id.
    pub async fn fail_fetch_photo(&self, photo_id: &str) {
        self.failing_photos.write().await.insert(photo_id.to_string());
    }

    /// Make `report_status` fail for this photo id.
    pub async fn fail_report(&self, photo_id: &str) {
        self.failing_reports
            .write()
            .await
            .insert(photo_id.to_string());
    }

    /// All `fetch_pending` calls made so far.
    pub async fn recorded_fetches(&self) -> Vec<RecordedFetch> {
        self.fetches.read().await.clone()
    }

    /// Number of `fetch_pending` calls for one event.
    pub async fn fetch_count_for(&self, event_id: &str) -> usize {
        self.fetches
            .read()
            .await
            .iter()
            .filter(|f| f.event_id == event_id)
            .count()
    }

    /// Number of `fetch_photo` calls for one photo.
    pub async fn photo_fetch_count(&self, photo_id: &str) -> usize {
        self.photo_fetches
            .read()
            .await
            .iter()
            .filter(|id| id.as_str() == photo_id)
            .count()
    }

    /// All `report_status` calls made so far.
    pub async fn reported(&self) -> Vec<(String, PrintOutcome)> {
        self.reports.read().await.clone()
    }
}

#[async_trait]
impl PhotoGateway for MockPhotoGateway {
    async fn fetch_pending(
        &self,
        event_id: &str,
        status: &str,
        limit: usize,
    ) -> Result<PendingPhotos, GatewayError> {
        self.fetches.write().await.push(RecordedFetch {
            event_id: event_id.to_string(),
            status: status.to_string(),
            limit,
        });

        let scripted = self.pending_script.write().await.pop_front();
        match scripted {
            Some(PendingResponse::Photos(photos)) => {
                let count = photos.len();
                Ok(PendingPhotos { photos, count })
            }
            Some(PendingResponse::RateLimited) => Err(GatewayError::RateLimited),
            Some(PendingResponse::ServiceError(status, message)) => {
                Err(GatewayError::Api { status, message })
            }
            None => Ok(PendingPhotos {
                photos: Vec::new(),
                count: 0,
            }),
        }
    }

    async fn fetch_photo(&self, photo_id: &str) -> Result<PhotoRecord, GatewayError> {
        self.photo_fetches.write().await.push(photo_id.to_string());

        if self.failing_photos.read().await.contains(photo_id) {
            return Err(GatewayError::Api {
                status: 500,
                message: format!("simulated fetch failure for {}", photo_id),
            });
        }

        self.photos
            .read()
            .await
            .get(photo_id)
            .cloned()
            .ok_or_else(|| GatewayError::NotFound(format!("photo {}", photo_id)))
    }

    async fn report_status(
        &self,
        photo_id: &str,
        outcome: PrintOutcome,
    ) -> Result<(), GatewayError> {
        self.reports
            .write()
            .await
            .push((photo_id.to_string(), outcome));

        if self.failing_reports.read().await.contains(photo_id) {
            return Err(GatewayError::Api {
                status: 500,
                message: format!("simulated report failure for {}", photo_id),
            });
        }
        Ok(())
    }
}
