//! HTTP client for the remote photo service.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::GatewayConfig;

use super::types::{normalize_photo, normalize_photo_list, PendingPhotos, PhotoRecord};
use super::{GatewayError, PhotoGateway, PrintOutcome};

/// reqwest-based photo service client.
pub struct RemotePhotoGateway {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl RemotePhotoGateway {
    /// Create a new gateway client.
    pub fn new(config: GatewayConfig) -> Result<Self, GatewayError> {
        if config.base_url.is_empty() {
            return Err(GatewayError::NotConfigured(
                "photo service base URL is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
        })
    }

    fn request(&self, method: reqwest::Method, url: String) -> reqwest::RequestBuilder {
        let mut request = self.client.request(method, url);
        if let Some(ref key) = self.api_key {
            request = request.header("x-api-key", key);
        }
        request
    }

    /// Map a non-success response to the gateway error taxonomy.
    async fn error_for(response: reqwest::Response, what: &str) -> GatewayError {
        let status = response.status();
        if status == 429 {
            return GatewayError::RateLimited;
        }
        if status == 404 {
            return GatewayError::NotFound(what.to_string());
        }
        let body = response.text().await.unwrap_or_default();
        GatewayError::Api {
            status: status.as_u16(),
            message: body,
        }
    }
}

#[async_trait]
impl PhotoGateway for RemotePhotoGateway {
    async fn fetch_pending(
        &self,
        event_id: &str,
        status: &str,
        limit: usize,
    ) -> Result<PendingPhotos, GatewayError> {
        let url = format!("{}/events/{}/photos", self.base_url, event_id);

        debug!(event_id, status, limit, "fetching pending photos");

        let response = self
            .request(reqwest::Method::GET, url)
            .query(&[("status", status), ("limit", &limit.to_string())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, &format!("event {}", event_id)).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(format!("pending photos response: {}", e)))?;

        let photos = normalize_photo_list(&body);
        let count = photos.len();
        Ok(PendingPhotos { photos, count })
    }

    async fn fetch_photo(&self, photo_id: &str) -> Result<PhotoRecord, GatewayError> {
        let url = format!("{}/photos/{}", self.base_url, photo_id);

        debug!(photo_id, "fetching photo");

        let response = self.request(reqwest::Method::GET, url).send().await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, &format!("photo {}", photo_id)).await);
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GatewayError::Parse(format!("photo response: {}", e)))?;

        // Some deployments wrap the photo in a "data" or "photo" envelope.
        let record = normalize_photo(&body)
            .or_else(|| body.get("photo").and_then(normalize_photo))
            .or_else(|| body.get("data").and_then(normalize_photo));

        record.ok_or_else(|| {
            GatewayError::Parse(format!("unrecognized photo shape for {}", photo_id))
        })
    }

    async fn report_status(
        &self,
        photo_id: &str,
        outcome: PrintOutcome,
    ) -> Result<(), GatewayError> {
        let url = format!("{}/photos/{}/status", self.base_url, photo_id);

        debug!(photo_id, outcome = outcome.as_str(), "reporting print status");

        let response = self
            .request(reqwest::Method::POST, url)
            .json(&serde_json::json!({ "printStatus": outcome.as_str() }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(Self::error_for(response, &format!("photo {}", photo_id)).await);
        }

        Ok(())
    }
}
