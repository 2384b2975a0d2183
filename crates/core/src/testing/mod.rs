//! Testing utilities and mock implementations for E2E tests.
//!
//! Mock implementations of the gateway and printer traits, allowing the
//! orchestrator and the HTTP layer to be tested without a photo service or
//! printing hardware.
//!
//! # Example
//!
//! ```rust,ignore
//! use printbooth_core::testing::{fixtures, MockPhotoGateway, MockPhotoPrinter, PendingResponse};
//!
//! let gateway = MockPhotoGateway::new();
//! let printer = MockPhotoPrinter::new();
//!
//! // Configure mock responses
//! gateway.insert_photo(fixtures::data_url_photo("p1", "e1")).await;
//! gateway.push_pending(PendingResponse::Photos(vec![
//!     fixtures::data_url_photo("p1", "e1"),
//! ])).await;
//!
//! // Use in a PrintOrchestrator...
//! ```

mod mock_gateway;
mod mock_printer;

pub use mock_gateway::{MockPhotoGateway, PendingResponse, RecordedFetch};
pub use mock_printer::MockPhotoPrinter;

/// Test fixtures and helper functions.
pub mod fixtures {
    use crate::gateway::{ImagePayload, PhotoRecord};

    /// A photo with an embedded data URL payload (valid base64).
    pub fn data_url_photo(id: &str, event_id: &str) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            event_id: event_id.to_string(),
            payload: ImagePayload::DataUrl(
                "data:image/jpeg;base64,aGVsbG8gcHJpbnRib290aA==".to_string(),
            ),
            status: "pending".to_string(),
        }
    }

    /// A photo with a remote URL payload.
    pub fn remote_url_photo(id: &str, event_id: &str) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            event_id: event_id.to_string(),
            payload: ImagePayload::RemoteUrl(format!("https://cdn.example.com/{}.jpg", id)),
            status: "pending".to_string(),
        }
    }

    /// A photo whose payload no dispatcher can handle.
    pub fn unsupported_photo(id: &str, event_id: &str) -> PhotoRecord {
        PhotoRecord {
            id: id.to_string(),
            event_id: event_id.to_string(),
            payload: ImagePayload::Unsupported(format!("ftp://legacy/{}.jpg", id)),
            status: "pending".to_string(),
        }
    }
}
