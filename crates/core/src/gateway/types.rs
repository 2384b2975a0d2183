//! Photo record types and response-shape normalization.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Image payload reference carried by a photo record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImagePayload {
    /// Embedded `data:` URL with base64-encoded image bytes.
    DataUrl(String),
    /// Remote `http(s)` URL to download the image from.
    RemoteUrl(String),
    /// Anything else. Rejected by the dispatcher.
    Unsupported(String),
}

impl ImagePayload {
    /// Classify a raw payload reference string.
    pub fn classify(raw: &str) -> Self {
        if raw.starts_with("data:") {
            ImagePayload::DataUrl(raw.to_string())
        } else if raw.starts_with("http://") || raw.starts_with("https://") {
            ImagePayload::RemoteUrl(raw.to_string())
        } else {
            ImagePayload::Unsupported(raw.to_string())
        }
    }
}

/// A photo as consumed by the core: immutable, fetched on demand.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PhotoRecord {
    pub id: String,
    pub event_id: String,
    pub payload: ImagePayload,
    pub status: String,
}

/// Result of a pending-photos fetch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingPhotos {
    pub photos: Vec<PhotoRecord>,
    pub count: usize,
}

/// Print outcome reported back to the photo service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrintOutcome {
    Printed,
    Failed,
}

impl PrintOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrintOutcome::Printed => "printed",
            PrintOutcome::Failed => "failed",
        }
    }
}

/// Map one untyped photo object to the fixed [`PhotoRecord`] shape.
///
/// The photo service has gone through several API revisions and different
/// deployments name the same fields differently. All variant handling lives
/// here; nothing outside the gateway sees the raw shapes.
///
/// Returns `None` when no identifier can be found at all.
pub fn normalize_photo(value: &Value) -> Option<PhotoRecord> {
    let id = str_field(value, &["_id", "id", "photoId", "photo_id"])?;

    let event_id =
        str_field(value, &["eventId", "event_id", "event"]).unwrap_or_default();

    let payload = str_field(
        value,
        &["imageData", "image", "imageUrl", "image_url", "url"],
    )
    .map(|raw| ImagePayload::classify(&raw))
    .unwrap_or_else(|| ImagePayload::Unsupported(String::new()));

    let status = str_field(value, &["printStatus", "print_status", "status"])
        .unwrap_or_else(|| "pending".to_string());

    Some(PhotoRecord {
        id,
        event_id,
        payload,
        status,
    })
}

/// Extract the photo list from any of the envelope shapes the service uses:
/// a bare array, `{"photos": [...]}`, or `{"data": {"photos": [...]}}`.
pub fn normalize_photo_list(value: &Value) -> Vec<PhotoRecord> {
    let items = if let Some(arr) = value.as_array() {
        arr
    } else if let Some(arr) = value.get("photos").and_then(Value::as_array) {
        arr
    } else if let Some(arr) = value
        .pointer("/data/photos")
        .and_then(Value::as_array)
    {
        arr
    } else {
        return Vec::new();
    };

    items.iter().filter_map(normalize_photo).collect()
}

fn str_field(value: &Value, names: &[&str]) -> Option<String> {
    names
        .iter()
        .find_map(|name| value.get(name).and_then(Value::as_str))
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_classify_payloads() {
        assert!(matches!(
            ImagePayload::classify("data:image/png;base64,AAAA"),
            ImagePayload::DataUrl(_)
        ));
        assert!(matches!(
            ImagePayload::classify("https://cdn.example.com/p.jpg"),
            ImagePayload::RemoteUrl(_)
        ));
        assert!(matches!(
            ImagePayload::classify("ftp://legacy/p.jpg"),
            ImagePayload::Unsupported(_)
        ));
    }

    #[test]
    fn test_normalize_underscore_id_variant() {
        let photo = normalize_photo(&json!({
            "_id": "p1",
            "eventId": "e1",
            "imageData": "data:image/jpeg;base64,/9j/4AAQ",
            "printStatus": "pending",
        }))
        .unwrap();
        assert_eq!(photo.id, "p1");
        assert_eq!(photo.event_id, "e1");
        assert!(matches!(photo.payload, ImagePayload::DataUrl(_)));
        assert_eq!(photo.status, "pending");
    }

    #[test]
    fn test_normalize_snake_case_variant() {
        let photo = normalize_photo(&json!({
            "photo_id": "p2",
            "event_id": "e2",
            "image_url": "https://cdn.example.com/p2.jpg",
            "print_status": "printed",
        }))
        .unwrap();
        assert_eq!(photo.id, "p2");
        assert_eq!(photo.event_id, "e2");
        assert!(matches!(photo.payload, ImagePayload::RemoteUrl(_)));
        assert_eq!(photo.status, "printed");
    }

    #[test]
    fn test_normalize_defaults_missing_status_to_pending() {
        let photo = normalize_photo(&json!({
            "id": "p3",
            "event": "e3",
            "url": "https://cdn.example.com/p3.jpg",
        }))
        .unwrap();
        assert_eq!(photo.status, "pending");
    }

    #[test]
    fn test_normalize_rejects_missing_id() {
        assert!(normalize_photo(&json!({"eventId": "e1"})).is_none());
    }

    #[test]
    fn test_normalize_list_bare_array() {
        let photos = normalize_photo_list(&json!([
            {"id": "a", "url": "https://x/a.jpg"},
            {"id": "b", "url": "https://x/b.jpg"},
        ]));
        assert_eq!(photos.len(), 2);
    }

    #[test]
    fn test_normalize_list_photos_envelope() {
        let photos = normalize_photo_list(&json!({
            "photos": [{"id": "a", "url": "https://x/a.jpg"}],
            "count": 1,
        }));
        assert_eq!(photos.len(), 1);
        assert_eq!(photos[0].id, "a");
    }

    #[test]
    fn test_normalize_list_data_envelope() {
        let photos = normalize_photo_list(&json!({
            "data": {"photos": [{"_id": "a", "image": "data:image/png;base64,AA=="}]},
        }));
        assert_eq!(photos.len(), 1);
        assert!(matches!(photos[0].payload, ImagePayload::DataUrl(_)));
    }

    #[test]
    fn test_normalize_list_unknown_shape_is_empty() {
        assert!(normalize_photo_list(&json!({"unexpected": true})).is_empty());
    }
}
