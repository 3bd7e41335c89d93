//! The persisted photo record.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::raster::{FilterKind, FrameKind};

/// Millisecond timestamp, unique within a gallery.
pub type PhotoId = u64;

/// A photo taken (or uploaded) at the booth. Immutable once created.
///
/// Field names on the wire match the web page's `photoboothPhotos` entries,
/// so a store exported from the browser loads as-is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CapturedPhoto {
    pub id: PhotoId,
    /// Encoded raster as a data URI
    #[serde(rename = "data")]
    pub image_data: String,
    pub frame: FrameKind,
    pub filter: FilterKind,
    #[serde(rename = "date")]
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reads_browser_written_entry() {
        let json = r#"{
            "id": 1714564800123,
            "data": "data:image/png;base64,AAAA",
            "frame": "birthday",
            "filter": "sepia",
            "date": "2024-05-01T12:00:00.123Z"
        }"#;
        let photo: CapturedPhoto = serde_json::from_str(json).unwrap();
        assert_eq!(photo.id, 1714564800123);
        assert_eq!(photo.frame, FrameKind::Birthday);
        assert_eq!(photo.filter, FilterKind::Sepia);
        assert_eq!(photo.captured_at.timestamp_millis(), 1714564800123);
    }

    #[test]
    fn test_writes_browser_field_names() {
        let photo = CapturedPhoto {
            id: 7,
            image_data: "data:image/png;base64,AAAA".to_string(),
            frame: FrameKind::None,
            filter: FilterKind::Cool,
            captured_at: DateTime::from_timestamp_millis(7).unwrap(),
        };
        let value = serde_json::to_value(&photo).unwrap();
        assert_eq!(value["data"], "data:image/png;base64,AAAA");
        assert_eq!(value["frame"], "none");
        assert_eq!(value["filter"], "cool");
        assert!(value["date"].as_str().unwrap().starts_with("1970-01-01T00:00:00.007"));
    }
}
