/// Shared data structures for the application state
///
/// These structs represent the data model that flows between
/// the key-value store and the UI layer.
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the two body diagrams a marker or gesture applies to
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "lowercase")]
pub enum BodyView {
    #[default]
    Front,
    Back,
}

impl BodyView {
    /// The other side of the body
    pub fn flipped(self) -> Self {
        match self {
            BodyView::Front => BodyView::Back,
            BodyView::Back => BodyView::Front,
        }
    }
}

impl fmt::Display for BodyView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BodyView::Front => write!(f, "front"),
            BodyView::Back => write!(f, "back"),
        }
    }
}

/// A single user-flagged skin location (a "lesion point")
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    /// Unique within the marker list, derived from the creation timestamp
    pub id: String,
    /// Offset in unscaled diagram pixels (not normalized)
    pub x: f32,
    pub y: f32,
    /// Creation time in milliseconds since the epoch
    pub timestamp: i64,
    /// Attached photo, absent until one is picked
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_uri: Option<String>,
    /// Fixed at creation
    pub body_view: BodyView,
}

impl Marker {
    pub fn has_photo(&self) -> bool {
        self.photo_uri.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_marker_json_field_names() {
        let marker = Marker {
            id: "1700000000000".to_string(),
            x: 120.5,
            y: 88.0,
            timestamp: 1_700_000_000_000,
            photo_uri: Some("/photos/mole.jpg".to_string()),
            body_view: BodyView::Back,
        };

        let json = serde_json::to_value(&marker).unwrap();

        assert_eq!(json["photoUri"], "/photos/mole.jpg");
        assert_eq!(json["bodyView"], "back");
        assert_eq!(json["timestamp"], 1_700_000_000_000_i64);
    }

    #[test]
    fn test_missing_photo_uri_parses() {
        let json = r#"{"id":"1","x":10,"y":20,"timestamp":5,"bodyView":"front"}"#;
        let marker: Marker = serde_json::from_str(json).unwrap();

        assert_eq!(marker.photo_uri, None);
        assert_eq!(marker.body_view, BodyView::Front);
        assert!(!marker.has_photo());
    }

    #[test]
    fn test_flipped() {
        assert_eq!(BodyView::Front.flipped(), BodyView::Back);
        assert_eq!(BodyView::Back.flipped(), BodyView::Front);
    }
}
