/// The marker list and its persistence
///
/// The whole list is stored as one JSON array under a fixed key. Every
/// mutation is followed by a full-list overwrite; there is no merging, so
/// the last writer wins.
use super::data::{BodyView, Marker};
use super::store::KeyValueStore;
use crate::error::Result;

/// Key under which the marker list is stored
pub const MARKERS_KEY: &str = "lesionPoints";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MarkerList {
    markers: Vec<Marker>,
}

impl MarkerList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_markers(markers: Vec<Marker>) -> Self {
        Self { markers }
    }

    /// Load the list, treating a missing or unreadable value as empty
    pub fn load(store: &impl KeyValueStore) -> Self {
        match Self::try_load(store) {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!("⚠️  Could not load markers, starting empty: {}", e);
                Self::new()
            }
        }
    }

    pub fn try_load(store: &impl KeyValueStore) -> Result<Self> {
        let markers = match store.get(MARKERS_KEY)? {
            Some(json) => serde_json::from_str(&json)?,
            None => Vec::new(),
        };
        Ok(Self { markers })
    }

    /// Overwrite the stored list with this one
    pub fn save(&self, store: &impl KeyValueStore) -> Result<()> {
        let json = serde_json::to_string(&self.markers)?;
        store.set(MARKERS_KEY, &json)?;
        tracing::debug!("💾 Saved {} markers", self.markers.len());
        Ok(())
    }

    /// Append a new marker without a photo and return it
    pub fn create(&mut self, x: f32, y: f32, body_view: BodyView, now_ms: i64) -> &Marker {
        let id = self.next_id(now_ms);
        tracing::info!("📍 New {} marker {} at ({:.1}, {:.1})", body_view, id, x, y);

        self.markers.push(Marker {
            id,
            x,
            y,
            timestamp: now_ms,
            photo_uri: None,
            body_view,
        });
        &self.markers[self.markers.len() - 1]
    }

    /// Attach or replace the photo of a marker. Returns false for unknown ids.
    pub fn attach_photo(&mut self, id: &str, uri: String) -> bool {
        match self.markers.iter_mut().find(|m| m.id == id) {
            Some(marker) => {
                marker.photo_uri = Some(uri);
                true
            }
            None => false,
        }
    }

    /// Remove a marker. Returns the removed record if it existed.
    pub fn remove(&mut self, id: &str) -> Option<Marker> {
        let index = self.markers.iter().position(|m| m.id == id)?;
        Some(self.markers.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.id == id)
    }

    pub fn for_view(&self, view: BodyView) -> impl Iterator<Item = &Marker> {
        self.markers.iter().filter(move |m| m.body_view == view)
    }

    pub fn all(&self) -> &[Marker] {
        &self.markers
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Millisecond timestamp as the id, bumped past any collision
    fn next_id(&self, now_ms: i64) -> String {
        let mut candidate = now_ms;
        loop {
            let id = candidate.to_string();
            if self.get(&id).is_none() {
                return id;
            }
            candidate += 1;
        }
    }
}
