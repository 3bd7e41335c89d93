//! Bounded, newest-first photo gallery backed by a [`KeyValueStore`].

use chrono::Utc;

use super::photo::{CapturedPhoto, PhotoId};
use super::store::{KeyValueStore, StoreError};
use crate::raster::{FilterKind, FrameKind};

/// Key the gallery is persisted under.
pub const STORAGE_KEY: &str = "photoboothPhotos";

/// How many photos are kept.
pub const DEFAULT_CAPACITY: usize = 20;

/// Shown when the gallery has nothing in it.
pub const EMPTY_MESSAGE: &str = "No photos yet. Take your first one!";

/// Asks the user to confirm a destructive action.
pub trait Confirm {
    fn confirm(&self, prompt: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Confirm for F {
    fn confirm(&self, prompt: &str) -> bool {
        self(prompt)
    }
}

/// Result of [`Gallery::delete`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    Deleted,
    Cancelled,
    NotFound,
}

/// The photo gallery.
///
/// The in-memory list is authoritative for the session; the store is only a
/// best-effort copy, and write failures are logged rather than surfaced.
#[derive(Debug)]
pub struct Gallery<S> {
    store: S,
    key: String,
    capacity: usize,
    photos: Vec<CapturedPhoto>,
    last_id: PhotoId,
}

impl<S: KeyValueStore> Gallery<S> {
    /// Load the gallery under the default key and capacity.
    pub fn load(store: S) -> Self {
        Self::load_with(store, STORAGE_KEY, DEFAULT_CAPACITY)
    }

    /// Load the gallery from `store`.
    ///
    /// An absent key, an unreadable store, or malformed JSON all yield an
    /// empty gallery. `capacity` is clamped to `1..=DEFAULT_CAPACITY`.
    pub fn load_with(store: S, key: &str, capacity: usize) -> Self {
        let capacity = capacity.clamp(1, DEFAULT_CAPACITY);
        let mut photos = match store.get(key) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<CapturedPhoto>>(&raw) {
                Ok(photos) => photos,
                Err(e) => {
                    log::warn!("Ignoring malformed gallery data under '{}': {}", key, e);
                    Vec::new()
                }
            },
            Ok(None) => Vec::new(),
            Err(e) => {
                log::warn!("Could not read gallery from store: {}", e);
                Vec::new()
            }
        };
        photos.truncate(capacity);
        let last_id = photos.iter().map(|p| p.id).max().unwrap_or(0);
        log::debug!("Loaded {} photo(s) from '{}'", photos.len(), key);

        Self {
            store,
            key: key.to_string(),
            capacity,
            photos,
            last_id,
        }
    }

    /// Photos, newest first.
    pub fn photos(&self) -> &[CapturedPhoto] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn get(&self, id: PhotoId) -> Option<&CapturedPhoto> {
        self.photos.iter().find(|p| p.id == id)
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Record a new photo with a fresh id and persist the gallery.
    pub fn save(&mut self, image_data: String, frame: FrameKind, filter: FilterKind) -> CapturedPhoto {
        let now = Utc::now();
        let id = self.next_id(now.timestamp_millis().max(0) as PhotoId);
        let photo = CapturedPhoto {
            id,
            image_data,
            frame,
            filter,
            captured_at: now,
        };
        self.insert(photo.clone());
        photo
    }

    /// Prepend `photo`, drop anything past capacity, and persist.
    pub fn insert(&mut self, photo: CapturedPhoto) {
        self.last_id = self.last_id.max(photo.id);
        self.photos.insert(0, photo);
        self.photos.truncate(self.capacity);
        self.persist();
    }

    /// Delete the photo with `id` after asking `confirm`.
    ///
    /// An unknown id is a no-op and does not prompt.
    pub fn delete(&mut self, id: PhotoId, confirm: &dyn Confirm) -> DeleteOutcome {
        let Some(pos) = self.photos.iter().position(|p| p.id == id) else {
            return DeleteOutcome::NotFound;
        };
        if !confirm.confirm("Delete this photo?") {
            return DeleteOutcome::Cancelled;
        }
        self.photos.remove(pos);
        self.persist();
        DeleteOutcome::Deleted
    }

    /// Ids are millisecond timestamps, bumped when two saves share a tick.
    fn next_id(&mut self, now_ms: PhotoId) -> PhotoId {
        let id = now_ms.max(self.last_id.saturating_add(1));
        self.last_id = id;
        id
    }

    fn persist(&mut self) {
        if let Err(e) = self.try_persist() {
            log::warn!("Could not save gallery: {}", e);
        }
    }

    fn try_persist(&mut self) -> Result<(), StoreError> {
        let json = serde_json::to_string(&self.photos)?;
        self.store.set(&self.key, &json)
    }
}
