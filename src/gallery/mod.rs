//! Persisted gallery of booth photos.
//!
//! - [`Gallery`]: newest-first list capped at [`DEFAULT_CAPACITY`]
//! - [`KeyValueStore`]: the persistence seam, with [`FileStore`] and [`MemoryStore`]
//! - [`render_contact_sheet`]: the gallery grid as a single raster

mod album;
mod photo;
mod sheet;
mod store;

pub use album::{Confirm, DeleteOutcome, Gallery, DEFAULT_CAPACITY, EMPTY_MESSAGE, STORAGE_KEY};
pub use photo::{CapturedPhoto, PhotoId};
pub use sheet::{render_contact_sheet, SheetLayout};
pub use store::{default_data_dir, FileStore, KeyValueStore, MemoryStore, StoreError};
