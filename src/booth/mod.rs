//! The photobooth session: camera lifecycle, the capture sequence,
//! stickers, and export.

mod error;
mod events;
mod session;
mod state;
mod stickers;

pub use error::BoothError;
pub use events::{BoothEvents, NoEvents, Tone, Waveform};
pub use session::{download_photo, CaptureTiming, Exported, PhotoboothSession, SessionConfig};
pub use state::{CapturePhase, CaptureState, Rejection, Still};
pub use stickers::{PlacedSticker, StickerBoard, StickerId, STICKER_BOX};
