//! Raster surface work: filters, frames, text, and data URI encoding.

pub mod compose;
pub mod data_uri;
pub mod filter;
pub mod frame;
pub mod text;

pub use compose::{
    grab_still, map_to_output, sticker_color, CompositeReport, Compositor, StickerStamp,
};
pub use filter::{apply_filter, FilterKind, FilterOp};
pub use frame::{banners, Banner, FrameKind, FrameTexts};

use thiserror::Error;

/// A point on the overlay surface, in surface pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// On-screen size of the surface stickers are placed on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OverlaySize {
    pub width: f32,
    pub height: f32,
}

impl Default for OverlaySize {
    fn default() -> Self {
        Self {
            width: 640.0,
            height: 480.0,
        }
    }
}

/// Errors from encoding, decoding, or grabbing rasters.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("Image codec error: {0}")]
    Image(#[from] image::ImageError),
    #[error("Not a base64 data URI")]
    NotDataUri,
    #[error("Invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Camera frame is empty or truncated")]
    EmptyFrame,
}
