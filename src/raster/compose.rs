//! Frame grab and export compositing.

use ab_glyph::FontArc;
use image::imageops;
use image::RgbaImage;

use super::filter::{apply_filter, FilterKind};
use super::frame::{banners, FrameKind, FrameTexts};
use super::text::{draw_text_centered, fill_rect};
use super::{OverlaySize, Point, RasterError};
use crate::camera::Frame;

/// Glyph size of stickers in the exported raster.
pub const STICKER_PX: f32 = 50.0;
/// Stickers are drawn with their baseline this far below their mapped offset.
pub const STICKER_BASELINE: f32 = 40.0;

const WHITE: [u8; 3] = [255, 255, 255];
const BLACK: [u8; 3] = [0, 0, 0];

/// A sticker to stamp onto an export, positioned on the overlay surface.
#[derive(Debug, Clone, Copy)]
pub struct StickerStamp<'a> {
    pub glyph: &'a str,
    pub offset: Point,
}

/// What a composite actually drew. Text is skipped when no font is loaded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CompositeReport {
    pub banners: usize,
    pub banner_texts: usize,
    pub stickers: usize,
}

/// Sticker glyph colour: white over a decorated frame, black on a bare photo.
pub fn sticker_color(frame: FrameKind) -> [u8; 3] {
    match frame {
        FrameKind::None => BLACK,
        FrameKind::Birthday => WHITE,
    }
}

/// Grab a camera frame into a raster surface.
///
/// The frame is mirrored horizontally to match the mirrored live preview
/// and the filter is applied as it is drawn.
pub fn grab_still(frame: &Frame, filter: FilterKind) -> Result<RgbaImage, RasterError> {
    let mut still = frame.to_rgba().ok_or(RasterError::EmptyFrame)?;
    imageops::flip_horizontal_in_place(&mut still);
    apply_filter(&mut still, filter);
    Ok(still)
}

/// Map an overlay-surface offset proportionally into output pixels.
pub fn map_to_output(offset: Point, overlay: OverlaySize, width: u32, height: u32) -> Point {
    if overlay.width <= 0.0 || overlay.height <= 0.0 {
        return offset;
    }
    Point {
        x: offset.x / overlay.width * width as f32,
        y: offset.y / overlay.height * height as f32,
    }
}

/// Draws frame banners and stickers over photos.
#[derive(Clone, Default)]
pub struct Compositor {
    font: Option<FontArc>,
    texts: FrameTexts,
}

impl std::fmt::Debug for Compositor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compositor")
            .field("has_font", &self.font.is_some())
            .field("texts", &self.texts)
            .finish()
    }
}

impl Compositor {
    pub fn new(font: Option<FontArc>, texts: FrameTexts) -> Self {
        Self { font, texts }
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    /// Composite an export in place: filter, frame banners, then stickers.
    pub fn compose(
        &self,
        img: &mut RgbaImage,
        filter: FilterKind,
        frame: FrameKind,
        stickers: &[StickerStamp<'_>],
        overlay: OverlaySize,
    ) -> CompositeReport {
        let mut report = CompositeReport::default();
        let (width, height) = img.dimensions();

        apply_filter(img, filter);

        for banner in banners(frame, width, height, &self.texts) {
            fill_rect(img, banner.x, banner.y, banner.width, banner.height, banner.fill);
            report.banners += 1;
            if let Some(font) = &self.font {
                let drawn = draw_text_centered(
                    img,
                    font,
                    banner.font_px,
                    &banner.text,
                    banner.text_x,
                    banner.text_y,
                    WHITE,
                );
                if drawn > 0 {
                    report.banner_texts += 1;
                }
            }
        }

        let Some(font) = &self.font else {
            if !stickers.is_empty() {
                log::warn!("Skipping {} sticker(s): no font loaded", stickers.len());
            }
            return report;
        };
        let color = sticker_color(frame);
        for sticker in stickers {
            let at = map_to_output(sticker.offset, overlay, width, height);
            let drawn = draw_text_centered(
                img,
                font,
                STICKER_PX,
                sticker.glyph,
                at.x,
                at.y + STICKER_BASELINE,
                color,
            );
            if drawn > 0 {
                report.stickers += 1;
            } else {
                log::warn!("Font has no glyph for sticker {:?}", sticker.glyph);
            }
        }
        report
    }
}
