//! Contact sheet rendering of the gallery.

use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};

use super::photo::CapturedPhoto;
use crate::raster::{apply_filter, data_uri};

/// Grid geometry for [`render_contact_sheet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetLayout {
    pub columns: u32,
    pub thumb_width: u32,
    pub thumb_height: u32,
    pub gap: u32,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            columns: 4,
            thumb_width: 240,
            thumb_height: 135,
            gap: 8,
        }
    }
}

const BACKGROUND: Rgba<u8> = Rgba([255, 240, 245, 255]);
const PLACEHOLDER: Rgba<u8> = Rgba([200, 200, 200, 255]);

/// Lay the photos out in a grid, newest first, each shown with its filter.
///
/// Returns `None` for an empty gallery. Entries whose image cannot be decoded
/// get a gray placeholder cell.
pub fn render_contact_sheet(photos: &[CapturedPhoto], layout: SheetLayout) -> Option<RgbaImage> {
    if photos.is_empty() {
        return None;
    }
    let columns = layout.columns.max(1);
    let count = photos.len() as u32;
    let rows = count.div_ceil(columns);
    let used_columns = count.min(columns);

    let width = used_columns * layout.thumb_width + (used_columns + 1) * layout.gap;
    let height = rows * layout.thumb_height + (rows + 1) * layout.gap;
    let mut sheet = RgbaImage::from_pixel(width, height, BACKGROUND);

    for (i, photo) in photos.iter().enumerate() {
        let i = i as u32;
        let cell_x = layout.gap + (i % columns) * (layout.thumb_width + layout.gap);
        let cell_y = layout.gap + (i / columns) * (layout.thumb_height + layout.gap);

        match data_uri::decode_image(&photo.image_data) {
            Ok(mut img) => {
                apply_filter(&mut img, photo.filter);
                let thumb = fit_within(&img, layout.thumb_width, layout.thumb_height);
                let dx = (layout.thumb_width - thumb.width()) / 2;
                let dy = (layout.thumb_height - thumb.height()) / 2;
                imageops::overlay(
                    &mut sheet,
                    &thumb,
                    i64::from(cell_x + dx),
                    i64::from(cell_y + dy),
                );
            }
            Err(e) => {
                log::warn!("Photo {} could not be decoded: {}", photo.id, e);
                let cell = RgbaImage::from_pixel(layout.thumb_width, layout.thumb_height, PLACEHOLDER);
                imageops::replace(&mut sheet, &cell, i64::from(cell_x), i64::from(cell_y));
            }
        }
    }
    Some(sheet)
}

/// Scale down (never up) to fit the box, keeping the aspect ratio.
fn fit_within(img: &RgbaImage, max_w: u32, max_h: u32) -> RgbaImage {
    let (w, h) = img.dimensions();
    if w <= max_w && h <= max_h {
        return img.clone();
    }
    let scale = (max_w as f32 / w as f32).min(max_h as f32 / h as f32);
    let nw = ((w as f32 * scale).round() as u32).clamp(1, max_w);
    let nh = ((h as f32 * scale).round() as u32).clamp(1, max_h);
    imageops::resize(img, nw, nh, FilterType::Triangle)
}
