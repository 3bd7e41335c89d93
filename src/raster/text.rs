//! Font loading and blended drawing primitives.

use std::path::{Path, PathBuf};

use ab_glyph::{point, Font, FontArc, GlyphId, PxScale, ScaleFont};
use image::RgbaImage;

/// Fonts tried, in order, when no font is configured.
const FALLBACK_FONTS: &[&str] = &[
    "/System/Library/Fonts/Helvetica.ttc",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// Load the configured font, or the first system fallback that parses.
///
/// Returns `None` when nothing usable is found; callers then skip text.
pub fn load_font(configured: Option<&Path>) -> Option<FontArc> {
    let candidates: Vec<PathBuf> = match configured {
        Some(path) => vec![path.to_path_buf()],
        None => FALLBACK_FONTS.iter().map(PathBuf::from).collect(),
    };

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        match FontArc::try_from_vec(bytes) {
            Ok(font) => {
                log::debug!("Using font {}", path.display());
                return Some(font);
            }
            Err(e) => log::warn!("Ignoring unparsable font {}: {}", path.display(), e),
        }
    }

    log::warn!("No usable font found; banner and sticker text will be skipped");
    None
}

/// Alpha-blend `rgb` over the pixel at `(x, y)` with opacity `alpha`.
/// Out-of-bounds coordinates are ignored.
pub fn blend_pixel(img: &mut RgbaImage, x: i64, y: i64, rgb: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 || x >= i64::from(img.width()) || y >= i64::from(img.height()) {
        return;
    }
    let a = alpha.clamp(0.0, 1.0);
    let px = img.get_pixel_mut(x as u32, y as u32);
    for i in 0..3 {
        let dst = px[i] as f32;
        px[i] = (rgb[i] as f32 * a + dst * (1.0 - a)).round() as u8;
    }
    let da = px[3] as f32 / 255.0;
    px[3] = ((a + da * (1.0 - a)) * 255.0).round() as u8;
}

/// Fill a rectangle with a translucent color, clipped to the image.
pub fn fill_rect(img: &mut RgbaImage, x: i64, y: i64, width: u32, height: u32, rgba: [u8; 4]) {
    let alpha = rgba[3] as f32 / 255.0;
    let rgb = [rgba[0], rgba[1], rgba[2]];
    let x0 = x.max(0);
    let y0 = y.max(0);
    let x1 = (x + i64::from(width)).min(i64::from(img.width()));
    let y1 = (y + i64::from(height)).min(i64::from(img.height()));
    for py in y0..y1 {
        for px in x0..x1 {
            blend_pixel(img, px, py, rgb, alpha);
        }
    }
}

/// Draw `text` horizontally centered on `center_x` with its baseline at
/// `baseline_y`.
///
/// Characters the font has no glyph for (color emoji in outline fonts) are
/// skipped. Returns how many glyphs were laid out.
pub fn draw_text_centered(
    img: &mut RgbaImage,
    font: &FontArc,
    px_size: f32,
    text: &str,
    center_x: f32,
    baseline_y: f32,
    rgb: [u8; 3],
) -> usize {
    let scale = PxScale::from(px_size);
    let scaled = font.as_scaled(scale);

    let mut laid_out = Vec::new();
    let mut caret = 0.0f32;
    let mut prev: Option<GlyphId> = None;
    for ch in text.chars() {
        let id = font.glyph_id(ch);
        if id.0 == 0 {
            continue;
        }
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        laid_out.push((id, caret));
        caret += scaled.h_advance(id);
        prev = Some(id);
    }

    let origin_x = center_x - caret / 2.0;
    for &(id, offset) in &laid_out {
        let glyph = id.with_scale_and_position(scale, point(origin_x + offset, baseline_y));
        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                blend_pixel(
                    img,
                    bounds.min.x as i64 + i64::from(gx),
                    bounds.min.y as i64 + i64::from(gy),
                    rgb,
                    coverage,
                );
            });
        }
    }
    laid_out.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_fill_rect_blends_and_clips() {
        let mut img = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        fill_rect(&mut img, 2, 2, 10, 10, [255, 255, 255, 128]);
        assert_eq!(img.get_pixel(0, 0).0, [0, 0, 0, 255]);
        let p = img.get_pixel(3, 3).0;
        assert_eq!(p[0], 128);
        assert_eq!(p[3], 255);
    }

    #[test]
    fn test_fill_rect_fully_outside_is_noop() {
        let mut img = RgbaImage::from_pixel(2, 2, Rgba([5, 5, 5, 255]));
        fill_rect(&mut img, -20, -20, 5, 5, [255, 0, 0, 255]);
        fill_rect(&mut img, 3, 0, 5, 5, [255, 0, 0, 255]);
        assert!(img.pixels().all(|p| p.0 == [5, 5, 5, 255]));
    }

    #[test]
    fn test_blend_pixel_opaque_replaces() {
        let mut img = RgbaImage::from_pixel(1, 1, Rgba([0, 0, 0, 0]));
        blend_pixel(&mut img, 0, 0, [10, 20, 30], 1.0);
        assert_eq!(img.get_pixel(0, 0).0, [10, 20, 30, 255]);
    }

    #[test]
    fn test_missing_configured_font_yields_none() {
        assert!(load_font(Some(Path::new("/definitely/not/a/font.ttf"))).is_none());
    }
}
