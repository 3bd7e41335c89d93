//! Data URI encoding for stored photos.

use std::io::Cursor;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use image::{ImageFormat, RgbaImage};

use super::RasterError;

/// Encode a raster as a `data:image/png;base64,...` URI.
pub fn encode_png(img: &RgbaImage) -> Result<String, RasterError> {
    Ok(encode_bytes(&png_bytes(img)?, "image/png"))
}

/// Encode a raster as raw PNG bytes.
pub fn png_bytes(img: &RgbaImage) -> Result<Vec<u8>, RasterError> {
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)?;
    Ok(buf)
}

pub fn encode_bytes(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Sniff the MIME type of an encoded image.
pub fn sniff_mime(bytes: &[u8]) -> Result<&'static str, RasterError> {
    Ok(image::guess_format(bytes)?.to_mime_type())
}

/// Split a base64 data URI into its MIME type and payload bytes.
pub fn decode(uri: &str) -> Result<(String, Vec<u8>), RasterError> {
    let rest = uri.strip_prefix("data:").ok_or(RasterError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(RasterError::NotDataUri)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(RasterError::NotDataUri)?;
    let bytes = STANDARD.decode(payload.trim())?;
    Ok((mime.to_string(), bytes))
}

/// Decode a data URI into an RGBA raster.
pub fn decode_image(uri: &str) -> Result<RgbaImage, RasterError> {
    let (_, bytes) = decode(uri)?;
    Ok(image::load_from_memory(&bytes)?.to_rgba8())
}
