//! Conversion from nokhwa buffers to our frame type.

use nokhwa::pixel_format::RgbFormat;
use std::time::Instant;

use super::types::{Frame, FrameFormat};

/// Convert a nokhwa buffer to our RGB Frame format.
///
/// nokhwa's `decode_image` handles the native camera formats (MJPEG, YUYV,
/// NV12). Returns `None` if the conversion fails.
pub fn convert_to_rgb(buffer: &nokhwa::Buffer) -> Option<Frame> {
    let decoded = buffer.decode_image::<RgbFormat>().ok()?;
    let resolution = buffer.resolution();

    Some(Frame {
        data: decoded.into_raw(),
        width: resolution.width(),
        height: resolution.height(),
        format: FrameFormat::Rgb,
        timestamp: Instant::now(),
    })
}
