//! The video device seam used by the photobooth session.

use std::path::Path;
use std::time::Instant;

use image::RgbImage;

use super::types::{CameraError, Frame, FrameFormat, Resolution, StreamConstraints};

/// A live video capture device.
///
/// At most one stream is active per source. `stop` must release every
/// underlying track and is a no-op when nothing is streaming.
pub trait VideoSource: Send {
    /// Acquire a stream matching `constraints` and return its native resolution.
    fn start(&mut self, constraints: &StreamConstraints) -> Result<Resolution, CameraError>;

    fn stop(&mut self);

    fn is_streaming(&self) -> bool;

    /// The most recent frame, or `None` if the stream has not produced one.
    fn grab_frame(&self) -> Option<Frame>;
}

impl<V: VideoSource + ?Sized> VideoSource for Box<V> {
    fn start(&mut self, constraints: &StreamConstraints) -> Result<Resolution, CameraError> {
        (**self).start(constraints)
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_streaming(&self) -> bool {
        (**self).is_streaming()
    }

    fn grab_frame(&self) -> Option<Frame> {
        (**self).grab_frame()
    }
}

/// A source with no device behind it. Every start fails with
/// [`CameraError::NoDevices`].
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDevice;

impl VideoSource for NoDevice {
    fn start(&mut self, _constraints: &StreamConstraints) -> Result<Resolution, CameraError> {
        Err(CameraError::NoDevices)
    }

    fn stop(&mut self) {}

    fn is_streaming(&self) -> bool {
        false
    }

    fn grab_frame(&self) -> Option<Frame> {
        None
    }
}

/// A virtual camera that streams a single still image.
///
/// Used when no webcam is available (or compiled in) and in tests.
#[derive(Debug, Clone)]
pub struct StillImageSource {
    image: RgbImage,
    streaming: bool,
}

impl StillImageSource {
    pub fn new(image: RgbImage) -> Self {
        Self {
            image,
            streaming: false,
        }
    }

    /// Load the still from any image file the `image` crate can decode.
    pub fn from_path(path: &Path) -> Result<Self, CameraError> {
        let img = image::open(path)
            .map_err(|e| CameraError::OpenFailed(format!("{}: {}", path.display(), e)))?;
        Ok(Self::new(img.to_rgb8()))
    }

    /// A flat-colored stream, mostly useful for tests.
    pub fn solid(resolution: Resolution, rgb: [u8; 3]) -> Self {
        Self::new(RgbImage::from_pixel(
            resolution.width,
            resolution.height,
            image::Rgb(rgb),
        ))
    }
}

impl VideoSource for StillImageSource {
    fn start(&mut self, _constraints: &StreamConstraints) -> Result<Resolution, CameraError> {
        if self.streaming {
            return Err(CameraError::AlreadyRunning);
        }
        self.streaming = true;
        Ok(Resolution {
            width: self.image.width(),
            height: self.image.height(),
        })
    }

    fn stop(&mut self) {
        self.streaming = false;
    }

    fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn grab_frame(&self) -> Option<Frame> {
        if !self.streaming {
            return None;
        }
        Some(Frame {
            data: self.image.as_raw().clone(),
            width: self.image.width(),
            height: self.image.height(),
            format: FrameFormat::Rgb,
            timestamp: Instant::now(),
        })
    }
}
