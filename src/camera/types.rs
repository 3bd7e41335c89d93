//! Camera types and data structures.

use std::fmt;
use std::time::Instant;

use image::RgbaImage;
use thiserror::Error;

/// Information about an available camera device.
#[derive(Debug, Clone)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Human-readable device name
    pub name: String,
    /// Device description
    pub description: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({})", self.index, self.name, self.description)
    }
}

/// Camera resolution settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// 640x480, the fallback when a device reports nothing better
    pub const VGA: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// 1280x720, the photobooth's target stream size
    pub const HD: Resolution = Resolution {
        width: 1280,
        height: 720,
    };
}

impl Default for Resolution {
    fn default() -> Self {
        Self::HD
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Which way the requested camera should face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FacingMode {
    /// Front camera, facing the person at the booth
    #[default]
    User,
    /// Rear camera
    Environment,
}

/// Constraint set passed to a [`VideoSource`](super::VideoSource) when a
/// stream is requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    pub resolution: Resolution,
    pub audio: bool,
}

impl Default for StreamConstraints {
    fn default() -> Self {
        Self {
            facing: FacingMode::User,
            resolution: Resolution::HD,
            audio: false,
        }
    }
}

/// Pixel format of a captured frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameFormat {
    /// RGB format (3 bytes per pixel)
    Rgb,
}

/// A captured camera frame.
#[derive(Debug, Clone)]
pub struct Frame {
    /// Raw pixel data in RGB format
    pub data: Vec<u8>,
    /// Frame width in pixels
    pub width: u32,
    /// Frame height in pixels
    pub height: u32,
    /// Pixel format
    pub format: FrameFormat,
    /// Timestamp when frame was captured
    pub timestamp: Instant,
}

impl Frame {
    /// Get the number of bytes per pixel (3 for RGB).
    pub fn bytes_per_pixel(&self) -> usize {
        match self.format {
            FrameFormat::Rgb => 3,
        }
    }

    /// Copy the frame into an RGBA raster surface at its native resolution.
    ///
    /// Returns `None` when the buffer is shorter than `width * height` pixels.
    pub fn to_rgba(&self) -> Option<RgbaImage> {
        let bpp = self.bytes_per_pixel();
        let expected = self.width as usize * self.height as usize * bpp;
        if self.data.len() < expected {
            return None;
        }

        let mut rgba = Vec::with_capacity(self.width as usize * self.height as usize * 4);
        for px in self.data[..expected].chunks_exact(bpp) {
            rgba.extend_from_slice(&[px[0], px[1], px[2], 255]);
        }
        RgbaImage::from_raw(self.width, self.height, rgba)
    }
}

/// Settings for the native capture thread.
#[derive(Debug, Clone)]
pub struct CameraSettings {
    /// Camera device index
    pub device_index: u32,
    /// Capture resolution
    pub resolution: Resolution,
    /// Target FPS (actual may vary)
    pub fps: u32,
}

impl Default for CameraSettings {
    fn default() -> Self {
        Self {
            device_index: 0,
            resolution: Resolution::default(),
            fps: 30,
        }
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// No cameras found on the system
    #[error("No cameras found")]
    NoDevices,
    /// Failed to query camera devices
    #[error("Failed to query cameras: {0}")]
    QueryFailed(String),
    /// Failed to open camera
    #[error("Failed to open camera: {0}")]
    OpenFailed(String),
    /// Camera permission denied
    #[error(
        "Camera permission denied. Make sure this program is allowed to use the camera \
         (on macOS: System Settings > Privacy & Security > Camera)"
    )]
    PermissionDenied,
    /// Camera device not found at specified index
    #[error("Camera device {0} not found. Run 'list-cameras' to see available devices")]
    DeviceNotFound(u32),
    /// Failed to start video stream
    #[error("Failed to start camera stream: {0}")]
    StreamFailed(String),
    /// A stream is already active
    #[error("Camera is already running")]
    AlreadyRunning,
    /// Built without a backend for real devices
    #[error("Native camera support is not compiled in (rebuild with --features native-camera)")]
    Unsupported,
}
