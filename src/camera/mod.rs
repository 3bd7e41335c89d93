//! Camera access for the photobooth.
//!
//! - Device enumeration via [`list_devices`]
//! - The [`VideoSource`] seam the session drives
//! - [`StillImageSource`], a virtual camera serving one image
//! - [`NokhwaSource`], a real webcam (feature `native-camera`)

#[cfg(feature = "native-camera")]
mod capture;
#[cfg(feature = "native-camera")]
mod capture_loop;
mod device;
#[cfg(feature = "native-camera")]
mod frame_utils;
mod source;
mod types;

#[cfg(feature = "native-camera")]
pub use capture::{CameraCapture, NokhwaSource};
pub use device::list_devices;
pub use source::{NoDevice, StillImageSource, VideoSource};
pub use types::{
    CameraError, CameraInfo, CameraSettings, FacingMode, Frame, FrameFormat, Resolution,
    StreamConstraints,
};
