//! Camera device enumeration.

use super::types::{CameraError, CameraInfo};

/// List all available camera devices on the system.
///
/// Returns a vector of `CameraInfo` structs, or an error if querying fails.
/// If no cameras are found, returns an empty vector (not an error).
#[cfg(feature = "native-camera")]
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    use nokhwa::query;
    use nokhwa::utils::ApiBackend;

    let devices = query(ApiBackend::Auto).map_err(|e| CameraError::QueryFailed(e.to_string()))?;

    Ok(devices
        .into_iter()
        .map(|d| CameraInfo {
            index: d.index().as_index().unwrap_or(0),
            name: d.human_name(),
            description: d.description().to_string(),
        })
        .collect())
}

/// Without a native backend there is nothing to enumerate.
#[cfg(not(feature = "native-camera"))]
pub fn list_devices() -> Result<Vec<CameraInfo>, CameraError> {
    Err(CameraError::Unsupported)
}
