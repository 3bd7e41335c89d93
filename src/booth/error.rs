//! Errors surfaced by the session.

use std::path::PathBuf;

use thiserror::Error;

use super::state::Rejection;
use crate::camera::CameraError;
use crate::gallery::PhotoId;
use crate::raster::RasterError;

#[derive(Debug, Error)]
pub enum BoothError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error("Capture refused: {0}")]
    Rejected(Rejection),
    #[error("The camera produced no frame to capture")]
    NoFrame,
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("No photo is displayed")]
    NothingToExport,
    #[error("Photo {0} not found")]
    PhotoNotFound(PhotoId),
    #[error("Failed to write '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Background task failed: {0}")]
    Task(String),
}
