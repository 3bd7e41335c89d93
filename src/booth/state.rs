//! The capture state machine.

use std::fmt;

use crate::gallery::PhotoId;
use crate::raster::{FilterKind, FrameKind};

/// The still currently shown in place of the live preview.
#[derive(Debug, Clone, PartialEq)]
pub struct Still {
    pub photo_id: PhotoId,
    /// Encoded bytes as saved; never re-encoded by later selections
    pub image_data: String,
    /// Decoration the still is displayed with
    pub display_filter: FilterKind,
    pub display_frame: FrameKind,
}

/// Where the booth is in a capture.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CaptureState {
    /// Live preview (or nothing, if the camera is off)
    #[default]
    Idle,
    CountingDown {
        remaining: u8,
    },
    Flashing,
    Captured(Still),
}

/// [`CaptureState`] without its payload, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapturePhase {
    Idle,
    CountingDown(u8),
    Flashing,
    Captured,
}

impl fmt::Display for CapturePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapturePhase::Idle => write!(f, "idle"),
            CapturePhase::CountingDown(n) => write!(f, "counting down ({})", n),
            CapturePhase::Flashing => write!(f, "flashing"),
            CapturePhase::Captured => write!(f, "captured"),
        }
    }
}

/// Why a capture request was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// A countdown or flash is already running
    InProgress,
    /// No camera stream is active
    NoCamera,
    /// A still is displayed; retake first
    StillShowing,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::InProgress => write!(f, "a capture is already in progress"),
            Rejection::NoCamera => write!(f, "the camera is not running"),
            Rejection::StillShowing => write!(f, "a photo is displayed; retake first"),
        }
    }
}

impl CaptureState {
    pub fn phase(&self) -> CapturePhase {
        match self {
            CaptureState::Idle => CapturePhase::Idle,
            CaptureState::CountingDown { remaining } => CapturePhase::CountingDown(*remaining),
            CaptureState::Flashing => CapturePhase::Flashing,
            CaptureState::Captured(_) => CapturePhase::Captured,
        }
    }

    /// True while a capture sequence owns the booth.
    pub fn is_busy(&self) -> bool {
        matches!(self, CaptureState::CountingDown { .. } | CaptureState::Flashing)
    }

    /// Check whether `Idle -> CountingDown` is allowed right now.
    pub fn can_start(&self, camera_active: bool) -> Result<(), Rejection> {
        match self {
            CaptureState::CountingDown { .. } | CaptureState::Flashing => {
                Err(Rejection::InProgress)
            }
            CaptureState::Captured(_) => Err(Rejection::StillShowing),
            CaptureState::Idle if !camera_active => Err(Rejection::NoCamera),
            CaptureState::Idle => Ok(()),
        }
    }

    pub fn still(&self) -> Option<&Still> {
        match self {
            CaptureState::Captured(still) => Some(still),
            _ => None,
        }
    }
}
