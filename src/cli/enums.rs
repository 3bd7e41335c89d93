//! CLI enum types for filter and frame options.

use clap::ValueEnum;

use crate::raster::{FilterKind, FrameKind};

/// Color filter preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Filter {
    #[default]
    None,
    Grayscale,
    Sepia,
    Purple,
    Warm,
    Cool,
    Bright,
}

impl From<Filter> for FilterKind {
    fn from(f: Filter) -> Self {
        match f {
            Filter::None => FilterKind::None,
            Filter::Grayscale => FilterKind::Grayscale,
            Filter::Sepia => FilterKind::Sepia,
            Filter::Purple => FilterKind::Purple,
            Filter::Warm => FilterKind::Warm,
            Filter::Cool => FilterKind::Cool,
            Filter::Bright => FilterKind::Bright,
        }
    }
}

/// Frame decoration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Frame {
    #[default]
    None,
    Birthday,
}

impl From<Frame> for FrameKind {
    fn from(f: Frame) -> Self {
        match f {
            Frame::None => FrameKind::None,
            Frame::Birthday => FrameKind::Birthday,
        }
    }
}
