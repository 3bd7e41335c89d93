//! Decorative frames and the banners they stamp onto exported photos.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Frame decoration selectable at the booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrameKind {
    #[default]
    None,
    Birthday,
}

impl FrameKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FrameKind::None => "none",
            FrameKind::Birthday => "birthday",
        }
    }
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FrameKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(FrameKind::None),
            "birthday" => Ok(FrameKind::Birthday),
            _ => Err(format!(
                "Unknown frame '{}'. Available frames: none, birthday",
                s
            )),
        }
    }
}

/// Banner texts for the birthday frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameTexts {
    pub top: String,
    pub bottom: String,
}

impl Default for FrameTexts {
    fn default() -> Self {
        Self {
            top: "🎂 Happy Birthday! 🎂".to_string(),
            bottom: "✨ Make a Wish ✨".to_string(),
        }
    }
}

/// One filled strip with centered text, in output pixel coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Banner {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
    /// Straight (non-premultiplied) RGBA fill
    pub fill: [u8; 4],
    pub text: String,
    pub font_px: f32,
    /// Horizontal center of the text
    pub text_x: f32,
    /// Text baseline
    pub text_y: f32,
}

const TOP_FILL: [u8; 4] = [255, 105, 180, 230];
const BOTTOM_FILL: [u8; 4] = [147, 112, 219, 230];

/// Banners to draw for `kind` on a `width` x `height` output.
///
/// Geometry is anchored to the horizontal center and to the top and bottom
/// edges, so it holds at any output size.
pub fn banners(kind: FrameKind, width: u32, height: u32, texts: &FrameTexts) -> Vec<Banner> {
    match kind {
        FrameKind::None => Vec::new(),
        FrameKind::Birthday => {
            let cx = i64::from(width) / 2;
            let h = i64::from(height);
            vec![
                Banner {
                    x: cx - 120,
                    y: 10,
                    width: 240,
                    height: 35,
                    fill: TOP_FILL,
                    text: texts.top.clone(),
                    font_px: 24.0,
                    text_x: width as f32 / 2.0,
                    text_y: 35.0,
                },
                Banner {
                    x: cx - 150,
                    y: h - 45,
                    width: 300,
                    height: 35,
                    fill: BOTTOM_FILL,
                    text: texts.bottom.clone(),
                    font_px: 20.0,
                    text_x: width as f32 / 2.0,
                    text_y: height as f32 - 20.0,
                },
            ]
        }
    }
}
