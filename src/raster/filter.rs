//! Color filters applied at draw time.
//!
//! Each preset is a chain of CSS-style filter primitives evaluated with the
//! Filter Effects matrices. Every primitive clamps to `[0, 1]` before the
//! next one runs.

use std::fmt;
use std::str::FromStr;

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Filter preset selectable at the booth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FilterKind {
    #[default]
    None,
    Grayscale,
    Sepia,
    Purple,
    Warm,
    Cool,
    Bright,
}

impl FilterKind {
    pub const ALL: [FilterKind; 7] = [
        FilterKind::None,
        FilterKind::Grayscale,
        FilterKind::Sepia,
        FilterKind::Purple,
        FilterKind::Warm,
        FilterKind::Cool,
        FilterKind::Bright,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FilterKind::None => "none",
            FilterKind::Grayscale => "grayscale",
            FilterKind::Sepia => "sepia",
            FilterKind::Purple => "purple",
            FilterKind::Warm => "warm",
            FilterKind::Cool => "cool",
            FilterKind::Bright => "bright",
        }
    }

    /// The primitive chain for this preset.
    pub fn ops(self) -> &'static [FilterOp] {
        match self {
            FilterKind::None => &[],
            FilterKind::Grayscale => &[FilterOp::Grayscale(1.0)],
            FilterKind::Sepia => &[FilterOp::Sepia(0.8)],
            FilterKind::Purple => &[FilterOp::HueRotate(270.0), FilterOp::Saturate(1.5)],
            FilterKind::Warm => &[FilterOp::Sepia(0.3), FilterOp::Saturate(1.4)],
            FilterKind::Cool => &[FilterOp::HueRotate(180.0), FilterOp::Saturate(0.8)],
            FilterKind::Bright => &[FilterOp::Brightness(1.2), FilterOp::Contrast(1.1)],
        }
    }

    /// CSS `filter` value equivalent to [`ops`](Self::ops).
    pub fn css(self) -> String {
        let ops = self.ops();
        if ops.is_empty() {
            return "none".to_string();
        }
        ops.iter()
            .map(FilterOp::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FilterKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FilterKind::ALL
            .into_iter()
            .find(|k| k.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!(
                    "Unknown filter '{}'. Available filters: none, grayscale, sepia, purple, warm, cool, bright",
                    s
                )
            })
    }
}

/// A single filter primitive. Amounts follow CSS units (1.0 = 100%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Grayscale(f32),
    Sepia(f32),
    Saturate(f32),
    /// Degrees
    HueRotate(f32),
    Brightness(f32),
    Contrast(f32),
}

type Matrix = [[f32; 3]; 3];

impl FilterOp {
    /// Apply to one pixel in linear `[0, 1]` channel space.
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = match *self {
            FilterOp::Grayscale(a) => mul(&grayscale_matrix(a), rgb),
            FilterOp::Sepia(a) => mul(&sepia_matrix(a), rgb),
            FilterOp::Saturate(s) => mul(&saturate_matrix(s), rgb),
            FilterOp::HueRotate(deg) => mul(&hue_rotate_matrix(deg), rgb),
            FilterOp::Brightness(b) => rgb.map(|c| c * b),
            FilterOp::Contrast(c) => rgb.map(|v| (v - 0.5) * c + 0.5),
        };
        out.map(|c| c.clamp(0.0, 1.0))
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Grayscale(a) => write!(f, "grayscale({}%)", a * 100.0),
            FilterOp::Sepia(a) => write!(f, "sepia({}%)", a * 100.0),
            FilterOp::Saturate(s) => write!(f, "saturate({})", s),
            FilterOp::HueRotate(d) => write!(f, "hue-rotate({}deg)", d),
            FilterOp::Brightness(b) => write!(f, "brightness({})", b),
            FilterOp::Contrast(c) => write!(f, "contrast({})", c),
        }
    }
}

fn mul(m: &Matrix, v: [f32; 3]) -> [f32; 3] {
    [
        m[0][0] * v[0] + m[0][1] * v[1] + m[0][2] * v[2],
        m[1][0] * v[0] + m[1][1] * v[1] + m[1][2] * v[2],
        m[2][0] * v[0] + m[2][1] * v[1] + m[2][2] * v[2],
    ]
}

fn grayscale_matrix(amount: f32) -> Matrix {
    let a = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.2126 + 0.7874 * a, 0.7152 - 0.7152 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 + 0.2848 * a, 0.0722 - 0.0722 * a],
        [0.2126 - 0.2126 * a, 0.7152 - 0.7152 * a, 0.0722 + 0.9278 * a],
    ]
}

fn sepia_matrix(amount: f32) -> Matrix {
    let a = 1.0 - amount.clamp(0.0, 1.0);
    [
        [0.393 + 0.607 * a, 0.769 - 0.769 * a, 0.189 - 0.189 * a],
        [0.349 - 0.349 * a, 0.686 + 0.314 * a, 0.168 - 0.168 * a],
        [0.272 - 0.272 * a, 0.534 - 0.534 * a, 0.131 + 0.869 * a],
    ]
}

fn saturate_matrix(s: f32) -> Matrix {
    [
        [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
        [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
    ]
}

fn hue_rotate_matrix(degrees: f32) -> Matrix {
    let (sin, cos) = degrees.to_radians().sin_cos();
    [
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ]
}

/// Apply a filter preset to every pixel in place. Alpha is untouched.
pub fn apply_filter(img: &mut RgbaImage, kind: FilterKind) {
    let ops = kind.ops();
    if ops.is_empty() {
        return;
    }
    for px in img.pixels_mut() {
        let mut rgb = [
            px[0] as f32 / 255.0,
            px[1] as f32 / 255.0,
            px[2] as f32 / 255.0,
        ];
        for op in ops {
            rgb = op.apply(rgb);
        }
        px[0] = (rgb[0] * 255.0).round() as u8;
        px[1] = (rgb[1] * 255.0).round() as u8;
        px[2] = (rgb[2] * 255.0).round() as u8;
    }
}
