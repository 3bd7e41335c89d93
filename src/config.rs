//! Configuration file handling for photobooth.
//!
//! Loads configuration from `~/.config/photobooth/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::booth::{CaptureTiming, SessionConfig};
use crate::camera::{FacingMode, Resolution, StreamConstraints};
use crate::gallery::{default_data_dir, DEFAULT_CAPACITY};
use crate::raster::{FrameTexts, OverlaySize};

/// Configuration file structure for photobooth.
#[derive(Debug, Deserialize, Default, Clone, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub capture: CaptureConfig,
    #[serde(default)]
    pub gallery: GalleryConfig,
    #[serde(default)]
    pub export: ExportConfig,
    #[serde(default)]
    pub frame: FrameConfig,
    #[serde(default)]
    pub overlay: OverlayConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    pub device: u32,
    pub width: u32,
    pub height: u32,
    pub fps: u32,
    /// Serve this image as a virtual camera instead of a real device
    pub virtual_image: Option<PathBuf>,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            device: 0,
            width: Resolution::HD.width,
            height: Resolution::HD.height,
            fps: 30,
            virtual_image: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CaptureConfig {
    #[serde(default = "default_countdown")]
    pub countdown_from: u8,
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
    #[serde(default = "default_flash_ms")]
    pub flash_ms: u64,
    #[serde(default = "default_true")]
    pub sound: bool,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            countdown_from: default_countdown(),
            tick_ms: default_tick_ms(),
            flash_ms: default_flash_ms(),
            sound: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GalleryConfig {
    pub capacity: usize,
    pub data_dir: Option<PathBuf>,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            data_dir: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ExportConfig {
    pub output_dir: Option<PathBuf>,
    pub filename_prefix: String,
    pub font_path: Option<PathBuf>,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            output_dir: None,
            filename_prefix: "birthday-photo".to_string(),
            font_path: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct FrameConfig {
    pub top_text: String,
    pub bottom_text: String,
}

impl Default for FrameConfig {
    fn default() -> Self {
        let texts = FrameTexts::default();
        Self {
            top_text: texts.top,
            bottom_text: texts.bottom,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    pub width: f32,
    pub height: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        let size = OverlaySize::default();
        Self {
            width: size.width,
            height: size.height,
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_countdown() -> u8 {
    3
}

fn default_tick_ms() -> u64 {
    1000
}

fn default_flash_ms() -> u64 {
    300
}

impl Config {
    /// Load configuration.
    ///
    /// With `Some(path)` the file must exist. With `None` the default path is
    /// used and a missing file yields the defaults. A file that exists but
    /// cannot be parsed is always an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, required) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (default_path(), false),
        };

        if !path.exists() {
            if required {
                return Err(ConfigError::NotFound { path });
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::IoError {
            path: path.clone(),
            source: e,
        })?;
        Self::parse(&content).map_err(|e| ConfigError::ParseError { path, source: e })
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            constraints: StreamConstraints {
                facing: FacingMode::User,
                resolution: Resolution {
                    width: self.camera.width,
                    height: self.camera.height,
                },
                audio: false,
            },
            timing: CaptureTiming {
                countdown_from: self.capture.countdown_from,
                tick: Duration::from_millis(self.capture.tick_ms),
                flash: Duration::from_millis(self.capture.flash_ms),
            },
            overlay: OverlaySize {
                width: self.overlay.width,
                height: self.overlay.height,
            },
            filename_prefix: self.export.filename_prefix.clone(),
        }
    }

    pub fn frame_texts(&self) -> FrameTexts {
        FrameTexts {
            top: self.frame.top_text.clone(),
            bottom: self.frame.bottom_text.clone(),
        }
    }

    pub fn data_dir(&self) -> PathBuf {
        self.gallery.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    /// Where exports and downloads go: configured, else the pictures
    /// directory, else the working directory.
    pub fn output_dir(&self) -> PathBuf {
        self.export
            .output_dir
            .clone()
            .or_else(|| dirs::picture_dir().map(|d| d.join("photobooth")))
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file '{}' not found", path.display())]
    NotFound { path: PathBuf },
    #[error("Failed to read config file '{}': {source}", path.display())]
    IoError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", path.display())]
    ParseError {
        path: PathBuf,
        source: toml::de::Error,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("photobooth").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/photobooth/config.toml")
        })
}

/// Written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# photobooth configuration

[camera]
# Camera device index (see `photobooth list-cameras`)
device = 0
# Requested stream size
width = 1280
height = 720
fps = 30
# Serve an image file as a virtual camera instead
# virtual_image = "/path/to/face.png"

[capture]
# Countdown starts here and ticks down to 1
countdown_from = 3
tick_ms = 1000
# How long the flash is held
flash_ms = 300
# Ring the terminal bell on ticks and shutter
sound = true

[gallery]
# Photos kept, newest first (at most 20)
capacity = 20
# data_dir = "/path/to/store"

[export]
# output_dir = "/path/to/pictures"
filename_prefix = "birthday-photo"
# Font for banner and sticker text (a system font is tried otherwise)
# font_path = "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf"

[frame]
top_text = "🎂 Happy Birthday! 🎂"
bottom_text = "✨ Make a Wish ✨"

[overlay]
# On-screen size sticker positions are given in
width = 640.0
height = 480.0
"#;
