//! Subcommand handlers.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;

use super::args::{ConfigAction, GalleryAction, LookArgs, StickerArg};
use crate::booth::{
    download_photo, BoothError, BoothEvents, CapturePhase, PhotoboothSession, Tone, STICKER_BOX,
};
use crate::camera::{self, CameraError, NoDevice, Resolution, StillImageSource, VideoSource};
use crate::config::{default_path, Config, ConfigError, DEFAULT_CONFIG};
use crate::gallery::{
    render_contact_sheet, CapturedPhoto, Confirm, DeleteOutcome, FileStore, Gallery,
    KeyValueStore, SheetLayout, EMPTY_MESSAGE, STORAGE_KEY,
};
use crate::raster::{data_uri, text::load_font, Compositor, Point, RasterError};

/// Errors reported by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Booth(#[from] BoothError),
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Raster(#[from] RasterError),
    #[error("Failed to read '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("{0}")]
    Message(String),
}

/// Prints session signals to the terminal.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleEvents {
    sound: bool,
}

impl ConsoleEvents {
    pub fn new(sound: bool) -> Self {
        Self { sound }
    }
}

impl BoothEvents for ConsoleEvents {
    fn on_camera(&self, active: bool, resolution: Option<Resolution>) {
        match (active, resolution) {
            (true, Some(res)) => println!("Camera on ({})", res),
            (true, None) => println!("Camera on"),
            (false, _) => log::debug!("Camera off"),
        }
    }

    fn on_phase(&self, phase: CapturePhase) {
        match phase {
            CapturePhase::CountingDown(n) => println!("  {}...", n),
            CapturePhase::Captured => println!("  📸"),
            CapturePhase::Idle | CapturePhase::Flashing => {}
        }
    }

    fn on_tone(&self, _tone: &Tone) {
        if self.sound {
            // Terminal bell
            print!("\x07");
            let _ = std::io::stdout().flush();
        }
    }

    fn on_flash(&self, on: bool) {
        if on {
            println!("  *flash*");
        }
    }

    fn on_captured(&self, photo: &CapturedPhoto) {
        println!("Saved photo {} to the gallery", photo.id);
    }

    fn on_gallery_changed(&self, count: usize) {
        log::debug!("Gallery now holds {} photo(s)", count);
    }

    fn on_notice(&self, message: &str) {
        eprintln!("{}", message);
    }
}

/// Asks on stdin; anything but y/yes declines.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdinConfirm;

impl Confirm for StdinConfirm {
    fn confirm(&self, prompt: &str) -> bool {
        print!("{} [y/N] ", prompt);
        let _ = std::io::stdout().flush();
        let mut line = String::new();
        if std::io::stdin().lock().read_line(&mut line).is_err() {
            return false;
        }
        matches!(line.trim().to_lowercase().as_str(), "y" | "yes")
    }
}

/// Load the config. An explicit path must load; a broken default file only
/// warns and falls back to defaults.
pub fn load_config(path: Option<&Path>) -> Result<Config, CliError> {
    match path {
        Some(p) => Ok(Config::load(Some(p))?),
        None => match Config::load(None) {
            Ok(c) => Ok(c),
            Err(e) => {
                eprintln!("Warning: {}", e);
                eprintln!("Using default settings.\n");
                Ok(Config::default())
            }
        },
    }
}

/// List available cameras and print them to stdout.
pub fn list_cameras() -> Result<(), CliError> {
    let devices = camera::list_devices()?;
    if devices.is_empty() {
        println!("No cameras found.");
        println!();
        println!("Make sure your camera is connected and permissions are granted.");
        println!("Use --virtual-camera <IMAGE> to snap from an image file instead.");
    } else {
        println!("Available cameras:");
        for device in devices {
            println!("  {}", device);
        }
        println!();
        println!("Use --camera <index> to select a camera.");
    }
    Ok(())
}

fn open_gallery(cfg: &Config) -> Gallery<FileStore> {
    Gallery::load_with(
        FileStore::new(cfg.data_dir()),
        STORAGE_KEY,
        cfg.gallery.capacity,
    )
}

fn build_session<V: VideoSource>(
    cfg: &Config,
    source: V,
    events: Arc<dyn BoothEvents>,
) -> PhotoboothSession<V, FileStore> {
    let compositor = Compositor::new(load_font(cfg.export.font_path.as_deref()), cfg.frame_texts());
    PhotoboothSession::new(source, open_gallery(cfg), compositor, cfg.session_config())
        .with_events(events)
}

/// Pick the camera: a virtual image when one is given, else a real device.
fn open_source(
    cfg: &Config,
    device: Option<u32>,
    virtual_camera: Option<&Path>,
) -> Result<Box<dyn VideoSource>, CliError> {
    let image = virtual_camera
        .map(Path::to_path_buf)
        .or_else(|| cfg.camera.virtual_image.clone());
    if let Some(path) = image {
        log::info!("Using {} as a virtual camera", path.display());
        return Ok(Box::new(StillImageSource::from_path(&path)?));
    }
    native_source(device.unwrap_or(cfg.camera.device), cfg.camera.fps)
}

#[cfg(feature = "native-camera")]
fn native_source(device: u32, fps: u32) -> Result<Box<dyn VideoSource>, CliError> {
    Ok(Box::new(camera::NokhwaSource::new(device, fps)))
}

#[cfg(not(feature = "native-camera"))]
fn native_source(_device: u32, _fps: u32) -> Result<Box<dyn VideoSource>, CliError> {
    Err(CameraError::Unsupported.into())
}

/// Start the camera, run one countdown capture, then decorate and export.
pub async fn snap(
    cfg: &Config,
    device: Option<u32>,
    virtual_camera: Option<&Path>,
    look: &LookArgs,
    no_sound: bool,
) -> Result<(), CliError> {
    let source = open_source(cfg, device, virtual_camera)?;
    let events = Arc::new(ConsoleEvents::new(cfg.capture.sound && !no_sound));
    let session = build_session(cfg, source, events);
    session.select_filter(look.filter.into());
    session.select_frame(look.frame.into());

    session.start_camera()?;
    let captured = session.capture().await;
    session.stop_camera();
    captured?;

    finish(&session, cfg, look).await
}

/// Show an image file as the photo, save it, then decorate and export.
pub async fn upload(cfg: &Config, path: &Path, look: &LookArgs) -> Result<(), CliError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let events = Arc::new(ConsoleEvents::new(false));
    let session = build_session(cfg, NoDevice, events);
    session.select_filter(look.filter.into());
    session.select_frame(look.frame.into());

    let photo = session.upload(bytes).await?;
    println!("Saved photo {} to the gallery", photo.id);

    finish(&session, cfg, look).await
}

async fn finish<V: VideoSource, S: KeyValueStore>(
    session: &PhotoboothSession<V, S>,
    cfg: &Config,
    look: &LookArgs,
) -> Result<(), CliError> {
    for sticker in &look.sticker {
        place_sticker(session, sticker);
    }
    if look.no_export {
        return Ok(());
    }

    let dir = look.out.clone().unwrap_or_else(|| cfg.output_dir());
    let exported = session.export(&dir).await?;
    println!("Exported {}", exported.path.display());

    let report = exported.report;
    if report.banner_texts < report.banners || report.stickers < look.sticker.len() {
        eprintln!("Note: no usable font was found, so text and stickers were left out.");
        eprintln!("Set export.font_path in the config file to fix this.");
    }
    Ok(())
}

/// Add a sticker at the center, then drag it into place like a pointer would.
pub fn place_sticker<V: VideoSource, S: KeyValueStore>(
    session: &PhotoboothSession<V, S>,
    sticker: &StickerArg,
) {
    let id = session.add_sticker(&sticker.glyph);
    let Some(target) = sticker.at else {
        return;
    };
    let half = STICKER_BOX / 2.0;
    let Some(start) = session
        .stickers()
        .into_iter()
        .find(|s| s.id == id)
        .map(|s| Point::new(s.position.x + half, s.position.y + half))
    else {
        return;
    };
    if session.pointer_down(start) == Some(id) {
        session.pointer_move(Point::new(target.x + half, target.y + half));
    }
    session.pointer_up();
}

/// Handle gallery subcommand actions.
pub fn handle_gallery_action(cfg: &Config, action: GalleryAction) -> Result<(), CliError> {
    let mut gallery = open_gallery(cfg);
    match action {
        GalleryAction::List => {
            if gallery.is_empty() {
                println!("{}", EMPTY_MESSAGE);
                return Ok(());
            }
            println!("Photos ({} of {}):", gallery.len(), gallery.capacity());
            for photo in gallery.photos() {
                println!(
                    "  {}  {}  filter={} frame={}",
                    photo.id,
                    photo.captured_at.format("%Y-%m-%d %H:%M:%S"),
                    photo.filter,
                    photo.frame
                );
            }
        }
        GalleryAction::Show { id } => {
            let photo = gallery.get(id).ok_or(BoothError::PhotoNotFound(id))?;
            println!("Photo {}", photo.id);
            println!("  Taken:  {}", photo.captured_at.to_rfc3339());
            println!("  Filter: {}", photo.filter);
            println!("  Frame:  {}", photo.frame);
            match data_uri::decode(&photo.image_data) {
                Ok((mime, bytes)) => {
                    println!("  Type:   {} ({} bytes)", mime, bytes.len());
                    if let Ok(img) = data_uri::decode_image(&photo.image_data) {
                        println!("  Size:   {}x{}", img.width(), img.height());
                    }
                }
                Err(e) => println!("  Image:  unreadable ({})", e),
            }
        }
        GalleryAction::Download { id, out } => {
            let photo = gallery.get(id).ok_or(BoothError::PhotoNotFound(id))?;
            let dir = out.unwrap_or_else(|| cfg.output_dir());
            let path = download_photo(photo, &dir, &cfg.export.filename_prefix)?;
            println!("Saved {}", path.display());
        }
        GalleryAction::Delete { id, yes } => {
            let outcome = if yes {
                gallery.delete(id, &|_: &str| true)
            } else {
                gallery.delete(id, &StdinConfirm)
            };
            match outcome {
                DeleteOutcome::Deleted => println!("Deleted photo {}", id),
                DeleteOutcome::Cancelled => println!("Kept photo {}", id),
                DeleteOutcome::NotFound => return Err(BoothError::PhotoNotFound(id).into()),
            }
        }
        GalleryAction::Sheet { out, columns } => {
            let layout = SheetLayout {
                columns,
                ..SheetLayout::default()
            };
            match render_contact_sheet(gallery.photos(), layout) {
                Some(sheet) => {
                    sheet.save(&out).map_err(RasterError::from)?;
                    println!("Wrote {}", out.display());
                }
                None => println!("{}", EMPTY_MESSAGE),
            }
        }
    }
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, explicit: Option<&Path>) -> Result<(), CliError> {
    let config_path = explicit.map(Path::to_path_buf).unwrap_or_else(default_path);
    match action {
        ConfigAction::Show => {
            let cfg = load_config(explicit)?;
            println!("Current configuration:");
            match &cfg.camera.virtual_image {
                Some(path) => println!("  Camera: virtual ({})", path.display()),
                None => println!("  Camera: {}", cfg.camera.device),
            }
            println!(
                "  Stream: {}x{} @ {} fps",
                cfg.camera.width, cfg.camera.height, cfg.camera.fps
            );
            println!(
                "  Countdown: {} x {} ms, flash {} ms",
                cfg.capture.countdown_from, cfg.capture.tick_ms, cfg.capture.flash_ms
            );
            println!("  Sound: {}", if cfg.capture.sound { "yes" } else { "no" });
            println!("  Gallery: {} photos in {}", cfg.gallery.capacity, cfg.data_dir().display());
            println!("  Exports: {}", cfg.output_dir().display());
            println!("  Frame text: {} / {}", cfg.frame.top_text, cfg.frame.bottom_text);
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(CliError::Message(format!(
                    "Config file already exists: {}\nUse 'photobooth config show' to view current settings.",
                    config_path.display()
                )));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    CliError::Message(format!("Error creating config directory: {}", e))
                })?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG)
                .map_err(|e| CliError::Message(format!("Error writing config file: {}", e)))?;

            println!("Created config file: {}", config_path.display());
        }
    }
    Ok(())
}
