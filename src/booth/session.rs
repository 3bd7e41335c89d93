//! The photobooth session controller.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chrono::Utc;

use super::error::BoothError;
use super::events::{BoothEvents, NoEvents, Tone};
use super::state::{CapturePhase, CaptureState, Rejection, Still};
use super::stickers::{PlacedSticker, StickerBoard, StickerId};
use crate::camera::{CameraError, Resolution, StreamConstraints, VideoSource};
use crate::gallery::{
    render_contact_sheet, CapturedPhoto, Confirm, DeleteOutcome, Gallery, KeyValueStore, PhotoId,
    SheetLayout,
};
use crate::raster::{
    data_uri, grab_still, CompositeReport, Compositor, FilterKind, FrameKind, OverlaySize, Point,
    RasterError, StickerStamp,
};

/// Countdown and flash timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CaptureTiming {
    /// First number shown; the countdown runs down to 1
    pub countdown_from: u8,
    pub tick: Duration,
    pub flash: Duration,
}

impl Default for CaptureTiming {
    fn default() -> Self {
        Self {
            countdown_from: 3,
            tick: Duration::from_secs(1),
            flash: Duration::from_millis(300),
        }
    }
}

/// Static settings of a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub constraints: StreamConstraints,
    pub timing: CaptureTiming,
    /// On-screen size of the sticker overlay
    pub overlay: OverlaySize,
    /// Prefix of downloaded file names
    pub filename_prefix: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            constraints: StreamConstraints::default(),
            timing: CaptureTiming::default(),
            overlay: OverlaySize::default(),
            filename_prefix: "birthday-photo".to_string(),
        }
    }
}

/// A finished export.
#[derive(Debug, Clone)]
pub struct Exported {
    pub path: PathBuf,
    pub report: CompositeReport,
}

#[derive(Debug, Default)]
struct SessionState {
    capture: CaptureState,
    filter: FilterKind,
    frame: FrameKind,
    /// Present while a camera stream is active
    stream: Option<Resolution>,
}

/// Owns the camera, the capture state machine, placed stickers, and the
/// gallery for one booth session.
///
/// All methods take `&self`. State sits behind short-lived locks that are
/// never held across an await, so a capture can run on one task while
/// another task stops the camera or edits stickers.
pub struct PhotoboothSession<V, S> {
    camera: Mutex<V>,
    state: Mutex<SessionState>,
    gallery: Mutex<Gallery<S>>,
    stickers: Mutex<StickerBoard>,
    compositor: Compositor,
    config: SessionConfig,
    events: Arc<dyn BoothEvents>,
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Returns an unfinished capture sequence to `Idle` when it is dropped.
///
/// Finished sequences have already left the busy states, so this is a no-op
/// for them.
struct CaptureReset<'a> {
    state: &'a Mutex<SessionState>,
    events: &'a dyn BoothEvents,
}

impl Drop for CaptureReset<'_> {
    fn drop(&mut self) {
        let was_flashing = {
            let mut state = lock(self.state);
            if !state.capture.is_busy() {
                return;
            }
            let flashing = matches!(state.capture, CaptureState::Flashing);
            state.capture = CaptureState::Idle;
            flashing
        };
        log::debug!("Capture abandoned, back to idle");
        if was_flashing {
            self.events.on_flash(false);
        }
        self.events.on_phase(CapturePhase::Idle);
    }
}

impl<V: VideoSource, S: KeyValueStore> PhotoboothSession<V, S> {
    pub fn new(camera: V, gallery: Gallery<S>, compositor: Compositor, config: SessionConfig) -> Self {
        Self {
            camera: Mutex::new(camera),
            state: Mutex::new(SessionState::default()),
            gallery: Mutex::new(gallery),
            stickers: Mutex::new(StickerBoard::new()),
            compositor,
            config,
            events: Arc::new(NoEvents),
        }
    }

    pub fn with_events(mut self, events: Arc<dyn BoothEvents>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    // ---- camera lifecycle ----

    /// Acquire the camera stream.
    ///
    /// On failure the error is also raised as a notice and the session is
    /// left exactly as it was.
    pub fn start_camera(&self) -> Result<Resolution, BoothError> {
        if lock(&self.state).stream.is_some() {
            return Err(BoothError::Camera(CameraError::AlreadyRunning));
        }

        let result = lock(&self.camera).start(&self.config.constraints);
        match result {
            Ok(resolution) => {
                lock(&self.state).stream = Some(resolution);
                log::info!("Camera started at {}", resolution);
                self.events.on_camera(true, Some(resolution));
                Ok(resolution)
            }
            Err(e) => {
                log::error!("Error accessing camera: {}", e);
                self.events
                    .on_notice(&format!("Could not access the camera: {}", e));
                Err(e.into())
            }
        }
    }

    /// Release the camera stream. Safe to call when nothing is running.
    pub fn stop_camera(&self) {
        lock(&self.camera).stop();
        let was_active = lock(&self.state).stream.take().is_some();
        if was_active {
            log::info!("Camera stopped");
            self.events.on_camera(false, None);
        }
    }

    pub fn is_camera_active(&self) -> bool {
        lock(&self.state).stream.is_some()
    }

    // ---- capture sequence ----

    pub fn phase(&self) -> CapturePhase {
        lock(&self.state).capture.phase()
    }

    /// The still on display, if any.
    pub fn still(&self) -> Option<Still> {
        lock(&self.state).capture.still().cloned()
    }

    pub fn filter(&self) -> FilterKind {
        lock(&self.state).filter
    }

    pub fn frame(&self) -> FrameKind {
        lock(&self.state).frame
    }

    /// Select a filter for future captures. A displayed still only changes
    /// its display decoration; its encoded bytes are untouched.
    pub fn select_filter(&self, filter: FilterKind) {
        let mut state = lock(&self.state);
        state.filter = filter;
        if let CaptureState::Captured(still) = &mut state.capture {
            still.display_filter = filter;
        }
    }

    /// Select a frame; see [`select_filter`](Self::select_filter).
    pub fn select_frame(&self, frame: FrameKind) {
        let mut state = lock(&self.state);
        state.frame = frame;
        if let CaptureState::Captured(still) = &mut state.capture {
            still.display_frame = frame;
        }
    }

    /// Run the countdown, flash, and frame grab, then persist the photo.
    ///
    /// Refused without side effects when a capture is already running, no
    /// camera is active, or a still is displayed. Dropping the returned
    /// future part way through puts the booth back to `Idle`.
    pub async fn capture(&self) -> Result<CapturedPhoto, BoothError> {
        let timing = self.config.timing;
        {
            let mut state = lock(&self.state);
            if let Err(reason) = state.capture.can_start(state.stream.is_some()) {
                log::debug!("Capture refused: {}", reason);
                return Err(BoothError::Rejected(reason));
            }
            state.capture = CaptureState::CountingDown {
                remaining: timing.countdown_from,
            };
        }
        let _reset = CaptureReset {
            state: &self.state,
            events: self.events.as_ref(),
        };

        for remaining in (1..=timing.countdown_from).rev() {
            self.enter(CaptureState::CountingDown { remaining });
            self.events.on_tone(&Tone::COUNTDOWN);
            tokio::time::sleep(timing.tick).await;
        }

        self.enter(CaptureState::Flashing);
        self.events.on_flash(true);
        self.events.on_tone(&Tone::SHUTTER);
        let frame = lock(&self.camera).grab_frame();
        tokio::time::sleep(timing.flash).await;
        self.events.on_flash(false);

        let Some(frame) = frame else {
            self.enter(CaptureState::Idle);
            self.events.on_notice("The camera produced no frame to capture");
            return Err(BoothError::NoFrame);
        };

        let (filter, frame_kind) = {
            let state = lock(&self.state);
            (state.filter, state.frame)
        };
        let encoded = grab_still(&frame, filter).and_then(|still| data_uri::encode_png(&still));
        let image_data = match encoded {
            Ok(data) => data,
            Err(e) => {
                self.enter(CaptureState::Idle);
                return Err(e.into());
            }
        };

        let photo = self.save_photo(image_data, frame_kind, filter);
        self.show_still(&photo);
        log::info!("Captured photo {} ({}x{})", photo.id, frame.width, frame.height);
        self.events.on_captured(&photo);
        Ok(photo)
    }

    /// Discard the displayed still and go back to the live preview. The
    /// gallery entry stays. Returns false when no still was displayed.
    pub fn retake(&self) -> bool {
        let retaken = {
            let mut state = lock(&self.state);
            if matches!(state.capture, CaptureState::Captured(_)) {
                state.capture = CaptureState::Idle;
                true
            } else {
                false
            }
        };
        if retaken {
            self.events.on_phase(CapturePhase::Idle);
        }
        retaken
    }

    /// Show an uploaded image as the still and save it to the gallery.
    ///
    /// The original encoding is kept. Refused while a capture is running.
    pub async fn upload(&self, bytes: Vec<u8>) -> Result<CapturedPhoto, BoothError> {
        if lock(&self.state).capture.is_busy() {
            return Err(BoothError::Rejected(Rejection::InProgress));
        }

        let image_data = tokio::task::spawn_blocking(move || {
            let mime = data_uri::sniff_mime(&bytes)?;
            image::load_from_memory(&bytes)?;
            Ok::<_, RasterError>(data_uri::encode_bytes(&bytes, mime))
        })
        .await
        .map_err(|e| BoothError::Task(e.to_string()))??;

        // A capture may have started while the upload was decoding
        if lock(&self.state).capture.is_busy() {
            return Err(BoothError::Rejected(Rejection::InProgress));
        }

        let (filter, frame) = {
            let state = lock(&self.state);
            (state.filter, state.frame)
        };
        let photo = self.save_photo(image_data, frame, filter);
        self.show_still(&photo);
        log::info!("Uploaded photo {}", photo.id);
        Ok(photo)
    }

    /// Composite the displayed still with the current filter, frame, and
    /// stickers, and write it into `dir` as `<prefix>-<timestamp>.png`.
    ///
    /// Decoding and compositing run on the blocking pool; the file exists
    /// once this resolves.
    pub async fn export(&self, dir: &Path) -> Result<Exported, BoothError> {
        let (image_data, filter, frame) = {
            let state = lock(&self.state);
            let still = state.capture.still().ok_or(BoothError::NothingToExport)?;
            (still.image_data.clone(), state.filter, state.frame)
        };
        let stickers: Vec<(String, Point)> = lock(&self.stickers)
            .stickers()
            .iter()
            .map(|s| (s.glyph.clone(), s.position))
            .collect();
        let overlay = self.config.overlay;
        let compositor = self.compositor.clone();

        let (png, report) = tokio::task::spawn_blocking(move || {
            let mut img = data_uri::decode_image(&image_data)?;
            let stamps: Vec<StickerStamp<'_>> = stickers
                .iter()
                .map(|(glyph, offset)| StickerStamp {
                    glyph,
                    offset: *offset,
                })
                .collect();
            let report = compositor.compose(&mut img, filter, frame, &stamps, overlay);
            Ok::<_, RasterError>((data_uri::png_bytes(&img)?, report))
        })
        .await
        .map_err(|e| BoothError::Task(e.to_string()))??;

        let name = format!(
            "{}-{}.png",
            self.config.filename_prefix,
            Utc::now().timestamp_millis()
        );
        let path = write_file(dir, &name, &png)?;
        log::info!("Exported {}", path.display());
        Ok(Exported { path, report })
    }

    fn enter(&self, next: CaptureState) {
        let phase = next.phase();
        lock(&self.state).capture = next;
        self.events.on_phase(phase);
    }

    fn show_still(&self, photo: &CapturedPhoto) {
        self.enter(CaptureState::Captured(Still {
            photo_id: photo.id,
            image_data: photo.image_data.clone(),
            display_filter: photo.filter,
            display_frame: photo.frame,
        }));
    }

    // ---- stickers ----

    pub fn add_sticker(&self, glyph: &str) -> StickerId {
        lock(&self.stickers).add(glyph, self.config.overlay)
    }

    /// Pointer-down at `p`: starts dragging the top-most sticker there.
    pub fn pointer_down(&self, p: Point) -> Option<StickerId> {
        let mut board = lock(&self.stickers);
        let id = board.sticker_at(p)?;
        board.begin_drag(id, p);
        Some(id)
    }

    pub fn pointer_move(&self, p: Point) -> bool {
        lock(&self.stickers).drag_to(p)
    }

    pub fn pointer_up(&self) {
        lock(&self.stickers).end_drag();
    }

    /// Double activation at `p` removes the sticker there.
    pub fn double_activate(&self, p: Point) -> Option<StickerId> {
        let mut board = lock(&self.stickers);
        let id = board.sticker_at(p)?;
        board.remove(id);
        Some(id)
    }

    pub fn remove_sticker(&self, id: StickerId) -> bool {
        lock(&self.stickers).remove(id)
    }

    pub fn clear_stickers(&self) {
        lock(&self.stickers).clear();
    }

    pub fn stickers(&self) -> Vec<PlacedSticker> {
        lock(&self.stickers).stickers().to_vec()
    }

    // ---- gallery ----

    /// Save an encoded raster with the given selection.
    pub fn save_photo(&self, image_data: String, frame: FrameKind, filter: FilterKind) -> CapturedPhoto {
        let (photo, count) = {
            let mut gallery = lock(&self.gallery);
            let photo = gallery.save(image_data, frame, filter);
            (photo, gallery.len())
        };
        self.events.on_gallery_changed(count);
        photo
    }

    /// Gallery photos, newest first.
    pub fn photos(&self) -> Vec<CapturedPhoto> {
        lock(&self.gallery).photos().to_vec()
    }

    pub fn open_photo(&self, id: PhotoId) -> Option<CapturedPhoto> {
        lock(&self.gallery).get(id).cloned()
    }

    pub fn delete_photo(&self, id: PhotoId, confirm: &dyn Confirm) -> DeleteOutcome {
        let (outcome, count) = {
            let mut gallery = lock(&self.gallery);
            let outcome = gallery.delete(id, confirm);
            (outcome, gallery.len())
        };
        if outcome == DeleteOutcome::Deleted {
            self.events.on_gallery_changed(count);
        }
        outcome
    }

    /// Write a gallery photo's stored bytes, unchanged, into `dir`.
    pub fn download_photo(&self, id: PhotoId, dir: &Path) -> Result<PathBuf, BoothError> {
        let photo = self.open_photo(id).ok_or(BoothError::PhotoNotFound(id))?;
        download_photo(&photo, dir, &self.config.filename_prefix)
    }

    pub fn contact_sheet(&self, layout: SheetLayout) -> Option<image::RgbaImage> {
        let photos = self.photos();
        render_contact_sheet(&photos, layout)
    }
}

/// Write `photo`'s stored bytes as `<prefix>-<id>.<ext>` inside `dir`.
pub fn download_photo(photo: &CapturedPhoto, dir: &Path, prefix: &str) -> Result<PathBuf, BoothError> {
    let (mime, bytes) = data_uri::decode(&photo.image_data)?;
    let ext = match mime.as_str() {
        "image/jpeg" => "jpg",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/bmp" => "bmp",
        _ => "png",
    };
    write_file(dir, &format!("{}-{}.{}", prefix, photo.id, ext), &bytes)
}

fn write_file(dir: &Path, name: &str, bytes: &[u8]) -> Result<PathBuf, BoothError> {
    std::fs::create_dir_all(dir).map_err(|source| BoothError::Io {
        path: dir.to_path_buf(),
        source,
    })?;
    let path = dir.join(name);
    std::fs::write(&path, bytes).map_err(|source| BoothError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
