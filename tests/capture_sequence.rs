//! The countdown capture sequence, driven on a paused tokio clock.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use photobooth::booth::{
    BoothError, BoothEvents, CapturePhase, PhotoboothSession, Rejection, SessionConfig, Tone,
};
use photobooth::camera::{CameraError, NoDevice, Resolution, StillImageSource, VideoSource};
use photobooth::gallery::{CapturedPhoto, Gallery, MemoryStore};
use photobooth::raster::{data_uri, Compositor, FilterKind, FrameKind};

#[derive(Debug, Default)]
struct Recorder {
    phases: Mutex<Vec<CapturePhase>>,
    tones: Mutex<Vec<Tone>>,
    flashes: Mutex<Vec<bool>>,
    captured: Mutex<Vec<u64>>,
    notices: Mutex<Vec<String>>,
    camera: Mutex<Vec<bool>>,
    gallery_counts: Mutex<Vec<usize>>,
}

impl BoothEvents for Recorder {
    fn on_camera(&self, active: bool, _resolution: Option<Resolution>) {
        self.camera.lock().unwrap().push(active);
    }

    fn on_phase(&self, phase: CapturePhase) {
        self.phases.lock().unwrap().push(phase);
    }

    fn on_tone(&self, tone: &Tone) {
        self.tones.lock().unwrap().push(*tone);
    }

    fn on_flash(&self, on: bool) {
        self.flashes.lock().unwrap().push(on);
    }

    fn on_captured(&self, photo: &CapturedPhoto) {
        self.captured.lock().unwrap().push(photo.id);
    }

    fn on_gallery_changed(&self, count: usize) {
        self.gallery_counts.lock().unwrap().push(count);
    }

    fn on_notice(&self, message: &str) {
        self.notices.lock().unwrap().push(message.to_string());
    }
}

fn booth<V: VideoSource>(camera: V) -> (Arc<PhotoboothSession<V, MemoryStore>>, Arc<Recorder>) {
    let recorder = Arc::new(Recorder::default());
    let session = PhotoboothSession::new(
        camera,
        Gallery::load(MemoryStore::new()),
        Compositor::default(),
        SessionConfig::default(),
    )
    .with_events(recorder.clone());
    (Arc::new(session), recorder)
}

fn red_camera() -> StillImageSource {
    StillImageSource::solid(Resolution { width: 16, height: 9 }, [200, 10, 10])
}

#[tokio::test(start_paused = true)]
async fn test_full_sequence_emits_countdown_flash_and_capture() {
    let (s, rec) = booth(red_camera());
    s.start_camera().unwrap();

    let started = tokio::time::Instant::now();
    let photo = s.capture().await.unwrap();
    let elapsed = started.elapsed();

    assert!(elapsed >= Duration::from_millis(3300), "elapsed {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(3400), "elapsed {:?}", elapsed);

    assert_eq!(
        *rec.phases.lock().unwrap(),
        vec![
            CapturePhase::CountingDown(3),
            CapturePhase::CountingDown(2),
            CapturePhase::CountingDown(1),
            CapturePhase::Flashing,
            CapturePhase::Captured,
        ]
    );
    assert_eq!(
        *rec.tones.lock().unwrap(),
        vec![Tone::COUNTDOWN, Tone::COUNTDOWN, Tone::COUNTDOWN, Tone::SHUTTER]
    );
    assert_eq!(*rec.flashes.lock().unwrap(), vec![true, false]);
    assert_eq!(*rec.captured.lock().unwrap(), vec![photo.id]);
    assert_eq!(*rec.gallery_counts.lock().unwrap(), vec![1]);

    assert_eq!(s.phase(), CapturePhase::Captured);
    let still = s.still().unwrap();
    assert_eq!(still.photo_id, photo.id);
    assert_eq!(still.image_data, photo.image_data);
    assert!(photo.image_data.starts_with("data:image/png;base64,"));

    let img = data_uri::decode_image(&photo.image_data).unwrap();
    assert_eq!(img.dimensions(), (16, 9));
    assert_eq!(img.get_pixel(0, 0).0, [200, 10, 10, 255]);
}

#[tokio::test(start_paused = true)]
async fn test_phase_follows_the_clock() {
    let (s, _rec) = booth(red_camera());
    s.start_camera().unwrap();

    let task = tokio::spawn({
        let s = s.clone();
        async move { s.capture().await }
    });

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(s.phase(), CapturePhase::CountingDown(3));
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(s.phase(), CapturePhase::CountingDown(2));
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(s.phase(), CapturePhase::CountingDown(1));
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(s.phase(), CapturePhase::Flashing);

    task.await.unwrap().unwrap();
    assert_eq!(s.phase(), CapturePhase::Captured);
}

#[tokio::test(start_paused = true)]
async fn test_concurrent_capture_is_rejected() {
    let (s, rec) = booth(red_camera());
    s.start_camera().unwrap();

    let (first, second) = tokio::join!(s.capture(), s.capture());

    assert!(first.is_ok());
    assert!(matches!(
        second,
        Err(BoothError::Rejected(Rejection::InProgress))
    ));
    assert_eq!(s.photos().len(), 1);
    let countdown_ticks = rec
        .tones
        .lock()
        .unwrap()
        .iter()
        .filter(|t| **t == Tone::COUNTDOWN)
        .count();
    assert_eq!(countdown_ticks, 3);
}

#[tokio::test(start_paused = true)]
async fn test_capture_refused_while_still_is_shown_until_retake() {
    let (s, _rec) = booth(red_camera());
    s.start_camera().unwrap();
    let first = s.capture().await.unwrap();

    assert!(matches!(
        s.capture().await,
        Err(BoothError::Rejected(Rejection::StillShowing))
    ));

    assert!(s.retake());
    assert_eq!(s.phase(), CapturePhase::Idle);
    assert!(s.still().is_none());
    // Retake keeps the gallery entry
    assert_eq!(s.photos()[0].id, first.id);

    let second = s.capture().await.unwrap();
    assert!(second.id > first.id);
    let ids: Vec<u64> = s.photos().iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![second.id, first.id]);
}

#[tokio::test(start_paused = true)]
async fn test_capture_without_camera_is_rejected() {
    let (s, rec) = booth(red_camera());
    assert!(matches!(
        s.capture().await,
        Err(BoothError::Rejected(Rejection::NoCamera))
    ));
    assert!(rec.phases.lock().unwrap().is_empty());
    assert!(s.photos().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_selection_is_recorded_and_later_changes_only_redecorate() {
    let (s, _rec) = booth(red_camera());
    s.select_filter(FilterKind::Grayscale);
    s.select_frame(FrameKind::Birthday);
    s.start_camera().unwrap();
    let photo = s.capture().await.unwrap();

    assert_eq!(photo.filter, FilterKind::Grayscale);
    assert_eq!(photo.frame, FrameKind::Birthday);

    // The grayscale filter was baked in at grab time
    let img = data_uri::decode_image(&photo.image_data).unwrap();
    let px = img.get_pixel(3, 3).0;
    assert_eq!(px[0], px[1]);
    assert_eq!(px[1], px[2]);

    s.select_filter(FilterKind::Sepia);
    s.select_frame(FrameKind::None);
    let still = s.still().unwrap();
    assert_eq!(still.display_filter, FilterKind::Sepia);
    assert_eq!(still.display_frame, FrameKind::None);
    assert_eq!(still.image_data, photo.image_data);
    assert_eq!(s.photos()[0], photo);
}

#[tokio::test(start_paused = true)]
async fn test_camera_stopped_mid_countdown_yields_no_frame() {
    let (s, rec) = booth(red_camera());
    s.start_camera().unwrap();

    let task = tokio::spawn({
        let s = s.clone();
        async move { s.capture().await }
    });
    tokio::time::sleep(Duration::from_millis(1500)).await;
    s.stop_camera();

    let result = task.await.unwrap();
    assert!(matches!(result, Err(BoothError::NoFrame)));
    assert_eq!(s.phase(), CapturePhase::Idle);
    assert!(s.photos().is_empty());
    assert_eq!(*rec.camera.lock().unwrap(), vec![true, false]);
    assert_eq!(rec.notices.lock().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_countdown_returns_to_idle() {
    let (s, rec) = booth(red_camera());
    s.start_camera().unwrap();

    let timed_out = tokio::time::timeout(Duration::from_millis(1500), s.capture()).await;
    assert!(timed_out.is_err());
    assert_eq!(s.phase(), CapturePhase::Idle);
    assert_eq!(
        rec.phases.lock().unwrap().last(),
        Some(&CapturePhase::Idle)
    );
    assert!(rec.flashes.lock().unwrap().is_empty());

    // The booth is usable again
    let photo = s.capture().await.unwrap();
    assert_eq!(s.phase(), CapturePhase::Captured);
    assert_eq!(s.photos(), vec![photo]);
}

#[tokio::test(start_paused = true)]
async fn test_dropped_flash_switches_flash_off() {
    let (s, rec) = booth(red_camera());
    s.start_camera().unwrap();

    // Countdown ends at 3000 ms; the flash is held until 3300 ms
    let timed_out = tokio::time::timeout(Duration::from_millis(3100), s.capture()).await;
    assert!(timed_out.is_err());
    assert_eq!(*rec.flashes.lock().unwrap(), vec![true, false]);
    assert_eq!(s.phase(), CapturePhase::Idle);
    assert!(s.photos().is_empty());
    assert!(rec.captured.lock().unwrap().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_upload_refused_during_countdown() {
    let (s, _rec) = booth(red_camera());
    s.start_camera().unwrap();

    let task = tokio::spawn({
        let s = s.clone();
        async move { s.capture().await }
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    let png = data_uri::png_bytes(&image::RgbaImage::new(2, 2)).unwrap();
    assert!(matches!(
        s.upload(png).await,
        Err(BoothError::Rejected(Rejection::InProgress))
    ));

    task.await.unwrap().unwrap();
    assert_eq!(s.photos().len(), 1);
}

#[test]
fn test_camera_failure_raises_notice_and_changes_nothing() {
    let (s, rec) = booth(NoDevice);

    assert!(matches!(
        s.start_camera(),
        Err(BoothError::Camera(CameraError::NoDevices))
    ));
    assert!(!s.is_camera_active());
    assert_eq!(s.phase(), CapturePhase::Idle);
    assert!(rec.camera.lock().unwrap().is_empty());

    let notices = rec.notices.lock().unwrap();
    assert_eq!(notices.len(), 1);
    assert!(notices[0].contains("No cameras found"), "{}", notices[0]);
}
