//! Export, upload, download, and sticker handling through the session.

use std::io::Cursor;
use std::time::Duration;

use image::{DynamicImage, ImageFormat, RgbImage, RgbaImage};
use photobooth::booth::{
    download_photo, BoothError, CaptureTiming, PhotoboothSession, SessionConfig,
};
use photobooth::camera::{NoDevice, Resolution, StillImageSource, VideoSource};
use photobooth::gallery::{DeleteOutcome, Gallery, MemoryStore, SheetLayout};
use photobooth::raster::{data_uri, Compositor, FilterKind, FrameKind, Point};
use tempfile::TempDir;

fn quick_config() -> SessionConfig {
    SessionConfig {
        timing: CaptureTiming {
            countdown_from: 1,
            tick: Duration::from_millis(1),
            flash: Duration::from_millis(1),
        },
        ..SessionConfig::default()
    }
}

fn session<V: VideoSource>(camera: V) -> PhotoboothSession<V, MemoryStore> {
    PhotoboothSession::new(
        camera,
        Gallery::load(MemoryStore::new()),
        Compositor::default(),
        quick_config(),
    )
}

fn black_camera() -> StillImageSource {
    StillImageSource::solid(Resolution::VGA, [0, 0, 0])
}

fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbImage::from_pixel(width, height, image::Rgb([30, 120, 200]));
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .unwrap();
    buf
}

#[tokio::test]
async fn test_export_without_still_is_refused() {
    let s = session(black_camera());
    let dir = TempDir::new().unwrap();
    assert!(matches!(
        s.export(dir.path()).await,
        Err(BoothError::NothingToExport)
    ));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[tokio::test]
async fn test_export_draws_birthday_banners() {
    let s = session(black_camera());
    s.select_frame(FrameKind::Birthday);
    s.start_camera().unwrap();
    s.capture().await.unwrap();

    let dir = TempDir::new().unwrap();
    let exported = s.export(dir.path()).await.unwrap();

    let name = exported.path.file_name().unwrap().to_str().unwrap();
    assert!(name.starts_with("birthday-photo-"), "{}", name);
    assert!(name.ends_with(".png"), "{}", name);
    assert_eq!(exported.report.banners, 2);

    let img = image::open(&exported.path).unwrap().to_rgba8();
    assert_eq!(img.dimensions(), (640, 480));
    assert_eq!(img.get_pixel(205, 12).0, [230, 95, 162, 255]);
    assert_eq!(img.get_pixel(175, 437).0, [133, 101, 198, 255]);
    assert_eq!(img.get_pixel(5, 240).0, [0, 0, 0, 255]);
}

#[tokio::test]
async fn test_export_with_plain_frame_matches_still() {
    let s = session(StillImageSource::solid(
        Resolution { width: 6, height: 4 },
        [90, 60, 30],
    ));
    s.start_camera().unwrap();
    s.capture().await.unwrap();

    let dir = TempDir::new().unwrap();
    let exported = s.export(dir.path()).await.unwrap();
    assert_eq!(exported.report.banners, 0);

    let img = image::open(&exported.path).unwrap().to_rgba8();
    assert!(img.pixels().all(|p| p.0 == [90, 60, 30, 255]));
}

#[tokio::test]
async fn test_upload_keeps_original_encoding() {
    let s = session(NoDevice);
    s.select_filter(FilterKind::Cool);
    let jpeg = jpeg_bytes(20, 10);

    let photo = s.upload(jpeg.clone()).await.unwrap();
    assert!(photo.image_data.starts_with("data:image/jpeg;base64,"));
    assert_eq!(photo.filter, FilterKind::Cool);
    assert_eq!(s.still().unwrap().photo_id, photo.id);
    assert_eq!(s.photos().len(), 1);

    let (mime, bytes) = data_uri::decode(&photo.image_data).unwrap();
    assert_eq!(mime, "image/jpeg");
    assert_eq!(bytes, jpeg);

    // Downloads are the stored bytes, unchanged
    let dir = TempDir::new().unwrap();
    let path = s.download_photo(photo.id, dir.path()).unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        format!("birthday-photo-{}.jpg", photo.id)
    );
    assert_eq!(std::fs::read(&path).unwrap(), jpeg);
}

#[tokio::test]
async fn test_upload_rejects_non_images() {
    let s = session(NoDevice);
    let result = s.upload(b"definitely not an image".to_vec()).await;
    assert!(matches!(result, Err(BoothError::Raster(_))));
    assert!(s.photos().is_empty());
    assert!(s.still().is_none());
}

#[tokio::test]
async fn test_gallery_operations_through_session() {
    let s = session(black_camera());
    s.start_camera().unwrap();
    let first = s.capture().await.unwrap();
    s.retake();
    let second = s.capture().await.unwrap();

    assert_eq!(s.open_photo(first.id), Some(first.clone()));
    assert_eq!(s.open_photo(12345), None);

    let dir = TempDir::new().unwrap();
    assert!(matches!(
        s.download_photo(12345, dir.path()),
        Err(BoothError::PhotoNotFound(12345))
    ));

    let sheet = s.contact_sheet(SheetLayout::default()).unwrap();
    assert_eq!(sheet.dimensions(), (2 * 240 + 3 * 8, 135 + 2 * 8));

    assert_eq!(s.delete_photo(second.id, &|_: &str| true), DeleteOutcome::Deleted);
    assert_eq!(s.photos(), vec![first]);
}

#[test]
fn test_empty_gallery_has_no_contact_sheet() {
    let s = session(NoDevice);
    assert!(s.contact_sheet(SheetLayout::default()).is_none());
}

#[test]
fn test_download_photo_writes_png_for_captures() {
    let png = data_uri::encode_png(&RgbaImage::new(3, 3)).unwrap();
    let s = session(NoDevice);
    let photo = s.save_photo(png, FrameKind::None, FilterKind::None);

    let dir = TempDir::new().unwrap();
    let path = download_photo(&photo, &dir.path().join("sub"), "party").unwrap();
    assert_eq!(
        path.file_name().unwrap().to_str().unwrap(),
        format!("party-{}.png", photo.id)
    );
    let (_, bytes) = data_uri::decode(&photo.image_data).unwrap();
    assert_eq!(std::fs::read(&path).unwrap(), bytes);
}

#[test]
fn test_sticker_add_drag_and_double_activate() {
    let s = session(NoDevice);
    let balloon = s.add_sticker("🎈");
    let cake = s.add_sticker("🎂");

    // Both start centered; the newer one is on top
    assert_eq!(s.pointer_down(Point::new(320.0, 240.0)), Some(cake));
    assert!(s.pointer_move(Point::new(120.0, 140.0)));
    s.pointer_up();
    assert!(!s.pointer_move(Point::new(0.0, 0.0)));

    let stickers = s.stickers();
    assert_eq!(stickers[0].id, balloon);
    assert_eq!(stickers[0].position, Point::new(296.0, 216.0));
    assert_eq!(stickers[1].position, Point::new(96.0, 116.0));

    // Double activation removes only the sticker under the pointer
    assert_eq!(s.double_activate(Point::new(100.0, 120.0)), Some(cake));
    assert_eq!(s.double_activate(Point::new(100.0, 120.0)), None);
    let remaining: Vec<_> = s.stickers().into_iter().map(|st| st.id).collect();
    assert_eq!(remaining, vec![balloon]);

    assert!(s.remove_sticker(balloon));
    assert!(!s.remove_sticker(balloon));
    s.add_sticker("⭐");
    s.clear_stickers();
    assert!(s.stickers().is_empty());
}

#[tokio::test]
async fn test_stickers_are_skipped_without_a_font() {
    let s = session(black_camera());
    s.start_camera().unwrap();
    s.capture().await.unwrap();
    s.add_sticker("🎉");

    let dir = TempDir::new().unwrap();
    let exported = s.export(dir.path()).await.unwrap();
    assert_eq!(exported.report.stickers, 0);
    // The sticker stays placed for the next export
    assert_eq!(s.stickers().len(), 1);
}
