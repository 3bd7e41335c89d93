//! Background capture thread for the native camera.

use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{
    CameraFormat, CameraIndex, FrameFormat as NokhwaFrameFormat, RequestedFormat,
    RequestedFormatType,
};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use super::frame_utils::convert_to_rgb;
use super::types::{CameraError, CameraSettings, Frame, Resolution};

/// Commands sent to the capture thread.
pub enum CaptureCommand {
    Stop,
}

/// Run the capture loop in a background thread.
///
/// Reports the negotiated resolution (or the open error) on `info_tx`, then
/// keeps the newest frame in `buffer` until stopped.
pub fn run_capture_loop(
    settings: CameraSettings,
    buffer: Arc<Mutex<Option<Frame>>>,
    stop: Arc<AtomicBool>,
    rx: Receiver<CaptureCommand>,
    info_tx: Sender<Result<(Resolution, u32), CameraError>>,
) {
    let index = CameraIndex::Index(settings.device_index);

    let mut camera = match open_camera_with_fallback(&index, &settings) {
        Ok(cam) => cam,
        Err(e) => {
            let _ = info_tx.send(Err(e));
            return;
        }
    };

    if let Err(e) = camera.open_stream() {
        let _ = info_tx.send(Err(CameraError::StreamFailed(e.to_string())));
        return;
    }

    let res = camera.resolution();
    let actual_res = Resolution {
        width: res.width(),
        height: res.height(),
    };
    let actual_fps = camera.frame_rate();
    log::info!("Camera stream open at {} @ {}fps", actual_res, actual_fps);
    let _ = info_tx.send(Ok((actual_res, actual_fps)));

    while !stop.load(Ordering::Relaxed) {
        if let Ok(CaptureCommand::Stop) = rx.try_recv() {
            break;
        }

        if let Ok(raw_frame) = camera.frame() {
            // Frames that fail to decode are skipped
            if let Some(frame) = convert_to_rgb(&raw_frame) {
                if let Ok(mut buf) = buffer.lock() {
                    *buf = Some(frame);
                }
            }
        }

        thread::sleep(Duration::from_millis(1));
    }

    if let Err(e) = camera.stop_stream() {
        log::warn!("Failed to stop camera stream cleanly: {}", e);
    }
}

/// Try to open a camera with multiple format fallback strategies.
fn open_camera_with_fallback(
    index: &CameraIndex,
    settings: &CameraSettings,
) -> Result<Camera, CameraError> {
    // NV12 is native on macOS, MJPEG is the common USB webcam format, and the
    // last attempt lets the device choose.
    let target =
        nokhwa::utils::Resolution::new(settings.resolution.width, settings.resolution.height);
    let format_attempts = [
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            target,
            NokhwaFrameFormat::NV12,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(CameraFormat::new(
            target,
            NokhwaFrameFormat::MJPEG,
            settings.fps,
        ))),
        RequestedFormat::new::<RgbFormat>(RequestedFormatType::AbsoluteHighestResolution),
    ];

    let mut last_error = None;
    for requested in format_attempts {
        match Camera::new(index.clone(), requested) {
            Ok(cam) => return Ok(cam),
            Err(e) => {
                log::debug!("Camera format attempt failed: {}", e);
                last_error = Some(e);
            }
        }
    }

    let Some(e) = last_error else {
        return Err(CameraError::OpenFailed("no format attempted".to_string()));
    };
    let msg = e.to_string().to_lowercase();
    if msg.contains("permission")
        || msg.contains("denied")
        || msg.contains("authorization")
        || msg.contains("access")
    {
        Err(CameraError::PermissionDenied)
    } else {
        Err(CameraError::OpenFailed(e.to_string()))
    }
}
