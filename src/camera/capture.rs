//! Native camera capture handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;

use super::capture_loop::{run_capture_loop, CaptureCommand};
use super::device::list_devices;
use super::source::VideoSource;
use super::types::{CameraError, CameraSettings, Frame, Resolution, StreamConstraints};

/// Camera capture handle.
///
/// The camera runs a background thread that continuously captures frames
/// and stores the latest frame in a shared buffer. Call `start()` to begin
/// capturing and `get_frame()` to retrieve the latest frame.
pub struct CameraCapture {
    /// Latest captured frame (shared with capture thread)
    frame_buffer: Arc<Mutex<Option<Frame>>>,
    capture_thread: Option<JoinHandle<()>>,
    command_tx: Option<Sender<CaptureCommand>>,
    stop_signal: Arc<AtomicBool>,
    settings: CameraSettings,
    /// Actual resolution (set after camera opens)
    actual_resolution: Option<Resolution>,
}

impl std::fmt::Debug for CameraCapture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraCapture")
            .field("settings", &self.settings)
            .field("is_running", &self.is_running())
            .finish_non_exhaustive()
    }
}

impl CameraCapture {
    /// Open a camera with the specified settings.
    ///
    /// This validates that the camera exists but doesn't open the stream
    /// until `start()` is called. The camera itself is opened inside the
    /// background thread.
    ///
    /// # Errors
    /// * `CameraError::NoDevices` - If the system reports no cameras at all
    /// * `CameraError::DeviceNotFound` - If the device index doesn't exist
    pub fn open(settings: CameraSettings) -> Result<Self, CameraError> {
        let devices = list_devices()?;
        if devices.is_empty() {
            return Err(CameraError::NoDevices);
        }
        if !devices.iter().any(|d| d.index == settings.device_index) {
            return Err(CameraError::DeviceNotFound(settings.device_index));
        }

        Ok(Self {
            frame_buffer: Arc::new(Mutex::new(None)),
            capture_thread: None,
            command_tx: None,
            stop_signal: Arc::new(AtomicBool::new(false)),
            settings,
            actual_resolution: None,
        })
    }

    pub fn settings(&self) -> &CameraSettings {
        &self.settings
    }

    /// The resolution the device negotiated; `None` before `start()`.
    pub fn actual_resolution(&self) -> Option<Resolution> {
        self.actual_resolution
    }

    /// Start capturing frames in a background thread.
    ///
    /// # Errors
    /// * `CameraError::AlreadyRunning` - If capture is already running
    /// * `CameraError::StreamFailed` - If the camera stream fails to start
    /// * `CameraError::PermissionDenied` - If camera access is denied
    /// * `CameraError::OpenFailed` - If camera fails to open for other reasons
    pub fn start(&mut self) -> Result<Resolution, CameraError> {
        if self.is_running() {
            return Err(CameraError::AlreadyRunning);
        }

        self.stop_signal.store(false, Ordering::SeqCst);

        let (tx, rx) = mpsc::channel();
        self.command_tx = Some(tx);

        let buffer = Arc::clone(&self.frame_buffer);
        let stop = Arc::clone(&self.stop_signal);
        let settings = self.settings.clone();

        let (info_tx, info_rx) = mpsc::channel::<Result<(Resolution, u32), CameraError>>();

        let handle = std::thread::spawn(move || {
            run_capture_loop(settings, buffer, stop, rx, info_tx);
        });
        self.capture_thread = Some(handle);

        // Wait for the thread to report success or failure
        match info_rx.recv() {
            Ok(Ok((res, _fps))) => {
                self.actual_resolution = Some(res);
                Ok(res)
            }
            Ok(Err(e)) => {
                self.join_thread();
                Err(e)
            }
            Err(_) => {
                self.join_thread();
                Err(CameraError::StreamFailed(
                    "Capture thread terminated unexpectedly".to_string(),
                ))
            }
        }
    }

    /// Stop the capture thread and release the device.
    pub fn stop(&mut self) {
        if let Some(tx) = self.command_tx.take() {
            let _ = tx.send(CaptureCommand::Stop);
        }
        self.join_thread();
        if let Ok(mut buf) = self.frame_buffer.lock() {
            *buf = None;
        }
        self.actual_resolution = None;
    }

    /// Get the latest captured frame, if any.
    pub fn get_frame(&self) -> Option<Frame> {
        let buffer = self.frame_buffer.lock().ok()?;
        buffer.clone()
    }

    pub fn is_running(&self) -> bool {
        self.capture_thread
            .as_ref()
            .is_some_and(|h| !h.is_finished())
    }

    fn join_thread(&mut self) {
        self.stop_signal.store(true, Ordering::SeqCst);
        if let Some(h) = self.capture_thread.take() {
            let _ = h.join();
        }
    }
}

impl Drop for CameraCapture {
    fn drop(&mut self) {
        self.stop();
    }
}

/// [`VideoSource`] backed by a real webcam.
///
/// nokhwa has no notion of facing mode, so the device index from the
/// configuration decides which camera is "front".
#[derive(Debug)]
pub struct NokhwaSource {
    device_index: u32,
    fps: u32,
    capture: Option<CameraCapture>,
}

impl NokhwaSource {
    pub fn new(device_index: u32, fps: u32) -> Self {
        Self {
            device_index,
            fps,
            capture: None,
        }
    }
}

impl VideoSource for NokhwaSource {
    fn start(&mut self, constraints: &StreamConstraints) -> Result<Resolution, CameraError> {
        if self.is_streaming() {
            return Err(CameraError::AlreadyRunning);
        }
        let mut capture = CameraCapture::open(CameraSettings {
            device_index: self.device_index,
            resolution: constraints.resolution,
            fps: self.fps,
        })?;
        let res = capture.start()?;
        self.capture = Some(capture);
        Ok(res)
    }

    fn stop(&mut self) {
        if let Some(mut capture) = self.capture.take() {
            capture.stop();
        }
    }

    fn is_streaming(&self) -> bool {
        self.capture.as_ref().is_some_and(CameraCapture::is_running)
    }

    fn grab_frame(&self) -> Option<Frame> {
        self.capture.as_ref()?.get_frame()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_open_invalid_device() {
        let settings = CameraSettings {
            device_index: 999,
            ..CameraSettings::default()
        };
        match CameraCapture::open(settings) {
            Err(CameraError::DeviceNotFound(idx)) => assert_eq!(idx, 999),
            Err(CameraError::NoDevices) | Err(CameraError::QueryFailed(_)) => {}
            other => panic!("Expected DeviceNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_stop_without_start_is_noop() {
        let mut source = NokhwaSource::new(0, 30);
        source.stop();
        assert!(!source.is_streaming());
        assert!(source.grab_frame().is_none());
    }
}
