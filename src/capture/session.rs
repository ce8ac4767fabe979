use tracing::{debug, info, warn};

use crate::capture::{DeviceKind, Facing, MediaDevices, StreamConstraints, VideoStream};
use crate::error::CaptureError;
use crate::media::RawImage;

/// User-agent substrings for which camera capture is declared unsupported
const UNSUPPORTED_UA_MARKERS: [&str; 3] = ["iphone", "ipad", "ipod"];

/// The single live camera stream plus its inferred facing
pub struct CameraSession {
    stream: Box<dyn VideoStream>,
    facing: Facing,
}

impl CameraSession {
    fn new(stream: Box<dyn VideoStream>) -> Self {
        let facing = Facing::from_label(stream.label());
        Self { stream, facing }
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn label(&self) -> &str {
        self.stream.label()
    }

    pub fn is_live(&self) -> bool {
        self.stream.is_live()
    }
}

impl std::fmt::Debug for CameraSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CameraSession")
            .field("label", &self.stream.label())
            .field("facing", &self.facing)
            .field("live", &self.stream.is_live())
            .finish()
    }
}

/// Manages the single active [`CameraSession`]
///
/// Exactly one session may be live; it is overwritten atomically on
/// acquire/switch and torn down on capture, switch, release or drop.
pub struct CaptureSession<D: MediaDevices> {
    devices: D,
    active: Option<CameraSession>,
}

impl<D: MediaDevices> CaptureSession<D> {
    pub fn new(devices: D) -> Self {
        Self {
            devices,
            active: None,
        }
    }

    /// Whether camera capture is supported for this user agent
    ///
    /// The iOS device family is declared unsupported up front so the UI can
    /// hide the capture button instead of failing mid-acquire.
    pub fn capture_supported(user_agent: &str) -> bool {
        let lower = user_agent.to_lowercase();
        !UNSUPPORTED_UA_MARKERS
            .iter()
            .any(|marker| lower.contains(marker))
    }

    /// Like [`Self::capture_supported`] but as an error for call sites that
    /// went ahead anyway
    pub fn ensure_supported(user_agent: &str) -> Result<(), CaptureError> {
        if Self::capture_supported(user_agent) {
            Ok(())
        } else {
            Err(CaptureError::Unsupported {
                platform: user_agent.to_string(),
            })
        }
    }

    pub fn active(&self) -> Option<&CameraSession> {
        self.active.as_ref()
    }

    /// Request a live stream and store it as the single active session
    pub fn acquire(&mut self, facing_hint: Option<Facing>) -> Result<&CameraSession, CaptureError> {
        // Never leave a previous stream running behind a new one
        self.release();

        let constraints = StreamConstraints {
            device_id: None,
            facing: facing_hint,
        };
        let stream = self.devices.request_stream(&constraints)?;
        let session = CameraSession::new(stream);
        info!(
            "camera acquired: '{}' facing {}",
            session.label(),
            session.facing()
        );
        Ok(self.active.insert(session))
    }

    /// Switch to the first device facing the opposite way
    ///
    /// The outgoing stream is stopped before enumeration. On failure the
    /// stopped stream is not resurrected: the session ends without a
    /// camera and the caller must re-acquire.
    pub fn switch(&mut self) -> Result<&CameraSession, CaptureError> {
        let mut outgoing = self.active.take().ok_or(CaptureError::StreamClosed)?;
        let current = outgoing.facing();
        outgoing.stream.stop();
        debug!("switching away from '{}' ({})", outgoing.label(), current);

        let wanted = current.opposite().ok_or_else(|| {
            warn!("current facing unknown, cannot pick an opposite device");
            CaptureError::NoAlternateDevice
        })?;

        let devices = self.devices.enumerate()?;
        let target = devices
            .iter()
            .filter(|d| d.kind == DeviceKind::VideoInput)
            .find(|d| Facing::from_label(&d.label) == wanted)
            .ok_or(CaptureError::NoAlternateDevice)?;

        let constraints = StreamConstraints {
            device_id: Some(target.device_id.clone()),
            facing: Some(wanted),
        };
        let stream = self.devices.request_stream(&constraints)?;
        let session = CameraSession::new(stream);
        info!("switched to '{}' facing {}", session.label(), session.facing());
        Ok(self.active.insert(session))
    }

    /// Sample the current frame, then tear the session down
    pub fn capture(&mut self) -> Result<RawImage, CaptureError> {
        let session = self.active.as_mut().ok_or(CaptureError::StreamClosed)?;
        let frame = session.stream.grab_frame()?;
        info!(
            "captured {}x{} frame from '{}'",
            frame.width(),
            frame.height(),
            session.label()
        );
        self.release();
        Ok(frame)
    }

    /// Stop all tracks of the active session; idempotent
    pub fn release(&mut self) {
        if let Some(mut session) = self.active.take() {
            debug!("releasing camera '{}'", session.label());
            session.stream.stop();
        }
    }
}

impl<D: MediaDevices> Drop for CaptureSession<D> {
    fn drop(&mut self) {
        // Unmount teardown: never leave a stream running
        self.release();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::DeviceInfo;
    use image::RgbaImage;
    use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
    use std::sync::Arc;

    /// Stream whose stop count is observable from the test
    struct FakeStream {
        label: String,
        live: Arc<AtomicBool>,
        stops: Arc<AtomicU32>,
    }

    impl VideoStream for FakeStream {
        fn label(&self) -> &str {
            &self.label
        }

        fn is_live(&self) -> bool {
            self.live.load(Ordering::SeqCst)
        }

        fn grab_frame(&mut self) -> Result<RawImage, CaptureError> {
            if !self.is_live() {
                return Err(CaptureError::StreamClosed);
            }
            Ok(RawImage::new(RgbaImage::new(640, 480), self.label.clone()))
        }

        fn stop(&mut self) {
            // Idempotent: count only the live -> stopped edge
            if self.live.swap(false, Ordering::SeqCst) {
                self.stops.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    struct FakeDevices {
        devices: Vec<DeviceInfo>,
        permission: bool,
        stops: Arc<AtomicU32>,
    }

    impl FakeDevices {
        fn with_labels(labels: &[&str]) -> Self {
            let devices = labels
                .iter()
                .enumerate()
                .map(|(i, label)| DeviceInfo {
                    kind: DeviceKind::VideoInput,
                    device_id: format!("dev-{}", i),
                    label: label.to_string(),
                })
                .collect();
            Self {
                devices,
                permission: true,
                stops: Arc::new(AtomicU32::new(0)),
            }
        }
    }

    impl MediaDevices for FakeDevices {
        fn request_stream(
            &self,
            constraints: &StreamConstraints,
        ) -> Result<Box<dyn VideoStream>, CaptureError> {
            if !self.permission {
                return Err(CaptureError::PermissionDenied);
            }
            let device = match &constraints.device_id {
                Some(id) => self
                    .devices
                    .iter()
                    .find(|d| &d.device_id == id)
                    .ok_or(CaptureError::NoDevice)?,
                None => self.devices.first().ok_or(CaptureError::NoDevice)?,
            };
            Ok(Box::new(FakeStream {
                label: device.label.clone(),
                live: Arc::new(AtomicBool::new(true)),
                stops: Arc::clone(&self.stops),
            }))
        }

        fn enumerate(&self) -> Result<Vec<DeviceInfo>, CaptureError> {
            Ok(self.devices.clone())
        }
    }

    #[test]
    fn test_acquire_and_capture_tears_down() {
        let devices = FakeDevices::with_labels(&["Front Camera"]);
        let stops = Arc::clone(&devices.stops);
        let mut capture = CaptureSession::new(devices);

        let session = capture.acquire(None).unwrap();
        assert_eq!(session.facing(), Facing::Front);

        let frame = capture.capture().unwrap();
        assert_eq!((frame.width(), frame.height()), (640, 480));
        assert!(capture.active().is_none());
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_permission_denied() {
        let mut devices = FakeDevices::with_labels(&["Front Camera"]);
        devices.permission = false;
        let mut capture = CaptureSession::new(devices);
        assert!(matches!(
            capture.acquire(None),
            Err(CaptureError::PermissionDenied)
        ));
    }

    #[test]
    fn test_no_device() {
        let mut capture = CaptureSession::new(FakeDevices::with_labels(&[]));
        assert!(matches!(capture.acquire(None), Err(CaptureError::NoDevice)));
    }

    #[test]
    fn test_switch_to_opposite_facing() {
        let devices = FakeDevices::with_labels(&["Front Camera", "Back Camera"]);
        let mut capture = CaptureSession::new(devices);

        capture.acquire(None).unwrap();
        let session = capture.switch().unwrap();
        assert_eq!(session.facing(), Facing::Back);
        assert!(session.is_live());
    }

    #[test]
    fn test_switch_with_single_device_fails_cleanly() {
        let devices = FakeDevices::with_labels(&["Front Camera"]);
        let stops = Arc::clone(&devices.stops);
        let mut capture = CaptureSession::new(devices);

        capture.acquire(None).unwrap();
        assert!(matches!(
            capture.switch(),
            Err(CaptureError::NoAlternateDevice)
        ));
        // The outgoing stream was stopped exactly once and nothing is live
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(capture.active().is_none());
    }

    #[test]
    fn test_acquire_replaces_previous_stream() {
        let devices = FakeDevices::with_labels(&["Front Camera", "Back Camera"]);
        let stops = Arc::clone(&devices.stops);
        let mut capture = CaptureSession::new(devices);

        capture.acquire(None).unwrap();
        capture.acquire(None).unwrap();
        // First stream stopped when the second was acquired
        assert_eq!(stops.load(Ordering::SeqCst), 1);
        assert!(capture.active().unwrap().is_live());
    }

    #[test]
    fn test_release_is_idempotent() {
        let devices = FakeDevices::with_labels(&["Front Camera"]);
        let stops = Arc::clone(&devices.stops);
        let mut capture = CaptureSession::new(devices);

        capture.acquire(None).unwrap();
        capture.release();
        capture.release();
        capture.release();
        assert_eq!(stops.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_unknown_facing_cannot_switch() {
        let devices = FakeDevices::with_labels(&["USB Webcam", "Another Webcam"]);
        let mut capture = CaptureSession::new(devices);
        capture.acquire(None).unwrap();
        assert!(matches!(
            capture.switch(),
            Err(CaptureError::NoAlternateDevice)
        ));
    }

    #[test]
    fn test_platform_support_heuristic() {
        assert!(!CaptureSession::<FakeDevices>::capture_supported(
            "Mozilla/5.0 (iPhone; CPU iPhone OS 16_0 like Mac OS X)"
        ));
        assert!(!CaptureSession::<FakeDevices>::capture_supported(
            "Mozilla/5.0 (iPad; CPU OS 15_0 like Mac OS X)"
        ));
        assert!(CaptureSession::<FakeDevices>::capture_supported(
            "Mozilla/5.0 (X11; Linux x86_64) Firefox/126.0"
        ));
        assert!(CaptureSession::<FakeDevices>::ensure_supported("curl/8.0").is_ok());
    }
}
