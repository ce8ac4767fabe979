//! # Camera Capture
//!
//! Owns the single active camera stream: acquisition, front/back switching,
//! frame sampling and teardown. Device enumeration and the stream itself
//! are collaborator traits so the session logic stays testable without
//! hardware.

pub mod session;

pub use session::{CameraSession, CaptureSession};

use std::fmt;

use crate::error::CaptureError;
use crate::media::RawImage;

/// Which way a camera points
///
/// Inferred from a case-insensitive substring match on the device label.
/// Best-effort only, labels are not standardized across devices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Facing {
    Front,
    Back,
    Unknown,
}

impl Facing {
    /// Infer facing from a device or track label
    pub fn from_label(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("front") {
            Facing::Front
        } else if lower.contains("back") {
            Facing::Back
        } else {
            Facing::Unknown
        }
    }

    /// The facing to switch to, if the current one is known
    pub fn opposite(self) -> Option<Facing> {
        match self {
            Facing::Front => Some(Facing::Back),
            Facing::Back => Some(Facing::Front),
            Facing::Unknown => None,
        }
    }
}

impl fmt::Display for Facing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Facing::Front => "front",
            Facing::Back => "back",
            Facing::Unknown => "unknown",
        };
        write!(f, "{}", name)
    }
}

/// Kind of media input device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceKind {
    VideoInput,
    AudioInput,
    Other,
}

/// One entry from device enumeration
#[derive(Debug, Clone)]
pub struct DeviceInfo {
    pub kind: DeviceKind,
    pub device_id: String,
    pub label: String,
}

/// Constraints for requesting a stream
#[derive(Debug, Clone, Default)]
pub struct StreamConstraints {
    /// Request a specific device
    pub device_id: Option<String>,
    /// Preferred facing when no device is named
    pub facing: Option<Facing>,
}

/// A live video stream handle
///
/// `stop` must be idempotent; `grab_frame` fails with `StreamClosed` once
/// the stream is stopped.
pub trait VideoStream: Send {
    /// The stream's track label (used for facing inference)
    fn label(&self) -> &str;

    fn is_live(&self) -> bool;

    /// Synchronously sample the current frame at native resolution
    fn grab_frame(&mut self) -> Result<RawImage, CaptureError>;

    /// Stop all tracks; safe to call repeatedly
    fn stop(&mut self);
}

/// Media-device collaborator (`getUserMedia`/`enumerateDevices` shaped)
pub trait MediaDevices: Send + Sync {
    fn request_stream(
        &self,
        constraints: &StreamConstraints,
    ) -> Result<Box<dyn VideoStream>, CaptureError>;

    fn enumerate(&self) -> Result<Vec<DeviceInfo>, CaptureError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_facing_from_label() {
        assert_eq!(Facing::from_label("Front Camera"), Facing::Front);
        assert_eq!(Facing::from_label("camera2 0, facing back"), Facing::Back);
        assert_eq!(Facing::from_label("USB Webcam"), Facing::Unknown);
        assert_eq!(Facing::from_label("FRONT FACING"), Facing::Front);
    }

    #[test]
    fn test_opposite_facing() {
        assert_eq!(Facing::Front.opposite(), Some(Facing::Back));
        assert_eq!(Facing::Back.opposite(), Some(Facing::Front));
        assert_eq!(Facing::Unknown.opposite(), None);
    }
}
