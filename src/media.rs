//! Shared image value types passed between capture, removal and composition.

use std::path::Path;

use image::RgbaImage;

use crate::error::{RemovalError, Result};

/// A raw input image, straight from a camera frame or a file upload.
///
/// Pixels are always RGBA; camera frames carry an opaque alpha channel.
#[derive(Clone, Debug)]
pub struct RawImage {
    pixels: RgbaImage,
    source: String,
}

impl RawImage {
    /// Wrap an already-decoded pixel buffer
    pub fn new(pixels: RgbaImage, source: impl Into<String>) -> Self {
        Self {
            pixels,
            source: source.into(),
        }
    }

    /// Decode an image file (the "upload" path)
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let decoded = image::open(path).map_err(|_| RemovalError::InputLoadFailed {
            path: path.display().to_string(),
        })?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
            source: path.display().to_string(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Where this image came from (device label or file path), for logging
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}

/// The background-stripped foreground cut-out produced by segmentation.
///
/// Shared read-only (via `Arc`) between the removal orchestrator, the
/// composition model and the exporter; replaced wholesale when a new
/// removal run resolves.
#[derive(Clone, Debug)]
pub struct SubjectImage {
    pixels: RgbaImage,
}

impl SubjectImage {
    pub fn new(pixels: RgbaImage) -> Self {
        Self { pixels }
    }

    /// Decode PNG-encoded RGBA bytes as returned by a segmentation backend
    pub fn from_png_bytes(bytes: &[u8]) -> Result<Self> {
        let decoded = image::load_from_memory(bytes).map_err(|e| RemovalError::DecodeFailed {
            reason: e.to_string(),
        })?;
        Ok(Self {
            pixels: decoded.to_rgba8(),
        })
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    /// Natural aspect ratio (height / width), used for uniform scaling
    pub fn aspect(&self) -> f32 {
        self.pixels.height() as f32 / self.pixels.width() as f32
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }
}
