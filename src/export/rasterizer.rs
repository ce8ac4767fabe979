use image::{imageops, Rgba, RgbaImage};
use tracing::debug;

use crate::composition::CompositionFrame;
use crate::error::ExportError;

/// Rasterization collaborator: turns a frame descriptor into pixels
pub trait Rasterizer: Send + Sync {
    fn rasterize(&self, frame: &CompositionFrame) -> Result<RgbaImage, ExportError>;
}

/// Deterministic software compositor
///
/// Reproduces the preview mapping exactly: fill with the background color,
/// scale the subject uniformly to `scale_percent` of the frame width, and
/// alpha-composite it with its origin at `(offset_x, offset_y)`. Anything
/// overhanging the frame is clipped; nothing is letterboxed.
pub struct SoftwareRasterizer;

impl SoftwareRasterizer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SoftwareRasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&self, frame: &CompositionFrame) -> Result<RgbaImage, ExportError> {
        if frame.width == 0 || frame.height == 0 {
            return Err(ExportError::RasterizationFailed {
                reason: format!("degenerate frame {}x{}", frame.width, frame.height),
            });
        }

        let [r, g, b] = frame.background.rgb();
        let mut canvas = RgbaImage::from_pixel(frame.width, frame.height, Rgba([r, g, b, 255]));

        if let Some(layer) = &frame.subject_layer {
            let subject = layer.image.pixels();
            if subject.width() == 0 || subject.height() == 0 {
                return Err(ExportError::RasterizationFailed {
                    reason: "subject image has no pixels".to_string(),
                });
            }

            let target_width =
                ((layer.scale_percent / 100.0) * frame.width as f32).round() as u32;
            let target_height = (target_width as f32 * layer.image.aspect()).round() as u32;
            debug!(
                "compositing subject at ({}, {}) scaled to {}x{}",
                layer.offset_x, layer.offset_y, target_width, target_height
            );

            if target_width > 0 && target_height > 0 {
                let resized = imageops::resize(
                    subject,
                    target_width,
                    target_height,
                    imageops::FilterType::Triangle,
                );
                imageops::overlay(
                    &mut canvas,
                    &resized,
                    layer.offset_x as i64,
                    layer.offset_y as i64,
                );
            }
        }

        Ok(canvas)
    }
}
