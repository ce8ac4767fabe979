use image::{Rgba, RgbaImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::RemovalError;
use crate::media::RawImage;
use crate::removal::BackgroundRemover;

/// Tuning for [`CornerMatting`]
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct MattingParams {
    /// Color distance below which a pixel is fully background
    pub tolerance: f32,
    /// Width of the soft edge band above `tolerance`
    pub feather: f32,
}

impl Default for MattingParams {
    fn default() -> Self {
        Self {
            tolerance: 40.0,
            feather: 30.0,
        }
    }
}

/// Built-in reference removal backend
///
/// Estimates the background color from the four corner patches of the input
/// and keys out pixels by chroma distance, with a feathered edge. Good
/// enough for flat studio backdrops; anything smarter lives behind the
/// [`BackgroundRemover`] trait.
pub struct CornerMatting {
    params: MattingParams,
}

impl CornerMatting {
    pub fn new(params: MattingParams) -> Self {
        Self { params }
    }

    /// Average color of the four corner patches
    fn estimate_background(pixels: &RgbaImage) -> [f32; 3] {
        let (width, height) = pixels.dimensions();
        let patch = (width.min(height) / 20).max(1);

        let mut sum = [0.0f64; 3];
        let mut count = 0u64;
        let corners = [
            (0, 0),
            (width - patch.min(width), 0),
            (0, height - patch.min(height)),
            (width - patch.min(width), height - patch.min(height)),
        ];
        for (cx, cy) in corners {
            for y in cy..(cy + patch).min(height) {
                for x in cx..(cx + patch).min(width) {
                    let Rgba([r, g, b, _]) = *pixels.get_pixel(x, y);
                    sum[0] += r as f64;
                    sum[1] += g as f64;
                    sum[2] += b as f64;
                    count += 1;
                }
            }
        }
        [
            (sum[0] / count as f64) as f32,
            (sum[1] / count as f64) as f32,
            (sum[2] / count as f64) as f32,
        ]
    }

    fn alpha_for(&self, pixel: Rgba<u8>, background: [f32; 3]) -> u8 {
        let dr = pixel[0] as f32 - background[0];
        let dg = pixel[1] as f32 - background[1];
        let db = pixel[2] as f32 - background[2];
        let distance = (dr * dr + dg * dg + db * db).sqrt();

        if distance <= self.params.tolerance {
            0
        } else if distance >= self.params.tolerance + self.params.feather {
            255
        } else {
            let t = (distance - self.params.tolerance) / self.params.feather;
            (t * 255.0).round() as u8
        }
    }
}

impl Default for CornerMatting {
    fn default() -> Self {
        Self::new(MattingParams::default())
    }
}

impl BackgroundRemover for CornerMatting {
    fn name(&self) -> &str {
        "corner-matting"
    }

    fn remove(
        &self,
        input: &RawImage,
        progress: &mut dyn FnMut(&str, u64, u64),
    ) -> std::result::Result<Vec<u8>, RemovalError> {
        let pixels = input.pixels();
        let (width, height) = pixels.dimensions();
        if width == 0 || height == 0 {
            return Err(RemovalError::SegmentationFailed {
                reason: "empty input image".to_string(),
            });
        }

        progress("prepare:background", 0, 1);
        let background = Self::estimate_background(pixels);
        debug!("estimated background color: {:?}", background);
        progress("prepare:background", 1, 1);

        let mut output = RgbaImage::new(width, height);
        for y in 0..height {
            for x in 0..width {
                let mut pixel = *pixels.get_pixel(x, y);
                pixel[3] = self.alpha_for(pixel, background).min(pixel[3]);
                output.put_pixel(x, y, pixel);
            }
            if y % 32 == 0 {
                progress("compute:inference", y as u64, height as u64);
            }
        }
        progress("compute:inference", height as u64, height as u64);

        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(output)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageOutputFormat::Png,
            )
            .map_err(|e| RemovalError::SegmentationFailed {
                reason: e.to_string(),
            })?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::media::SubjectImage;

    /// Green backdrop with a centered red square subject
    fn staged_input() -> RawImage {
        let pixels = RgbaImage::from_fn(64, 64, |x, y| {
            if (24..40).contains(&x) && (24..40).contains(&y) {
                Rgba([200, 30, 30, 255])
            } else {
                Rgba([30, 180, 60, 255])
            }
        });
        RawImage::new(pixels, "staged")
    }

    #[test]
    fn test_backdrop_becomes_transparent_subject_stays() {
        let matting = CornerMatting::default();
        let bytes = matting.remove(&staged_input(), &mut |_, _, _| {}).unwrap();
        let subject = SubjectImage::from_png_bytes(&bytes).unwrap();

        // Corner pixel keyed out, center of the square kept
        assert_eq!(subject.pixels().get_pixel(2, 2)[3], 0);
        assert_eq!(subject.pixels().get_pixel(32, 32)[3], 255);
    }

    #[test]
    fn test_progress_covers_both_phases() {
        let matting = CornerMatting::default();
        let mut keys = Vec::new();
        matting
            .remove(&staged_input(), &mut |key, _, _| keys.push(key.to_string()))
            .unwrap();

        assert!(keys.iter().any(|k| k == "prepare:background"));
        assert!(keys.iter().any(|k| k == "compute:inference"));
        // Final event reports completion
        assert_eq!(keys.last().unwrap(), "compute:inference");
    }

    #[test]
    fn test_progress_is_monotonic_within_inference() {
        let matting = CornerMatting::default();
        let mut last = 0u64;
        matting
            .remove(&staged_input(), &mut |key, current, total| {
                if key == "compute:inference" {
                    assert!(current >= last);
                    assert_eq!(total, 64);
                    last = current;
                }
            })
            .unwrap();
        assert_eq!(last, 64);
    }

    #[test]
    fn test_existing_alpha_is_preserved() {
        // A pixel already transparent in the input must not become opaque
        let mut pixels = RgbaImage::from_pixel(16, 16, Rgba([30, 180, 60, 255]));
        pixels.put_pixel(8, 8, Rgba([200, 30, 30, 0]));
        let matting = CornerMatting::default();
        let bytes = matting
            .remove(&RawImage::new(pixels, "alpha"), &mut |_, _, _| {})
            .unwrap();
        let subject = SubjectImage::from_png_bytes(&bytes).unwrap();
        assert_eq!(subject.pixels().get_pixel(8, 8)[3], 0);
    }
}
