use std::sync::Arc;

use tracing::debug;

use crate::composition::params::{AspectPreset, BackgroundColor, CompositionParams};
use crate::media::SubjectImage;

/// Pure placement model for the editor
///
/// Owns the `CompositionParams` exclusively; setters validate and clamp,
/// `render` turns the current parameters plus an optional subject into a
/// `CompositionFrame` descriptor with no side effects.
#[derive(Debug, Clone)]
pub struct CompositionModel {
    params: CompositionParams,
}

impl CompositionModel {
    pub fn new(params: CompositionParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CompositionParams {
        &self.params
    }

    /// Select an aspect preset; width and height change together
    pub fn set_aspect(&mut self, aspect: AspectPreset) {
        debug!("aspect -> {} ({:?})", aspect, aspect.dimensions());
        self.params.aspect = aspect;
    }

    pub fn set_background(&mut self, background: BackgroundColor) {
        debug!("background -> {}", background);
        self.params.background = background;
    }

    /// Move the subject layer; either axis may be left unchanged.
    /// Out-of-range values clamp to the slider bounds.
    pub fn set_offset(&mut self, x: Option<i32>, y: Option<i32>) {
        if let Some(x) = x {
            self.params.offset_x = CompositionParams::clamp_offset(x);
        }
        if let Some(y) = y {
            self.params.offset_y = CompositionParams::clamp_offset(y);
        }
    }

    /// Set the zoom factor, clamped to the slider bounds
    pub fn set_scale(&mut self, scale: f32) {
        self.params.scale = CompositionParams::clamp_scale(scale);
    }

    /// Describe the composed frame for the current parameters
    ///
    /// Pure: identical params and identical subject reference always yield
    /// an identical frame, regardless of call history.
    pub fn render(&self, subject: Option<&Arc<SubjectImage>>) -> CompositionFrame {
        let (width, height) = self.params.aspect.dimensions();
        CompositionFrame {
            width,
            height,
            background: self.params.background,
            subject_layer: subject.map(|image| SubjectLayer {
                image: Arc::clone(image),
                offset_x: self.params.offset_x,
                offset_y: self.params.offset_y,
                scale_percent: self.params.scale * 100.0,
            }),
        }
    }
}

impl Default for CompositionModel {
    fn default() -> Self {
        Self::new(CompositionParams::default())
    }
}

/// Descriptor of the visible composed region
///
/// This is exactly what the exporter rasterizes; preview and export share it
/// so the downloaded file matches the on-screen state pixel for pixel.
#[derive(Debug, Clone)]
pub struct CompositionFrame {
    pub width: u32,
    pub height: u32,
    pub background: BackgroundColor,
    pub subject_layer: Option<SubjectLayer>,
}

/// The subject cut-out placed inside the frame
#[derive(Debug, Clone)]
pub struct SubjectLayer {
    pub image: Arc<SubjectImage>,
    /// Pixels right of the frame's left edge
    pub offset_x: i32,
    /// Pixels below the frame's top edge
    pub offset_y: i32,
    /// Rendered subject width as a percentage of the frame width
    pub scale_percent: f32,
}

impl PartialEq for SubjectLayer {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.image, &other.image)
            && self.offset_x == other.offset_x
            && self.offset_y == other.offset_y
            && self.scale_percent == other.scale_percent
    }
}

impl PartialEq for CompositionFrame {
    fn eq(&self, other: &Self) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.background == other.background
            && self.subject_layer == other.subject_layer
    }
}
