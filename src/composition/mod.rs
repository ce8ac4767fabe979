//! # Composition Model
//!
//! Pure data and transform math for placing the subject cut-out inside a
//! fixed-aspect frame: aspect preset, offsets, zoom and background color.
//! No I/O happens here; `render` produces the frame descriptor that both
//! the preview and the exporter consume.

pub mod model;
pub mod params;

// Re-exports for convenience
pub use model::{CompositionFrame, CompositionModel, SubjectLayer};
pub use params::{AspectPreset, BackgroundColor, CompositionParams};
