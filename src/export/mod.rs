//! # Export
//!
//! Snapshots the composed frame into a JPEG download, pixel-consistent with
//! the live preview: both render through the same [`CompositionFrame`]
//! descriptor and the same rasterizer mapping.
//!
//! [`CompositionFrame`]: crate::composition::CompositionFrame

pub mod exporter;
pub mod rasterizer;

pub use exporter::{ExportOptions, Exporter};
pub use rasterizer::{Rasterizer, SoftwareRasterizer};
