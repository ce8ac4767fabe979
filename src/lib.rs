//! # pasfoto
//!
//! Compose ID-style photos: strip the background from a captured or
//! uploaded image, place the cut-out subject over a solid background inside
//! a fixed-aspect frame, and export the composed frame as a JPEG that
//! matches the preview exactly.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pasfoto::{
//!     composition::{AspectPreset, BackgroundColor, CompositionModel},
//!     export::{Exporter, ExportOptions},
//!     removal::{CornerMatting, RemovalOrchestrator},
//!     media::RawImage,
//! };
//!
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let mut orchestrator = RemovalOrchestrator::new(CornerMatting::default());
//! orchestrator.process(RawImage::open("me.png")?).await;
//!
//! let mut model = CompositionModel::default();
//! model.set_aspect(AspectPreset::ThreeFour);
//! model.set_background(BackgroundColor::Blue);
//! model.set_scale(1.2);
//!
//! let frame = model.render(orchestrator.subject().as_ref());
//! let bytes = Exporter::new(90).export(&frame, ExportOptions::default())?;
//! std::fs::write("pasfoto.jpg", bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! - [`capture`] - Camera session lifecycle and device switching
//! - [`removal`] - Background-removal orchestration state machine
//! - [`composition`] - Frame placement model (pure, no I/O)
//! - [`export`] - Deterministic rasterization and JPEG export
//! - [`config`] - Configuration management
//!
//! ## Custom removal backends
//!
//! Segmentation itself is a collaborator: implement
//! [`BackgroundRemover`](removal::BackgroundRemover) and hand it to the
//! orchestrator.
//!
//! ```rust,no_run
//! use pasfoto::removal::BackgroundRemover;
//! use pasfoto::media::RawImage;
//! use pasfoto::error::RemovalError;
//!
//! struct MyBackend;
//!
//! impl BackgroundRemover for MyBackend {
//!     fn name(&self) -> &str {
//!         "my-backend"
//!     }
//!
//!     fn remove(
//!         &self,
//!         input: &RawImage,
//!         progress: &mut dyn FnMut(&str, u64, u64),
//!     ) -> Result<Vec<u8>, RemovalError> {
//!         progress("compute:inference", 1, 1);
//!         // Return PNG-encoded RGBA bytes
//!         todo!()
//!     }
//! }
//! ```

pub mod capture;
pub mod composition;
pub mod config;
pub mod error;
pub mod export;
pub mod media;
pub mod removal;

// Re-export commonly used types for convenience
pub use crate::{
    composition::CompositionModel,
    config::Config,
    error::{PasfotoError, Result},
    export::Exporter,
    removal::{BackgroundRemover, ProcessingState, RemovalOrchestrator},
};
