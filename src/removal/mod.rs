//! # Background Removal
//!
//! Drives one segmentation run at a time, turning the collaborator's
//! progress callbacks into the typed [`ProcessingState`] machine the UI and
//! the composition model consume. The inference itself stays behind the
//! [`BackgroundRemover`] trait.

pub mod matting;
pub mod orchestrator;
pub mod state;

pub use matting::{CornerMatting, MattingParams};
pub use orchestrator::RemovalOrchestrator;
pub use state::{ProcessingState, RemovalMachine, RemovalPhase, RunTicket};

use crate::error::RemovalError;
use crate::media::RawImage;

/// Trait for background-removal backends
///
/// A backend strips the background from one input image, reporting progress
/// as `(phase_key, current, total)` along the way, and resolves once with
/// PNG-encoded RGBA bytes or fails once. Phase keys are opaque strings;
/// keys naming the inference stage (e.g. `compute:inference`) move the
/// run's reported phase from download to inference.
pub trait BackgroundRemover: Send + Sync {
    /// Unique backend name, for logging
    fn name(&self) -> &str;

    /// Strip the background from `input`
    fn remove(
        &self,
        input: &RawImage,
        progress: &mut dyn FnMut(&str, u64, u64),
    ) -> std::result::Result<Vec<u8>, RemovalError>;
}
