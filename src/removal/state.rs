use std::sync::Arc;

use tracing::{debug, warn};

use crate::media::SubjectImage;

/// Stage of a background-removal run, derived from the collaborator's
/// opaque phase keys
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemovalPhase {
    /// Asset/model fetching (the default for unrecognized keys)
    Download,
    /// Model inference
    Inference,
}

/// Processing state of the capture/removal pipeline
///
/// Exactly one variant is live at a time; the removal machine is the sole
/// writer. `Ready` shares its subject read-only with the composition model
/// and the exporter.
#[derive(Debug, Clone)]
pub enum ProcessingState {
    /// No subject image, nothing in flight
    Idle,
    /// Camera permission/stream negotiation in progress
    Acquiring,
    /// Segmentation in flight
    Removing { progress: u8, phase: RemovalPhase },
    /// Background-stripped subject available
    Ready { subject: Arc<SubjectImage> },
    /// The last run failed; a new capture/upload recovers
    Failed { reason: String },
}

impl ProcessingState {
    pub fn is_removing(&self) -> bool {
        matches!(self, ProcessingState::Removing { .. })
    }

    pub fn subject(&self) -> Option<&Arc<SubjectImage>> {
        match self {
            ProcessingState::Ready { subject } => Some(subject),
            _ => None,
        }
    }
}

impl PartialEq for ProcessingState {
    fn eq(&self, other: &Self) -> bool {
        use ProcessingState::*;
        match (self, other) {
            (Idle, Idle) | (Acquiring, Acquiring) => true,
            (
                Removing { progress, phase },
                Removing {
                    progress: p2,
                    phase: ph2,
                },
            ) => progress == p2 && phase == ph2,
            (Ready { subject }, Ready { subject: s2 }) => Arc::ptr_eq(subject, s2),
            (Failed { reason }, Failed { reason: r2 }) => reason == r2,
            _ => false,
        }
    }
}

/// Identifies one removal run; events stamped with a superseded ticket
/// are discarded
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunTicket {
    generation: u64,
}

/// Key substring that marks progress events as belonging to the
/// inference stage (e.g. "compute:inference")
const INFERENCE_KEY: &str = "inference";

/// Explicit state machine over the segmentation collaborator's callback
/// stream
///
/// Each `begin` bumps a generation counter and hands out a ticket; progress,
/// completion and failure only apply when their ticket is current, so at
/// most one run's effects are ever visible. Starting a new run while a
/// previous subject is displayed first passes through `Idle`, clearing it.
pub struct RemovalMachine {
    state: ProcessingState,
    generation: u64,
    inference_seen: bool,
    listener: Option<Box<dyn FnMut(&ProcessingState) + Send>>,
}

impl std::fmt::Debug for RemovalMachine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RemovalMachine")
            .field("state", &self.state)
            .field("generation", &self.generation)
            .field("inference_seen", &self.inference_seen)
            .finish()
    }
}

impl RemovalMachine {
    pub fn new() -> Self {
        Self {
            state: ProcessingState::Idle,
            generation: 0,
            inference_seen: false,
            listener: None,
        }
    }

    /// Observe every state transition (the UI's subscription point)
    pub fn on_transition<F>(&mut self, listener: F)
    where
        F: FnMut(&ProcessingState) + Send + 'static,
    {
        self.listener = Some(Box::new(listener));
    }

    pub fn state(&self) -> &ProcessingState {
        &self.state
    }

    pub fn subject(&self) -> Option<Arc<SubjectImage>> {
        self.state.subject().cloned()
    }

    fn transition(&mut self, next: ProcessingState) {
        debug!("processing state: {:?} -> {:?}", self.state, next);
        self.state = next;
        if let Some(listener) = self.listener.as_mut() {
            listener(&self.state);
        }
    }

    fn is_current(&self, ticket: RunTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Enter camera permission/stream negotiation
    pub fn acquiring(&mut self) {
        self.transition(ProcessingState::Acquiring);
    }

    /// Drop any subject and return to `Idle`
    pub fn reset(&mut self) {
        self.inference_seen = false;
        self.transition(ProcessingState::Idle);
    }

    /// Start a new removal run
    ///
    /// A previous subject or in-flight run is cleared through `Idle` first;
    /// stale output never overlaps the new input.
    pub fn begin(&mut self) -> RunTicket {
        if !matches!(self.state, ProcessingState::Idle) {
            self.reset();
        }
        self.generation += 1;
        self.inference_seen = false;
        self.transition(ProcessingState::Removing {
            progress: 0,
            phase: RemovalPhase::Download,
        });
        RunTicket {
            generation: self.generation,
        }
    }

    /// Apply one progress event from the collaborator
    ///
    /// Stale tickets and regressions within a phase are discarded. A zero
    /// `total` reads as zero progress rather than dividing by it.
    pub fn on_progress(&mut self, ticket: RunTicket, phase_key: &str, current: u64, total: u64) {
        if !self.is_current(ticket) {
            debug!("discarding progress from superseded run: {}", phase_key);
            return;
        }
        let (previous, previous_phase) = match &self.state {
            ProcessingState::Removing { progress, phase } => (*progress, *phase),
            _ => {
                warn!("progress event outside a removal run: {}", phase_key);
                return;
            }
        };

        let progress = if total == 0 {
            0
        } else {
            ((current as f64 / total as f64) * 100.0).round().min(100.0) as u8
        };

        if phase_key.contains(INFERENCE_KEY) && progress < 100 {
            self.inference_seen = true;
        }
        let phase = if self.inference_seen {
            RemovalPhase::Inference
        } else {
            RemovalPhase::Download
        };

        // Within one phase the collaborator reports non-decreasing progress;
        // a regression is a late or reordered event and is ignored
        if phase == previous_phase && progress < previous {
            debug!("ignoring progress regression {} -> {}", previous, progress);
            return;
        }

        self.transition(ProcessingState::Removing { progress, phase });
    }

    /// Resolve the run with the collaborator's output bytes
    ///
    /// Decode failure is a run failure, not a panic; stale tickets are
    /// discarded.
    pub fn complete(&mut self, ticket: RunTicket, bytes: &[u8]) {
        if !self.is_current(ticket) {
            debug!("discarding result from superseded run");
            return;
        }
        self.inference_seen = false;
        match SubjectImage::from_png_bytes(bytes) {
            Ok(subject) => self.transition(ProcessingState::Ready {
                subject: Arc::new(subject),
            }),
            Err(e) => self.transition(ProcessingState::Failed {
                reason: e.to_string(),
            }),
        }
    }

    /// Fail the run
    pub fn fail(&mut self, ticket: RunTicket, reason: impl Into<String>) {
        if !self.is_current(ticket) {
            debug!("discarding failure from superseded run");
            return;
        }
        self.inference_seen = false;
        self.transition(ProcessingState::Failed {
            reason: reason.into(),
        });
    }
}

impl Default for RemovalMachine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc as StdArc, Mutex};

    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let pixels = image::RgbaImage::new(width, height);
        let mut bytes = Vec::new();
        image::DynamicImage::ImageRgba8(pixels)
            .write_to(
                &mut std::io::Cursor::new(&mut bytes),
                image::ImageOutputFormat::Png,
            )
            .unwrap();
        bytes
    }

    fn recording_machine() -> (RemovalMachine, StdArc<Mutex<Vec<ProcessingState>>>) {
        let mut machine = RemovalMachine::new();
        let log = StdArc::new(Mutex::new(Vec::new()));
        let sink = StdArc::clone(&log);
        machine.on_transition(move |state| sink.lock().unwrap().push(state.clone()));
        (machine, log)
    }

    #[test]
    fn test_progress_scenario_with_inference_switch() {
        let (mut machine, _log) = recording_machine();
        let ticket = machine.begin();
        assert_eq!(
            machine.state(),
            &ProcessingState::Removing {
                progress: 0,
                phase: RemovalPhase::Download
            }
        );

        machine.on_progress(ticket, "compute:inference", 10, 100);
        assert_eq!(
            machine.state(),
            &ProcessingState::Removing {
                progress: 10,
                phase: RemovalPhase::Inference
            }
        );

        machine.on_progress(ticket, "compute:inference", 100, 100);
        machine.complete(ticket, &png_bytes(4, 4));
        assert!(machine.subject().is_some());
        assert!(!machine.inference_seen);
    }

    #[test]
    fn test_zero_total_is_zero_progress() {
        let mut machine = RemovalMachine::new();
        let ticket = machine.begin();
        machine.on_progress(ticket, "fetch:model", 7, 0);
        assert_eq!(
            machine.state(),
            &ProcessingState::Removing {
                progress: 0,
                phase: RemovalPhase::Download
            }
        );
    }

    #[test]
    fn test_progress_is_clamped_to_100() {
        let mut machine = RemovalMachine::new();
        let ticket = machine.begin();
        machine.on_progress(ticket, "fetch:model", 300, 100);
        assert_eq!(
            machine.state(),
            &ProcessingState::Removing {
                progress: 100,
                phase: RemovalPhase::Download
            }
        );
    }

    #[test]
    fn test_superseded_run_is_discarded() {
        let mut machine = RemovalMachine::new();
        let first = machine.begin();
        machine.on_progress(first, "fetch:model", 50, 100);

        let second = machine.begin();
        // Late events from the first run arrive after the second started
        machine.on_progress(first, "compute:inference", 90, 100);
        machine.complete(first, &png_bytes(4, 4));
        assert_eq!(
            machine.state(),
            &ProcessingState::Removing {
                progress: 0,
                phase: RemovalPhase::Download
            }
        );

        machine.complete(second, &png_bytes(2, 2));
        let subject = machine.subject().expect("second run's subject");
        assert_eq!(subject.width(), 2);
    }

    #[test]
    fn test_begin_clears_previous_subject_through_idle() {
        let (mut machine, log) = recording_machine();
        let first = machine.begin();
        machine.complete(first, &png_bytes(4, 4));
        assert!(machine.subject().is_some());

        machine.begin();
        assert!(machine.subject().is_none());

        let states = log.lock().unwrap();
        // Removing(first), Ready, Idle, Removing(second)
        assert!(matches!(states[1], ProcessingState::Ready { .. }));
        assert!(matches!(states[2], ProcessingState::Idle));
        assert!(matches!(states[3], ProcessingState::Removing { .. }));
    }

    #[test]
    fn test_failure_surfaces_reason() {
        let mut machine = RemovalMachine::new();
        let ticket = machine.begin();
        machine.fail(ticket, "model download interrupted");
        assert_eq!(
            machine.state(),
            &ProcessingState::Failed {
                reason: "model download interrupted".to_string()
            }
        );

        // A new run recovers without an explicit reset
        let next = machine.begin();
        machine.on_progress(next, "fetch:model", 1, 10);
        assert!(machine.state().is_removing());
    }

    #[test]
    fn test_undecodable_result_fails_the_run() {
        let mut machine = RemovalMachine::new();
        let ticket = machine.begin();
        machine.complete(ticket, b"garbage");
        assert!(matches!(machine.state(), ProcessingState::Failed { .. }));
    }

    #[test]
    fn test_progress_regression_is_ignored() {
        let mut machine = RemovalMachine::new();
        let ticket = machine.begin();
        machine.on_progress(ticket, "fetch:model", 80, 100);
        machine.on_progress(ticket, "fetch:model", 40, 100);
        assert_eq!(
            machine.state(),
            &ProcessingState::Removing {
                progress: 80,
                phase: RemovalPhase::Download
            }
        );
    }

    #[test]
    fn test_inference_key_at_100_does_not_flip_phase() {
        let mut machine = RemovalMachine::new();
        let ticket = machine.begin();
        machine.on_progress(ticket, "compute:inference", 100, 100);
        assert_eq!(
            machine.state(),
            &ProcessingState::Removing {
                progress: 100,
                phase: RemovalPhase::Download
            }
        );
    }
}
