use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task;
use tracing::{debug, info, warn};

use crate::error::RemovalError;
use crate::media::{RawImage, SubjectImage};
use crate::removal::state::{ProcessingState, RemovalMachine};
use crate::removal::BackgroundRemover;

/// Events forwarded from the backend's thread to the state machine
enum RunEvent {
    Progress(String, u64, u64),
    Done(std::result::Result<Vec<u8>, RemovalError>),
}

/// Drives one background-removal run at a time
///
/// The backend executes on a blocking task; its callbacks are forwarded
/// over a channel and applied to the owned [`RemovalMachine`] on the event
/// loop. A superseded run is not aborted (cancellation is cooperative),
/// but its ticket no longer matches, so its late events are discarded and
/// only the latest run's `Ready`/`Failed` is ever observed.
pub struct RemovalOrchestrator<R: BackgroundRemover + 'static> {
    remover: Arc<R>,
    machine: RemovalMachine,
}

impl<R: BackgroundRemover + 'static> RemovalOrchestrator<R> {
    pub fn new(remover: R) -> Self {
        Self {
            remover: Arc::new(remover),
            machine: RemovalMachine::new(),
        }
    }

    pub fn state(&self) -> &ProcessingState {
        self.machine.state()
    }

    /// The current subject, if the last run resolved
    pub fn subject(&self) -> Option<Arc<SubjectImage>> {
        self.machine.subject()
    }

    /// Observe every state transition
    pub fn on_transition<F>(&mut self, listener: F)
    where
        F: FnMut(&ProcessingState) + Send + 'static,
    {
        self.machine.on_transition(listener);
    }

    /// Mark camera negotiation in progress (the UI's "take photo" pressed)
    pub fn acquiring(&mut self) {
        self.machine.acquiring();
    }

    /// Clear any subject and return to idle
    pub fn reset(&mut self) {
        self.machine.reset();
    }

    /// Run background removal on `input` and return the final state
    ///
    /// Any previously displayed subject is cleared before the new run
    /// starts. Backend failures surface as `ProcessingState::Failed`, never
    /// as an `Err` from this method.
    pub async fn process(&mut self, input: RawImage) -> ProcessingState {
        info!(
            "removing background from {} ({}x{}) with {}",
            input.source(),
            input.width(),
            input.height(),
            self.remover.name()
        );

        let ticket = self.machine.begin();
        let remover = Arc::clone(&self.remover);
        let (tx, mut rx) = mpsc::unbounded_channel::<RunEvent>();

        let worker = task::spawn_blocking(move || {
            let mut sink = |key: &str, current: u64, total: u64| {
                // The receiver disappears when this run is superseded;
                // late events simply have nowhere to go
                let _ = tx.send(RunEvent::Progress(key.to_string(), current, total));
            };
            let result = remover.remove(&input, &mut sink);
            let _ = tx.send(RunEvent::Done(result));
        });

        while let Some(event) = rx.recv().await {
            match event {
                RunEvent::Progress(key, current, total) => {
                    self.machine.on_progress(ticket, &key, current, total);
                }
                RunEvent::Done(Ok(bytes)) => {
                    debug!("backend resolved with {} bytes", bytes.len());
                    self.machine.complete(ticket, &bytes);
                    break;
                }
                RunEvent::Done(Err(e)) => {
                    warn!("backend failed: {}", e);
                    self.machine.fail(ticket, e.to_string());
                    break;
                }
            }
        }

        if worker.await.is_err() && self.machine.state().is_removing() {
            // Backend thread died without resolving or rejecting
            self.machine.fail(ticket, "removal backend terminated unexpectedly");
        }
        self.machine.state().clone()
    }
}
