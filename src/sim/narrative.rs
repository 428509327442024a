//! Best-effort narrative enrichment as a bounded background queue.
//!
//! Requests are handed to a detached worker thread; completed texts are
//! drained by the runner at the start of a later cycle and appended to
//! the concluded record's notes. Nothing here gates or fails the
//! transactional cycle: a full queue drops the request, a dead worker is
//! only ever logged.

use std::sync::mpsc::{Receiver, SyncSender, TryRecvError, TrySendError, sync_channel};
use std::thread::JoinHandle;

use crate::error::EngineError;

/// Default bound on in-flight enrichment requests.
pub const NARRATIVE_QUEUE_CAPACITY: usize = 64;

/// Which concluded record a text belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrativeTarget {
    Activity(u64),
    Stratagem(u64),
}

#[derive(Debug, Clone)]
pub struct NarrativeRequest {
    pub target: NarrativeTarget,
    pub actor: u64,
    pub context: String,
}

#[derive(Debug, Clone)]
pub struct NarrativeNote {
    pub target: NarrativeTarget,
    pub text: String,
}

/// Flavor-text collaborator. Implementations may block on I/O; they run
/// on the queue's worker thread, never on the engine cycle.
pub trait NarrativeService: Send + 'static {
    fn reflect(&self, actor: u64, context: &str) -> Result<String, EngineError>;
}

/// Bounded request queue with one detached worker.
pub struct NarrativeQueue {
    requests: SyncSender<NarrativeRequest>,
    completed: Receiver<NarrativeNote>,
    worker: Option<JoinHandle<()>>,
}

impl NarrativeQueue {
    pub fn start(service: impl NarrativeService, capacity: usize) -> Self {
        let (requests, request_rx) = sync_channel::<NarrativeRequest>(capacity);
        let (completed_tx, completed) = sync_channel::<NarrativeNote>(capacity);
        let worker = std::thread::spawn(move || {
            while let Ok(request) = request_rx.recv() {
                match service.reflect(request.actor, &request.context) {
                    Ok(text) => {
                        // Receiver gone means the engine is shutting down.
                        let _ = completed_tx.try_send(NarrativeNote {
                            target: request.target,
                            text,
                        });
                    }
                    Err(err) => {
                        tracing::debug!("narrative reflection skipped: {err}");
                    }
                }
            }
        });
        Self {
            requests,
            completed,
            worker: Some(worker),
        }
    }

    /// Enqueue a request. A full queue drops it; enrichment is at-best
    /// at-least-once over the campaign, never guaranteed per record.
    pub fn enqueue(&self, request: NarrativeRequest) {
        match self.requests.try_send(request) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::debug!("narrative queue full, dropping request for {:?}", dropped.target);
            }
            Err(TrySendError::Disconnected(dropped)) => {
                tracing::debug!("narrative worker gone, dropping request for {:?}", dropped.target);
            }
        }
    }

    /// Texts finished since the last drain, in completion order.
    pub fn drain_completed(&self) -> Vec<NarrativeNote> {
        let mut notes = Vec::new();
        loop {
            match self.completed.try_recv() {
                Ok(note) => notes.push(note),
                Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => break,
            }
        }
        notes
    }
}

impl Drop for NarrativeQueue {
    fn drop(&mut self) {
        // Close the request channel so the worker's recv loop ends.
        let (closed, _) = sync_channel(1);
        self.requests = closed;
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}
