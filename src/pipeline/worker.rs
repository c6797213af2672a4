//! Worker thread logic for parallel formatting
//!
//! Each worker:
//! - Pulls tasks from the shared queue until it is closed and drained
//! - Applies the transformation to the task content
//! - Skips the write when the output is byte-identical to the input
//! - Otherwise writes the new content back through the content store
//! - Emits exactly one outcome per task to the aggregator
//!
//! Workers never talk to each other. A failed write, or a panic while
//! handling a task, is reported as an outcome plus an error-log message; it
//! never stops the worker.

use crate::error::{FileOutcome, WorkerError};
use crate::pipeline::aggregator::{OutcomeEvent, OutcomeHandle};
use crate::pipeline::queue::{Task, TaskReceiver};
use crate::store::ContentStore;
use crate::transform::Transform;
use crossbeam_channel::Sender;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace, warn};

/// Everything a worker needs, shared between all workers
#[derive(Clone)]
pub struct WorkerContext {
    /// Transformation applied to every task
    pub transform: Arc<dyn Transform>,

    /// Where rewritten content goes
    pub store: Arc<dyn ContentStore>,

    /// Outcome channel to the aggregator
    pub outcomes: OutcomeHandle,

    /// Error-log channel back to the coordinator
    pub errors: Sender<String>,
}

/// A worker thread that processes format tasks
pub struct Worker {
    /// Worker ID
    id: usize,

    /// Thread handle, yields the number of tasks processed
    handle: JoinHandle<u64>,
}

impl Worker {
    /// Spawn a new worker thread
    pub fn spawn(
        id: usize,
        queue_rx: TaskReceiver,
        ctx: WorkerContext,
    ) -> Result<Self, WorkerError> {
        let handle = thread::Builder::new()
            .name(format!("formatter-{}", id))
            .spawn(move || worker_loop(id, queue_rx, ctx))
            .map_err(|e| WorkerError::SpawnFailed {
                name: format!("worker {}", id),
                reason: e.to_string(),
            })?;

        Ok(Self { id, handle })
    }

    /// Get worker ID
    pub fn id(&self) -> usize {
        self.id
    }

    /// Wait for the worker to finish
    pub fn join(self) -> Result<u64, WorkerError> {
        self.handle.join().map_err(|_| WorkerError::Panicked {
            id: self.id,
            message: "Worker thread panicked".into(),
        })
    }
}

/// Main worker loop
fn worker_loop(id: usize, queue_rx: TaskReceiver, ctx: WorkerContext) -> u64 {
    debug!(worker = id, transform = ctx.transform.name(), "Worker starting");

    let mut processed = 0u64;
    while let Some(task) = queue_rx.recv() {
        let bytes = task.content.len() as u64;
        let (outcome, message) = process_task(id, &task, &*ctx.transform, &*ctx.store);

        if let Some(message) = message {
            warn!(worker = id, path = %task.path.display(), "{}", message);
            // The coordinator holds the receiver until every worker is joined
            let _ = ctx.errors.send(message);
        }

        let delivered = ctx.outcomes.send(OutcomeEvent {
            path: task.path,
            outcome,
            bytes,
        });
        if !delivered {
            warn!(worker = id, "Aggregator gone, outcome dropped");
        }
        processed += 1;
    }

    debug!(worker = id, processed = processed, "Worker shutting down");
    processed
}

/// Process a single task
///
/// Returns the outcome and, on failure, the message destined for the error log.
/// A panic in the transformation or the store becomes an `Error` outcome, so
/// every task still yields exactly one outcome.
pub fn process_task(
    worker_id: usize,
    task: &Task,
    transform: &dyn Transform,
    store: &dyn ContentStore,
) -> (FileOutcome, Option<String>) {
    let attempt = AssertUnwindSafe(|| format_and_write(worker_id, task, transform, store));
    match panic::catch_unwind(attempt) {
        Ok(result) => result,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            let message = format!(
                "worker {}: panicked on {}: {}",
                worker_id,
                task.path.display(),
                detail
            );
            (FileOutcome::Error(format!("panicked: {}", detail)), Some(message))
        }
    }
}

fn format_and_write(
    worker_id: usize,
    task: &Task,
    transform: &dyn Transform,
    store: &dyn ContentStore,
) -> (FileOutcome, Option<String>) {
    let formatted = transform.apply(&task.content);

    if formatted == task.content {
        trace!(worker = worker_id, path = %task.path.display(), "Unchanged");
        return (FileOutcome::Skipped, None);
    }

    match store.write(&task.path, &formatted) {
        Ok(()) => {
            trace!(worker = worker_id, path = %task.path.display(), "Formatted");
            (FileOutcome::Formatted, None)
        }
        Err(e) => {
            let message = format!(
                "worker {}: failed to write {}: {}",
                worker_id,
                task.path.display(),
                e
            );
            (FileOutcome::Error(e.to_string()), Some(message))
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
