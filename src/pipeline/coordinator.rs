//! Run coordinator - orchestrates a format run end to end
//!
//! The coordinator is responsible for:
//! - Discovering the files to format
//! - Spawning the workers and the aggregator before any task is queued
//! - Reading each file and feeding the bounded task queue
//! - Closing the queue, joining workers, draining the aggregator
//! - Collecting final statistics and the error log
//!
//! Lifecycle:
//!
//! ```text
//! Idle → Discovering → Dispatching → Draining → Reporting → Done
//!            │                         (workers + aggregator run
//!            └── no files ──→ Done      concurrently with dispatch)
//! ```
//!
//! Consumers must exist before the producer enqueues anything: the queue
//! holds only `W` tasks, so enqueuing with no worker alive would block forever.

use crate::config::FormatConfig;
use crate::discover::find_files;
use crate::error::{FileOutcome, Result, WorkerError};
use crate::pipeline::aggregator::{Aggregator, OutcomeEvent, Stats};
use crate::pipeline::queue::{Task, TaskQueue, TaskReceiver};
use crate::pipeline::worker::{Worker, WorkerContext};
use crate::progress::{NoProgress, ProgressSink};
use crate::store::{ContentStore, FsStore};
use crate::transform::Transform;
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Lifecycle states of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Discovering,
    Dispatching,
    Draining,
    Reporting,
    Done,
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunState::Idle => "idle",
            RunState::Discovering => "discovering",
            RunState::Dispatching => "dispatching",
            RunState::Draining => "draining",
            RunState::Reporting => "reporting",
            RunState::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    /// Files matched by discovery
    pub files_found: u64,

    /// Number of worker threads used (0 when there was nothing to do)
    pub worker_count: usize,

    /// Final counters
    pub stats: Stats,

    /// Error log, one message per failed write
    pub errors: Vec<String>,

    /// Wall-clock time of the run
    #[serde(rename = "elapsed_secs", serialize_with = "serialize_secs")]
    pub duration: Duration,
}

impl RunReport {
    /// True when discovery found no files
    pub fn is_empty(&self) -> bool {
        self.files_found == 0
    }

    /// True when any file ended in error
    pub fn has_errors(&self) -> bool {
        self.stats.errors > 0
    }
}

fn serialize_secs<S>(duration: &Duration, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_f64(duration.as_secs_f64())
}

/// Coordinates a parallel format run
pub struct FormatCoordinator {
    /// Configuration
    config: Arc<FormatConfig>,

    /// Transformation applied by every worker
    transform: Arc<dyn Transform>,

    /// Content store for reads and writes
    store: Arc<dyn ContentStore>,

    /// Progress sink driven by the aggregator
    progress: Arc<dyn ProgressSink>,

    /// Current lifecycle state
    state: RunState,
}

impl FormatCoordinator {
    /// Create a new coordinator using the real filesystem and no progress display
    pub fn new(config: FormatConfig, transform: Arc<dyn Transform>) -> Self {
        Self {
            config: Arc::new(config),
            transform,
            store: Arc::new(FsStore),
            progress: Arc::new(NoProgress),
            state: RunState::Idle,
        }
    }

    /// Use a different content store
    pub fn with_store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.store = store;
        self
    }

    /// Use a progress sink
    pub fn with_progress(mut self, progress: Arc<dyn ProgressSink>) -> Self {
        self.progress = progress;
        self
    }

    /// Current lifecycle state
    pub fn state(&self) -> RunState {
        self.state
    }

    /// Run discovery and format every file found
    ///
    /// Only a discovery (or thread spawn) failure is an `Err`; per-file
    /// failures end up in the report.
    pub fn run(mut self) -> Result<RunReport> {
        let start_time = Instant::now();
        self.config.validate()?;

        self.transition(RunState::Discovering);
        let files = find_files(&self.config)?;

        if files.is_empty() {
            info!(root = %self.config.root.display(), "No files found to format");
            self.transition(RunState::Done);
            return Ok(RunReport {
                files_found: 0,
                worker_count: 0,
                stats: Stats::default(),
                errors: Vec::new(),
                duration: start_time.elapsed(),
            });
        }

        let worker_count = self.config.worker_count;
        info!(
            root = %self.config.root.display(),
            files = files.len(),
            workers = worker_count,
            transform = self.transform.name(),
            "Starting format run"
        );

        self.transition(RunState::Dispatching);
        self.progress.start(files.len() as u64);

        // Consumers first
        let aggregator = Aggregator::spawn(worker_count, Arc::clone(&self.progress))?;
        let (error_tx, error_rx) = crossbeam_channel::unbounded();
        let queue = TaskQueue::new(worker_count);
        let queue_stats = queue.stats();
        let (task_tx, task_rx) = queue.split();

        let ctx = WorkerContext {
            transform: Arc::clone(&self.transform),
            store: Arc::clone(&self.store),
            outcomes: aggregator.handle(),
            errors: error_tx,
        };
        let workers = spawn_workers(worker_count, &task_rx, &ctx)?;
        drop(task_rx);
        let outcomes = ctx.outcomes.clone();
        drop(ctx);

        // Producer
        for path in files.iter() {
            match self.store.read(path) {
                Ok(content) => {
                    if let Err(task) = task_tx.send(Task::new(path.clone(), content)) {
                        // Every worker is gone; the file still needs its outcome
                        warn!(path = %task.path.display(), "No workers left to accept task");
                        if !outcomes.send(error_event(task.path, "no workers available".into())) {
                            warn!("Aggregator gone, outcome dropped");
                        }
                    }
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Error reading file");
                    if !outcomes.send(error_event(path.clone(), e.to_string())) {
                        warn!(path = %path.display(), "Aggregator gone, outcome dropped");
                    }
                }
            }
        }

        // Closing the queue is the workers' termination signal
        drop(task_tx);
        drop(outcomes);

        self.transition(RunState::Draining);
        join_workers(workers);

        self.transition(RunState::Reporting);
        let mut stats = aggregator.finish()?;
        let mut errors: Vec<String> = error_rx.iter().collect();

        let files_found = files.len() as u64;
        let missing = files_found.saturating_sub(stats.total());
        if missing > 0 {
            warn!(missing = missing, "Files finished without an outcome");
            stats.errors += missing;
            errors.push(format!("{} file(s) finished without an outcome", missing));
        }
        self.progress.finish("Format completed");

        let duration = start_time.elapsed();
        info!(
            formatted = stats.formatted,
            skipped = stats.skipped,
            errors = stats.errors,
            backpressure = queue_stats.backpressure_count(),
            duration_secs = duration.as_secs_f64(),
            "Format run completed"
        );

        self.transition(RunState::Done);
        Ok(RunReport {
            files_found,
            worker_count,
            stats,
            errors,
            duration,
        })
    }

    fn transition(&mut self, next: RunState) {
        debug!(from = %self.state, to = %next, "Run state");
        self.state = next;
    }
}

fn error_event(path: PathBuf, detail: String) -> OutcomeEvent {
    OutcomeEvent {
        path,
        outcome: FileOutcome::Error(detail),
        bytes: 0,
    }
}

/// Spawn worker threads
fn spawn_workers(
    count: usize,
    task_rx: &TaskReceiver,
    ctx: &WorkerContext,
) -> std::result::Result<Vec<Worker>, WorkerError> {
    let mut workers = Vec::with_capacity(count);
    for id in 0..count {
        workers.push(Worker::spawn(id, task_rx.clone(), ctx.clone())?);
    }

    debug!(count = workers.len(), "Workers spawned");
    Ok(workers)
}

/// Join all worker threads
fn join_workers(workers: Vec<Worker>) {
    for worker in workers {
        let id = worker.id();
        match worker.join() {
            Ok(processed) => debug!(worker = id, processed = processed, "Worker joined"),
            Err(e) => warn!(error = %e, "Worker failed to join cleanly"),
        }
    }
}
