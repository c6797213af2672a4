//! Outcome aggregator
//!
//! A single dedicated thread receives one [`OutcomeEvent`] per file and owns
//! the [`Stats`] counters outright. No atomics are involved: counters are
//! only touched by this thread, and the coordinator gets them back from
//! [`Aggregator::finish`] once every sender is gone and the channel is drained.

use crate::error::{FileOutcome, WorkerError};
use crate::progress::ProgressSink;
use crossbeam_channel::{bounded, Receiver, Sender};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

/// Final counters for a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Files rewritten
    pub formatted: u64,

    /// Files already normalized
    pub skipped: u64,

    /// Files that could not be read or written
    pub errors: u64,

    /// Sum of the input sizes of files that reached a worker
    pub bytes_in: u64,
}

impl Stats {
    /// Record one outcome
    pub fn record(&mut self, event: &OutcomeEvent) {
        match event.outcome {
            FileOutcome::Formatted => self.formatted += 1,
            FileOutcome::Skipped => self.skipped += 1,
            FileOutcome::Error(_) => self.errors += 1,
        }
        self.bytes_in += event.bytes;
    }

    /// Total outcomes recorded
    pub fn total(&self) -> u64 {
        self.formatted + self.skipped + self.errors
    }
}

/// One file's result, as delivered to the aggregator
#[derive(Debug, Clone)]
pub struct OutcomeEvent {
    /// File the outcome belongs to
    pub path: PathBuf,

    /// Classification
    pub outcome: FileOutcome,

    /// Input size in bytes (0 when the file could not be read)
    pub bytes: u64,
}

/// Handle for sending outcomes to the aggregator
#[derive(Clone)]
pub struct OutcomeHandle {
    sender: Sender<OutcomeEvent>,
}

impl OutcomeHandle {
    /// Deliver an outcome
    ///
    /// Returns false if the aggregator is gone.
    pub fn send(&self, event: OutcomeEvent) -> bool {
        self.sender.send(event).is_ok()
    }

    #[cfg(test)]
    pub(crate) fn from_sender(sender: Sender<OutcomeEvent>) -> Self {
        Self { sender }
    }
}

/// Aggregator running in its own thread
pub struct Aggregator {
    handle: JoinHandle<Stats>,
    outcome_handle: OutcomeHandle,
}

impl Aggregator {
    /// Spawn the aggregator thread
    ///
    /// `capacity` bounds the outcome channel; the coordinator passes the
    /// worker count, so memory stays flat however many files are found.
    pub fn spawn(capacity: usize, progress: Arc<dyn ProgressSink>) -> Result<Self, WorkerError> {
        let (sender, receiver) = bounded(capacity.max(1));

        let handle = thread::Builder::new()
            .name("aggregator".into())
            .spawn(move || aggregate(receiver, progress))
            .map_err(|e| WorkerError::SpawnFailed {
                name: "aggregator".into(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            handle,
            outcome_handle: OutcomeHandle { sender },
        })
    }

    /// Get a handle for sending outcomes
    pub fn handle(&self) -> OutcomeHandle {
        self.outcome_handle.clone()
    }

    /// Close the channel and wait for the final counters
    ///
    /// Every other [`OutcomeHandle`] must already be dropped, otherwise this
    /// waits for them.
    pub fn finish(self) -> Result<Stats, WorkerError> {
        let Self {
            handle,
            outcome_handle,
        } = self;
        drop(outcome_handle);

        handle.join().map_err(|_| WorkerError::AggregatorPanicked)
    }
}

fn aggregate(receiver: Receiver<OutcomeEvent>, progress: Arc<dyn ProgressSink>) -> Stats {
    let mut stats = Stats::default();

    for event in receiver.iter() {
        trace!(path = %event.path.display(), outcome = event.outcome.label(), "Outcome");
        stats.record(&event);
        progress.advance(1);
    }

    debug!(
        formatted = stats.formatted,
        skipped = stats.skipped,
        errors = stats.errors,
        "Aggregator drained"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::NoProgress;
    use std::sync::atomic::{AtomicU64, Ordering};

    fn event(outcome: FileOutcome, bytes: u64) -> OutcomeEvent {
        OutcomeEvent {
            path: PathBuf::from("x.html"),
            outcome,
            bytes,
        }
    }

    #[derive(Default)]
    struct CountingSink(AtomicU64);

    impl ProgressSink for CountingSink {
        fn start(&self, _total: u64) {}

        fn advance(&self, n: u64) {
            self.0.fetch_add(n, Ordering::Relaxed);
        }

        fn finish(&self, _message: &str) {}
    }

    #[test]
    fn test_stats_record() {
        let mut stats = Stats::default();
        stats.record(&event(FileOutcome::Formatted, 10));
        stats.record(&event(FileOutcome::Skipped, 5));
        stats.record(&event(FileOutcome::Error("x".into()), 0));

        assert_eq!(stats.formatted, 1);
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.errors, 1);
        assert_eq!(stats.bytes_in, 15);
        assert_eq!(stats.total(), 3);
    }

    #[test]
    fn test_aggregator_counts_from_many_threads() {
        let sink = Arc::new(CountingSink::default());
        let aggregator = Aggregator::spawn(8, sink.clone()).unwrap();

        let producers: Vec<_> = (0..4)
            .map(|i| {
                let handle = aggregator.handle();
                thread::spawn(move || {
                    for _ in 0..25 {
                        let outcome = if i % 2 == 0 {
                            FileOutcome::Formatted
                        } else {
                            FileOutcome::Skipped
                        };
                        assert!(handle.send(event(outcome, 1)));
                    }
                })
            })
            .collect();
        for p in producers {
            p.join().unwrap();
        }

        let stats = aggregator.finish().unwrap();
        assert_eq!(stats.formatted, 50);
        assert_eq!(stats.skipped, 50);
        assert_eq!(stats.errors, 0);
        assert_eq!(stats.bytes_in, 100);
        assert_eq!(sink.0.load(Ordering::Relaxed), 100);
    }

    #[test]
    fn test_finish_without_events() {
        let aggregator = Aggregator::spawn(0, Arc::new(NoProgress)).unwrap();
        assert_eq!(aggregator.finish().unwrap(), Stats::default());
    }
}
