//! Bounded task queue with backpressure
//!
//! The coordinator is the single producer; workers are the consumers. The
//! queue capacity equals the worker count, so at most `W` file contents are
//! buffered at any time regardless of how many files were discovered.
//!
//! Closing the queue is the workers' termination signal: once the producer
//! handle is dropped, `recv` drains what is left and then returns `None`.

use crossbeam_channel::{bounded, Receiver, SendError, Sender, TrySendError};
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// A file queued for formatting
#[derive(Debug)]
pub struct Task {
    /// Path of the file
    pub path: PathBuf,

    /// Original content, as read by the coordinator
    pub content: Vec<u8>,
}

impl Task {
    /// Create a new task
    pub fn new(path: PathBuf, content: Vec<u8>) -> Self {
        Self { path, content }
    }
}

/// Statistics for the task queue
#[derive(Debug, Default)]
pub struct QueueStats {
    /// Total tasks enqueued
    pub enqueued: AtomicU64,

    /// Total tasks dequeued
    pub dequeued: AtomicU64,

    /// Number of sends that found the queue full and had to wait
    pub backpressure_events: AtomicU64,
}

impl QueueStats {
    /// Get number of dequeued tasks
    pub fn throughput(&self) -> u64 {
        self.dequeued.load(Ordering::Relaxed)
    }

    /// Get backpressure event count
    pub fn backpressure_count(&self) -> u64 {
        self.backpressure_events.load(Ordering::Relaxed)
    }
}

/// Bounded task queue
pub struct TaskQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
    capacity: usize,
    stats: Arc<QueueStats>,
}

impl TaskQueue {
    /// Create a new task queue with the specified capacity
    pub fn new(capacity: usize) -> Self {
        let (sender, receiver) = bounded(capacity);

        Self {
            sender,
            receiver,
            capacity,
            stats: Arc::new(QueueStats::default()),
        }
    }

    /// Get queue capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get queue statistics
    pub fn stats(&self) -> Arc<QueueStats> {
        Arc::clone(&self.stats)
    }

    /// Split into the single producer handle and a cloneable consumer handle
    ///
    /// Consumes the queue so that no stray sender keeps it open.
    pub fn split(self) -> (TaskSender, TaskReceiver) {
        let sender = TaskSender {
            sender: self.sender,
            stats: Arc::clone(&self.stats),
        };
        let receiver = TaskReceiver {
            receiver: self.receiver,
            stats: self.stats,
        };
        (sender, receiver)
    }
}

/// Producer handle. Dropping it closes the queue.
pub struct TaskSender {
    sender: Sender<Task>,
    stats: Arc<QueueStats>,
}

impl TaskSender {
    /// Send a task, blocking while the queue is full
    ///
    /// Returns the task back if every consumer is gone.
    pub fn send(&self, task: Task) -> Result<(), Task> {
        let task = match self.sender.try_send(task) {
            Ok(()) => {
                self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
                return Ok(());
            }
            Err(TrySendError::Full(task)) => {
                self.stats.backpressure_events.fetch_add(1, Ordering::Relaxed);
                task
            }
            Err(TrySendError::Disconnected(task)) => return Err(task),
        };

        self.sender.send(task).map_err(|SendError(task)| task)?;
        self.stats.enqueued.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Get current queue length
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Check if the queue is empty
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

/// Consumer handle (clone one per worker)
#[derive(Clone)]
pub struct TaskReceiver {
    receiver: Receiver<Task>,
    stats: Arc<QueueStats>,
}

impl TaskReceiver {
    /// Receive a task from the queue
    ///
    /// Blocks until a task is available. Returns `None` once the queue is
    /// closed and drained.
    pub fn recv(&self) -> Option<Task> {
        match self.receiver.recv() {
            Ok(task) => {
                self.stats.dequeued.fetch_add(1, Ordering::Relaxed);
                Some(task)
            }
            Err(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn task(name: &str) -> Task {
        Task::new(PathBuf::from(name), name.as_bytes().to_vec())
    }

    #[test]
    fn test_queue_basic() {
        let queue = TaskQueue::new(4);
        assert_eq!(queue.capacity(), 4);
        let (tx, rx) = queue.split();

        tx.send(task("/a.html")).unwrap();
        assert_eq!(tx.len(), 1);

        let got = rx.recv().unwrap();
        assert_eq!(got.path, PathBuf::from("/a.html"));
        assert_eq!(got.content, b"/a.html".to_vec());
        assert!(tx.is_empty());
    }

    #[test]
    fn test_closed_queue_drains_then_ends() {
        let (tx, rx) = TaskQueue::new(2).split();
        tx.send(task("a")).unwrap();
        tx.send(task("b")).unwrap();
        drop(tx);

        assert!(rx.recv().is_some());
        assert!(rx.recv().is_some());
        assert!(rx.recv().is_none());
    }

    #[test]
    fn test_queue_backpressure() {
        let queue = TaskQueue::new(1);
        let stats = queue.stats();
        let (tx, rx) = queue.split();

        tx.send(task("a")).unwrap();

        // Second send blocks until the consumer takes the first
        let consumer = thread::spawn(move || {
            let mut seen = 0;
            while rx.recv().is_some() {
                seen += 1;
            }
            seen
        });
        tx.send(task("b")).unwrap();
        drop(tx);

        assert_eq!(consumer.join().unwrap(), 2);
        assert_eq!(stats.enqueued.load(Ordering::Relaxed), 2);
        assert_eq!(stats.throughput(), 2);
    }

    #[test]
    fn test_send_without_consumers_returns_task() {
        let (tx, rx) = TaskQueue::new(1).split();
        drop(rx);

        let back = tx.send(task("orphan")).unwrap_err();
        assert_eq!(back.path, PathBuf::from("orphan"));
    }

    #[test]
    fn test_full_queue_counts_backpressure() {
        let queue = TaskQueue::new(1);
        let stats = queue.stats();
        let (tx, rx) = queue.split();
        tx.send(task("a")).unwrap();

        let handle = thread::spawn(move || tx.send(task("b")));
        // Let the producer hit the full queue before draining
        while stats.backpressure_count() == 0 {
            thread::yield_now();
        }
        assert!(rx.recv().is_some());
        handle.join().unwrap().unwrap();
        assert!(rx.recv().is_some());
        assert_eq!(stats.backpressure_count(), 1);
    }
}
