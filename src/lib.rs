//! sitefmt - Concurrent Batch Formatter for Generated Sites
//!
//! Formats every matching file under a directory tree in parallel, writing
//! back only the files whose content actually changed, with live progress
//! and a final summary. Ships a small static file server for previewing the
//! result.
//!
//! # Features
//!
//! - **Parallel Formatting**: A fixed pool of worker threads pulls files from
//!   one shared queue; concurrency never exceeds the configured worker count.
//!
//! - **Memory Efficient**: The task queue holds at most one file per worker,
//!   so memory stays flat no matter how many files are discovered.
//!
//! - **Write Only What Changed**: Transformations are idempotent, so a file
//!   whose formatted content equals its current content is never touched.
//!
//! - **Failure Isolation**: A file that cannot be read or written is counted
//!   and reported; the rest of the run carries on.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                      Source Directory                            │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │ walkdir (suffix + exclude filter)
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                     Coordinator (main thread)                   │
//! │            read bytes → Task → bounded queue (cap = W)          │
//! └─────────────────────────────┬───────────────────────────────────┘
//!                               │
//! │  ┌─────────┐  ┌─────────┐  ┌─────────┐         ┌─────────┐     │
//! │  │Worker 1 │  │Worker 2 │  │Worker 3 │  ...    │Worker W │     │
//! │  │transform│  │transform│  │transform│         │transform│     │
//! │  └────┬────┘  └────┬────┘  └────┬────┘         └────┬────┘     │
//! │       └────────────┴─────┬──────┴────────────────────┘          │
//! │                          ▼                                      │
//! │            ┌──────────────────────────┐                         │
//! │            │    Outcome Aggregator    │                         │
//! │            │  - counters (one owner)  │                         │
//! │            │  - progress bar          │                         │
//! │            └──────────────────────────┘                         │
//! ```
//!
//! # Example
//!
//! ```bash
//! # Format every .html file under ./public
//! sitefmt format --dir public
//!
//! # Eight workers, JSON report, skip vendored files
//! sitefmt format --dir public -w 8 --exclude '/vendor/' --json
//!
//! # Preview the site
//! sitefmt serve --dir public --port 8080
//! ```

pub mod config;
pub mod discover;
pub mod error;
pub mod pipeline;
pub mod progress;
#[cfg(feature = "server")]
pub mod server;
pub mod store;
pub mod transform;

pub use config::{CliArgs, FormatConfig};
pub use error::{FileOutcome, FormatError, Result};
pub use pipeline::{FormatCoordinator, RunReport, Stats};
pub use store::{ContentStore, FsStore};
pub use transform::{Tidy, Transform};
