//! Parallel format pipeline
//!
//! A classic fan-out / fan-in: the coordinator reads files and feeds a
//! bounded queue, `W` workers transform and write, a single aggregator
//! tallies outcomes.
//!
//! # Architecture
//!
//! ```text
//!                     ┌─────────────────────────┐
//!                     │    FormatCoordinator    │
//!                     │  - discover files       │
//!                     │  - read bytes           │
//!                     └───────────┬─────────────┘
//!                                 │ Task (path, content)
//!                     ┌───────────▼─────────────┐
//!                     │  TaskQueue (bounded W)  │
//!                     └───────────┬─────────────┘
//!       ┌─────────────────────────┼─────────────────────────┐
//! ┌─────▼─────┐             ┌─────▼─────┐             ┌─────▼─────┐
//! │  Worker 1 │             │  Worker 2 │             │  Worker W │
//! │ transform │             │ transform │             │ transform │
//! │  write?   │             │  write?   │             │  write?   │
//! └─────┬─────┘             └─────┬─────┘             └─────┬─────┘
//!       └──────────── OutcomeEvent ┼ error log ─────────────┘
//!                     ┌───────────▼─────────────┐
//!                     │       Aggregator        │
//!                     │  - Stats (single owner) │
//!                     │  - progress             │
//!                     └─────────────────────────┘
//! ```

pub mod aggregator;
pub mod coordinator;
pub mod queue;
pub mod worker;

pub use aggregator::{Aggregator, OutcomeEvent, OutcomeHandle, Stats};
pub use coordinator::{FormatCoordinator, RunReport, RunState};
pub use queue::{Task, TaskQueue};
pub use worker::{process_task, Worker};
