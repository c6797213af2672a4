//! Static file server module.
//!
//! Serves a built site with extension allow-listing and `.html` /
//! `index.html` fallbacks. Independent of the format pipeline.

pub mod resolve;
pub mod routes;

pub use routes::{build_router, serve, AppState};
