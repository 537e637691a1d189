//! bugfix-profiler - submit bug reports and follow the fixing job
//!
//! Library core for the `bugfix` binary. Describes a bug, posts it to the
//! remote fixing service, keeps the job result in a session store, plays
//! the pipeline progress animation and renders the final result.

pub mod client;
pub mod config;
pub mod error;
pub mod flow;
pub mod progress;
pub mod render;
pub mod session;
pub mod types;
