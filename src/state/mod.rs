//! State module for tracking one orchestration run
//!
//! # Components
//!
//! - `FetchRequest` / `FetchOutcome`: what was asked for and what came back, per URL
//! - `RunContext`: per-run clock, deadline and counters shared by the pool workers

mod outcome;
mod run_context;

// Re-export main types
pub use outcome::{BlockReason, ErrorKind, FetchError, FetchOutcome, FetchPhase, FetchRequest};
pub use run_context::RunContext;
