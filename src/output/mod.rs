//! Output module for delivering run results
//!
//! This module handles:
//! - Cleaning fetch outcomes into bounded display rows
//! - Batch collection (one response sorted by rank)
//! - Streaming emission (one event per row as it completes)
//! - The terminal run summary

mod batch;
pub mod stats;
mod stream;
mod traits;
mod types;

pub use batch::{BatchCollector, BatchLogs, BatchResponse, RawOutcome};
pub use stats::RunSummary;
pub use stream::{StreamEmitter, StreamEvent};
pub use traits::ResultSink;
pub use types::{CleanedResult, RetryResult, PLACEHOLDER_DESCRIPTION};
