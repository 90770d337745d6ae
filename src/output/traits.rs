//! Result sink trait
//!
//! The coordinator drives a run and hands every row to a sink as soon as it is
//! known. Sinks decide whether to buffer (batch mode) or forward (streaming
//! mode).

use crate::output::{CleanedResult, RunSummary};
use crate::state::{FetchOutcome, FetchRequest};

/// Receiver of one run's rows, in the order they become known
pub trait ResultSink: Send {
    /// Records a deny-listed row; called before any fetch starts
    fn placeholder(&mut self, row: CleanedResult);

    /// Records a completed fetch and its cleaned row, in completion order
    fn outcome(&mut self, request: FetchRequest, outcome: FetchOutcome, row: CleanedResult);

    /// Records the terminal summary; no calls follow
    fn finish(&mut self, summary: RunSummary);

    /// Whether the consumer has gone away and further work is wasted
    fn is_closed(&self) -> bool {
        false
    }
}
