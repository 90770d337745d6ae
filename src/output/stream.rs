//! Streaming-mode emission
//!
//! Rows are forwarded as discrete named events the moment they are known.

use crate::output::{CleanedResult, ResultSink, RunSummary};
use crate::state::{FetchOutcome, FetchRequest};
use serde::Serialize;
use tokio::sync::mpsc::UnboundedSender;

/// One event of the streaming response
#[derive(Debug, Clone, PartialEq)]
pub enum StreamEvent {
    /// A completed or deny-listed row
    Result(CleanedResult),
    /// Terminal summary; last event of a successful run
    Done(RunSummary),
    /// The run could not start (provider failure)
    Error(String),
}

#[derive(Serialize)]
struct ErrorPayload<'a> {
    error: &'a str,
}

impl StreamEvent {
    /// Event name on the wire
    pub fn name(&self) -> &'static str {
        match self {
            Self::Result(_) => "result",
            Self::Done(_) => "done",
            Self::Error(_) => "error",
        }
    }

    /// JSON data line for this event
    pub fn to_json(&self) -> serde_json::Result<String> {
        match self {
            Self::Result(row) => serde_json::to_string(row),
            Self::Done(summary) => serde_json::to_string(summary),
            Self::Error(error) => serde_json::to_string(&ErrorPayload { error }),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done(_) | Self::Error(_))
    }
}

/// Sink that forwards rows to a channel as events
///
/// A closed receiver (the client went away) is not an error: events are
/// dropped and the run finishes on its own.
#[derive(Debug, Clone)]
pub struct StreamEmitter {
    tx: UnboundedSender<StreamEvent>,
}

impl StreamEmitter {
    pub fn new(tx: UnboundedSender<StreamEvent>) -> Self {
        Self { tx }
    }

    pub fn error(&self, message: impl Into<String>) {
        self.send(StreamEvent::Error(message.into()));
    }

    fn send(&self, event: StreamEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!("Stream receiver dropped, discarding event");
        }
    }
}

impl ResultSink for StreamEmitter {
    fn placeholder(&mut self, row: CleanedResult) {
        self.send(StreamEvent::Result(row));
    }

    fn outcome(&mut self, _request: FetchRequest, _outcome: FetchOutcome, row: CleanedResult) {
        self.send(StreamEvent::Result(row));
    }

    fn finish(&mut self, summary: RunSummary) {
        self.send(StreamEvent::Done(summary));
    }

    fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}
