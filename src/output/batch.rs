//! Batch-mode collection
//!
//! Buffers a whole run and produces a single response ordered by rank, along
//! with the intermediate stages for diagnostics.

use crate::output::{CleanedResult, ResultSink, RunSummary};
use crate::state::{FetchOutcome, FetchRequest};
use serde::Serialize;
use serde_json::Value;

/// One raw per-URL outcome, as logged in the batch response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RawOutcome {
    pub rank: u32,
    pub brand: String,
    pub url: String,
    pub outcome: FetchOutcome,
}

/// Intermediate stages of a batch run
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchLogs {
    /// Provider payload, verbatim
    pub serp_raw: Value,

    /// Per-URL outcomes in completion order
    pub scraped_raw: Vec<RawOutcome>,

    /// Cleaned rows of fetched URLs, in completion order
    pub cleaned: Vec<CleanedResult>,
}

/// Complete batch-mode response
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchResponse {
    pub query: String,
    pub location: String,

    /// All rows, placeholders included, ascending by rank
    pub results: Vec<CleanedResult>,

    pub logs: BatchLogs,
    pub stats: Option<RunSummary>,
}

/// Sink that buffers a run for a single response
#[derive(Debug, Default)]
pub struct BatchCollector {
    placeholders: Vec<CleanedResult>,
    raw: Vec<RawOutcome>,
    cleaned: Vec<CleanedResult>,
    summary: Option<RunSummary>,
}

impl BatchCollector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Merges placeholders with fetched rows, sorts by rank and builds the response
    pub fn into_response(self, query: &str, location: &str, serp_raw: Value) -> BatchResponse {
        let mut results: Vec<CleanedResult> = self
            .placeholders
            .into_iter()
            .chain(self.cleaned.iter().cloned())
            .collect();
        results.sort_by_key(|row| row.rank);

        BatchResponse {
            query: query.to_string(),
            location: location.to_string(),
            results,
            logs: BatchLogs {
                serp_raw,
                scraped_raw: self.raw,
                cleaned: self.cleaned,
            },
            stats: self.summary,
        }
    }
}

impl ResultSink for BatchCollector {
    fn placeholder(&mut self, row: CleanedResult) {
        self.placeholders.push(row);
    }

    fn outcome(&mut self, request: FetchRequest, outcome: FetchOutcome, row: CleanedResult) {
        self.raw.push(RawOutcome {
            rank: request.rank,
            brand: request.brand,
            url: request.url,
            outcome,
        });
        self.cleaned.push(row);
    }

    fn finish(&mut self, summary: RunSummary) {
        self.summary = Some(summary);
    }
}
