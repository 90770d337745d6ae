//! Display rows derived from fetch outcomes

use crate::config::DisplayConfig;
use crate::extract::{clean_optional, PageSignals};
use crate::state::{ErrorKind, FetchOutcome, FetchRequest};
use crate::url::domain_from_url;
use serde::Serialize;

/// Meta description shown on deny-listed rows
pub const PLACEHOLDER_DESCRIPTION: &str =
    "Excluded from competitor view. Toggle 'Show Listicles' to include.";

/// One row of the competitor view
///
/// `rank` identifies the row and always equals the originating request's rank;
/// only the single-URL retry produces rows without one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CleanedResult {
    pub rank: Option<u32>,
    pub brand: String,
    pub permalink: String,
    pub final_url: Option<String>,
    pub response_time_ms: Option<u64>,

    pub title_raw: Option<String>,
    pub title: String,
    pub meta_description_raw: Option<String>,
    pub meta_description: String,
    pub h1_raw: Option<String>,
    pub h1: String,
    pub word_count: usize,

    pub is_blacklisted: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
}

impl CleanedResult {
    /// Builds the row for a fetched request
    ///
    /// Successful pages get truncated display variants of each field. Blocked and
    /// failed pages keep rank, brand and permalink and carry the error instead of
    /// content, so the caller can render a retry-able placeholder.
    pub fn from_outcome(request: &FetchRequest, outcome: &FetchOutcome, limits: &DisplayConfig) -> Self {
        let mut row = Self::empty(Some(request.rank), request.brand.clone(), request.url.clone());
        row.fill(outcome, limits);
        row
    }

    /// Builds the row for a single-URL retry, which has no rank
    pub fn from_retry(url: &str, outcome: &FetchOutcome, limits: &DisplayConfig) -> Self {
        let mut row = Self::empty(None, domain_from_url(outcome.final_url()), url.to_string());
        row.fill(outcome, limits);
        row
    }

    /// Builds the synthetic row for a deny-listed request
    pub fn placeholder(request: &FetchRequest) -> Self {
        let mut row = Self::empty(Some(request.rank), request.brand.clone(), request.url.clone());
        row.title = format!("{} (Directory/Listicle)", request.brand);
        row.meta_description = PLACEHOLDER_DESCRIPTION.to_string();
        row.response_time_ms = Some(0);
        row.is_blacklisted = true;
        row
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    fn empty(rank: Option<u32>, brand: String, permalink: String) -> Self {
        Self {
            rank,
            brand,
            permalink,
            final_url: None,
            response_time_ms: None,
            title_raw: None,
            title: String::new(),
            meta_description_raw: None,
            meta_description: String::new(),
            h1_raw: None,
            h1: String::new(),
            word_count: 0,
            is_blacklisted: false,
            error: None,
            error_kind: None,
        }
    }

    fn fill(&mut self, outcome: &FetchOutcome, limits: &DisplayConfig) {
        self.response_time_ms = outcome.response_time_ms();

        match outcome {
            FetchOutcome::Success {
                final_url, page, ..
            } => {
                let PageSignals {
                    title_raw,
                    meta_description_raw,
                    h1_raw,
                    word_count,
                } = page;

                self.permalink = final_url.clone();
                self.final_url = Some(final_url.clone());
                self.title = clean_optional(title_raw.as_deref(), limits.title_max);
                self.meta_description =
                    clean_optional(meta_description_raw.as_deref(), limits.meta_description_max);
                self.h1 = clean_optional(h1_raw.as_deref(), limits.h1_max);
                self.title_raw = title_raw.clone();
                self.meta_description_raw = meta_description_raw.clone();
                self.h1_raw = h1_raw.clone();
                self.word_count = *word_count;
            }
            FetchOutcome::Blocked { final_url, .. } => {
                self.final_url = Some(final_url.clone());
                self.error = outcome.error_message();
                self.error_kind = outcome.error_kind();
            }
            FetchOutcome::Failed { .. } => {
                self.error = outcome.error_message();
                self.error_kind = outcome.error_kind();
            }
        }
    }
}

/// Payload of the single-URL retry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RetryResult {
    /// The page was fetched and cleaned
    Cleaned(CleanedResult),

    /// The page could not be fetched; always returned with a success status
    #[serde(rename_all = "camelCase")]
    Failed {
        final_url: String,
        response_time_ms: Option<u64>,
        error: String,
        error_kind: ErrorKind,
    },
}

impl RetryResult {
    pub fn from_outcome(url: &str, outcome: &FetchOutcome, limits: &DisplayConfig) -> Self {
        match (outcome.error_message(), outcome.error_kind()) {
            (Some(error), Some(error_kind)) => Self::Failed {
                final_url: outcome.final_url().to_string(),
                response_time_ms: outcome.response_time_ms(),
                error,
                error_kind,
            },
            _ => Self::Cleaned(CleanedResult::from_retry(url, outcome, limits)),
        }
    }
}
