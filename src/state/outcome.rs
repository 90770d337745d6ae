//! Per-URL request and outcome types
//!
//! Every fetched URL ends in exactly one [`FetchOutcome`]. Consumers match on it
//! exhaustively; there is no "maybe has an error field" shape.

use crate::extract::PageSignals;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// One ranked link to be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FetchRequest {
    /// The link as given by the provider
    pub url: String,

    /// 1-based position in the source ranking
    pub rank: u32,

    /// Display label for the row
    pub brand: String,
}

impl FetchRequest {
    pub fn new(url: impl Into<String>, rank: u32, brand: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            rank,
            brand: brand.into(),
        }
    }
}

/// Which part of an attempt ran out of time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FetchPhase {
    /// Waiting for the response head
    Fetch,
    /// Reading the response body
    BodyRead,
    /// The whole fetcher invocation, as bounded by the scheduler
    Invocation,
}

impl fmt::Display for FetchPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fetch => write!(f, "fetch"),
            Self::BodyRead => write!(f, "body read"),
            Self::Invocation => write!(f, "invocation"),
        }
    }
}

/// Why a page could not be fetched
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FetchError {
    #[error("{phase} timeout after {after_ms}ms")]
    Timeout { phase: FetchPhase, after_ms: u64 },

    #[error("{message}")]
    Transport { message: String },
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Timeout { .. } => ErrorKind::Timeout,
            Self::Transport { .. } => ErrorKind::Transport,
        }
    }
}

/// Evidence that a response came from a bot defense rather than the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockReason {
    /// 403 or 406 status
    Status(u16),
    /// A "Not Acceptable!" error page
    NotAcceptablePage,
    /// A known vendor or challenge string in the body
    Signature(String),
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Status(code) => write!(f, "HTTP {}", code),
            Self::NotAcceptablePage => write!(f, "Not Acceptable page"),
            Self::Signature(sig) => write!(f, "{} signature", sig),
        }
    }
}

impl Serialize for BlockReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Programmatic tag for per-item failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Blocked,
    Timeout,
    Transport,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blocked => "blocked",
            Self::Timeout => "timeout",
            Self::Transport => "transport",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of fetching one URL
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum FetchOutcome {
    /// Real content was served and extracted
    Success {
        final_url: String,
        response_time_ms: u64,
        #[serde(flatten)]
        page: PageSignals,
    },

    /// Bot defense answered on both identities
    Blocked {
        final_url: String,
        response_time_ms: u64,
        reason: BlockReason,
    },

    /// Transport error or timeout
    Failed {
        url: String,
        response_time_ms: Option<u64>,
        error: FetchError,
    },
}

impl FetchOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The failure tag, if this outcome is not a success
    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Success { .. } => None,
            Self::Blocked { .. } => Some(ErrorKind::Blocked),
            Self::Failed { error, .. } => Some(error.kind()),
        }
    }

    /// Human-readable failure description, if this outcome is not a success
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::Success { .. } => None,
            Self::Blocked { reason, .. } => Some(format!("Blocked by site ({})", reason)),
            Self::Failed { error, .. } => Some(format!("fetch failed: {}", error)),
        }
    }

    pub fn response_time_ms(&self) -> Option<u64> {
        match self {
            Self::Success {
                response_time_ms, ..
            }
            | Self::Blocked {
                response_time_ms, ..
            } => Some(*response_time_ms),
            Self::Failed {
                response_time_ms, ..
            } => *response_time_ms,
        }
    }

    /// Where the content came from, or the requested URL for failures
    pub fn final_url(&self) -> &str {
        match self {
            Self::Success { final_url, .. } | Self::Blocked { final_url, .. } => final_url,
            Self::Failed { url, .. } => url,
        }
    }
}
