//! Serp-Scout: competitor page signals under a request-sized time budget
//!
//! This crate takes a ranked list of search results, drops hosts on a deny-list,
//! fetches the rest with a bounded pool and a global deadline, and extracts
//! lightweight SEO signals (title, meta description, first heading, word count,
//! latency) from each page as it arrives.

pub mod blacklist;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod output;
pub mod provider;
pub mod server;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for Serp-Scout operations
///
/// Only request-fatal conditions live here. Per-page failures never surface as a
/// `ScoutError`; they become a [`state::FetchOutcome`] instead.
#[derive(Debug, Error)]
pub enum ScoutError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("{var} not set")]
    MissingCredential { var: String },

    #[error("Upstream provider failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("{0}")]
    BadRequest(String),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// Failures of the ranked-list provider
///
/// Any of these is fatal for the whole request and maps to a 502.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("provider error: {0}")]
    Api(String),

    #[error("malformed payload: {0}")]
    Malformed(String),

    #[error("transport: {0}")]
    Transport(String),
}

/// Result type alias for Serp-Scout operations
pub type Result<T> = std::result::Result<T, ScoutError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use blacklist::{Blacklist, BlacklistCache};
pub use config::Config;
pub use crawler::{Coordinator, HttpFetcher, Scheduler};
pub use output::{CleanedResult, RunSummary};
pub use state::{FetchOutcome, FetchRequest, RunContext};
