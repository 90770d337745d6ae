//! Crawler module for fetching competitor pages
//!
//! This module contains the core scrape orchestration, including:
//! - Browser identity profiles and bot-block detection
//! - HTTP fetching with a single identity retry
//! - The bounded worker pool and its global deadline
//! - Overall run coordination

mod block;
mod coordinator;
mod fetcher;
mod identity;
mod scheduler;

pub use block::detect_block;
pub use coordinator::{validate_search, Coordinator, RunPlan};
pub use fetcher::{build_http_client, HttpFetcher, PageFetcher};
pub use identity::{IdentityProfile, SEARCH_ENGINE_REFERER};
pub use scheduler::{fetch_with_escalation, SchedulePolicy, ScheduledRun, Scheduler};
