//! Terminal run summary
//!
//! The summary separates rows that were excluded (deny-listed) from rows that
//! were never attempted because the run ran out of time, so a caller can tell
//! the two apart.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Aggregate counts for one orchestration run
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Ranked links received from the provider
    pub total: usize,

    /// Links that passed the deny-list
    pub to_fetch: usize,

    /// Outcomes delivered (successful + blocked + failed)
    pub scraped: usize,

    /// Links replaced by placeholders
    pub blacklisted: usize,

    pub successful: usize,
    pub blocked: usize,
    pub failed: usize,

    /// Links never admitted to the pool before the deadline
    pub not_attempted: usize,

    /// Links admitted but still in flight when the run closed
    pub abandoned: usize,

    pub deadline_exceeded: bool,
    pub total_ms: u64,
    pub started_at: DateTime<Utc>,
}

impl RunSummary {
    /// Returns the success rate over attempted links as a percentage
    pub fn success_rate(&self) -> f64 {
        if self.scraped == 0 {
            return 0.0;
        }
        (self.successful as f64 / self.scraped as f64) * 100.0
    }

    /// Emits the summary as one structured log event
    pub fn log(&self) {
        tracing::info!(
            total = self.total,
            blacklisted = self.blacklisted,
            scraped = self.scraped,
            successful = self.successful,
            blocked = self.blocked,
            failed = self.failed,
            not_attempted = self.not_attempted,
            abandoned = self.abandoned,
            deadline_exceeded = self.deadline_exceeded,
            total_ms = self.total_ms,
            "Run complete ({:.1}% success)",
            self.success_rate()
        );
    }
}
