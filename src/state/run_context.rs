//! Per-run clock and counters
//!
//! A `RunContext` is created at the start of each orchestration run and handed
//! to every component that needs timing or accounting. Counters are atomics so
//! pool workers can update them without a lock.

use crate::output::RunSummary;
use crate::state::FetchOutcome;
use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct RunContext {
    /// Wall-clock start, for reporting
    pub started_at: DateTime<Utc>,

    started: Instant,
    deadline: Instant,

    total: AtomicUsize,
    blacklisted: AtomicUsize,
    to_fetch: AtomicUsize,

    admitted: AtomicUsize,
    successful: AtomicUsize,
    blocked: AtomicUsize,
    failed: AtomicUsize,
}

impl RunContext {
    /// Starts the run clock; the deadline is `global_deadline` from now
    pub fn new(global_deadline: Duration) -> Self {
        let started = Instant::now();
        Self {
            started_at: Utc::now(),
            started,
            deadline: started + global_deadline,
            total: AtomicUsize::new(0),
            blacklisted: AtomicUsize::new(0),
            to_fetch: AtomicUsize::new(0),
            admitted: AtomicUsize::new(0),
            successful: AtomicUsize::new(0),
            blocked: AtomicUsize::new(0),
            failed: AtomicUsize::new(0),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }

    pub fn deadline(&self) -> Instant {
        self.deadline
    }

    /// Returns true once no new work may be admitted
    pub fn deadline_passed(&self) -> bool {
        Instant::now() >= self.deadline
    }

    /// Records how the ranked list was split before any fetching
    pub fn record_plan(&self, total: usize, blacklisted: usize, to_fetch: usize) {
        self.total.store(total, Ordering::Relaxed);
        self.blacklisted.store(blacklisted, Ordering::Relaxed);
        self.to_fetch.store(to_fetch, Ordering::Relaxed);
    }

    /// Records that a request took a pool slot
    pub fn record_admitted(&self) -> usize {
        self.admitted.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Records a delivered outcome
    pub fn record_outcome(&self, outcome: &FetchOutcome) {
        let counter = match outcome {
            FetchOutcome::Success { .. } => &self.successful,
            FetchOutcome::Blocked { .. } => &self.blocked,
            FetchOutcome::Failed { .. } => &self.failed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub fn admitted(&self) -> usize {
        self.admitted.load(Ordering::Relaxed)
    }

    pub fn successful(&self) -> usize {
        self.successful.load(Ordering::Relaxed)
    }

    /// Number of outcomes delivered so far
    pub fn delivered(&self) -> usize {
        self.successful() + self.blocked.load(Ordering::Relaxed) + self.failed.load(Ordering::Relaxed)
    }

    /// Snapshot of the counters as a terminal summary
    pub fn summary(&self) -> RunSummary {
        let to_fetch = self.to_fetch.load(Ordering::Relaxed);
        let admitted = self.admitted();
        let scraped = self.delivered();

        RunSummary {
            total: self.total.load(Ordering::Relaxed),
            to_fetch,
            scraped,
            blacklisted: self.blacklisted.load(Ordering::Relaxed),
            successful: self.successful(),
            blocked: self.blocked.load(Ordering::Relaxed),
            failed: self.failed.load(Ordering::Relaxed),
            not_attempted: to_fetch.saturating_sub(admitted),
            abandoned: admitted.saturating_sub(scraped),
            deadline_exceeded: self.deadline_passed(),
            total_ms: self.elapsed_ms(),
            started_at: self.started_at,
        }
    }
}
