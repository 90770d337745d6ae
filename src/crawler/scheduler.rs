//! Scheduler for running fetches under a bounded pool and a global deadline
//!
//! This module handles:
//! - A fixed pool of workers draining one FIFO queue (lowest rank first)
//! - Two-tier timeout escalation per URL
//! - Stopping admission once the run deadline passes
//! - Fan-in of completed outcomes as soon as each one is known

use crate::config::{ScrapeConfig, TimeoutTier};
use crate::crawler::fetcher::PageFetcher;
use crate::state::{FetchError, FetchOutcome, FetchPhase, FetchRequest, RunContext};
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};

/// How a run is paced
#[derive(Debug, Clone)]
pub struct SchedulePolicy {
    /// Maximum number of concurrent fetcher invocations
    pub pool_size: usize,

    /// Timeout pairs tried in order; the next one is used only after a failure
    pub tiers: Vec<TimeoutTier>,

    /// Backoff before a block retry, used to size each invocation's budget
    pub backoff: Duration,

    /// How long past the deadline in-flight outcomes are still collected
    pub drain_grace: Duration,
}

impl SchedulePolicy {
    pub fn from_config(config: &ScrapeConfig) -> Self {
        Self {
            pool_size: config.pool_size,
            tiers: vec![config.fast_tier, config.slow_tier],
            backoff: config.block_retry_backoff(),
            drain_grace: config.drain_grace(),
        }
    }
}

type Completed = (FetchRequest, FetchOutcome);

/// Runs fetcher invocations for an ordered list of requests
///
/// The scheduler coordinates:
/// - Global concurrency (`pool_size` workers, never more)
/// - Admission order (the order of the request list)
/// - The run deadline carried by the [`RunContext`]
pub struct Scheduler<F> {
    fetcher: Arc<F>,
    policy: SchedulePolicy,
}

impl<F> Scheduler<F>
where
    F: PageFetcher + 'static,
{
    pub fn new(fetcher: Arc<F>, policy: SchedulePolicy) -> Self {
        Self { fetcher, policy }
    }

    pub fn policy(&self) -> &SchedulePolicy {
        &self.policy
    }

    /// Starts the run and returns a handle yielding outcomes in completion order
    ///
    /// Workers stop taking new requests once the deadline passes. Requests still
    /// in flight at that point are not aborted; their outcomes are delivered if
    /// they arrive before the drain grace runs out.
    pub fn run(&self, requests: Vec<FetchRequest>, ctx: Arc<RunContext>) -> ScheduledRun {
        let workers = self.policy.pool_size.max(1).min(requests.len());
        let queue = Arc::new(Mutex::new(VecDeque::from(requests)));
        let tiers: Arc<[TimeoutTier]> = self.policy.tiers.clone().into();
        let (tx, rx) = mpsc::unbounded_channel();

        tracing::debug!(workers, "Starting fetch pool");

        for worker_id in 0..workers {
            let queue = Arc::clone(&queue);
            let fetcher = Arc::clone(&self.fetcher);
            let ctx = Arc::clone(&ctx);
            let tiers = Arc::clone(&tiers);
            let tx = tx.clone();
            let backoff = self.policy.backoff;

            tokio::spawn(async move {
                loop {
                    if ctx.deadline_passed() {
                        let queued = queue.lock().await.len();
                        if queued > 0 {
                            tracing::warn!(worker_id, queued, "Deadline passed, not admitting more work");
                        }
                        break;
                    }

                    if tx.is_closed() {
                        tracing::debug!(worker_id, "Run closed, not admitting more work");
                        break;
                    }

                    let (request, queued) = {
                        let mut queue = queue.lock().await;
                        match queue.pop_front() {
                            Some(request) => (request, queue.len()),
                            None => break,
                        }
                    };

                    let active = ctx.record_admitted().saturating_sub(ctx.delivered());
                    tracing::debug!(
                        worker_id,
                        rank = request.rank,
                        url = %request.url,
                        active,
                        queued,
                        "Admitted"
                    );

                    let outcome =
                        fetch_with_escalation(fetcher.as_ref(), &request.url, &tiers, backoff).await;

                    if tx.send((request, outcome)).is_err() {
                        tracing::debug!(worker_id, "Run closed, worker exiting");
                        break;
                    }
                }
            });
        }

        let close_at =
            tokio::time::Instant::from_std(ctx.deadline()) + self.policy.drain_grace;

        ScheduledRun { rx, ctx, close_at }
    }
}

/// Handle on a running pool
///
/// Yields each `(request, outcome)` pair as soon as it is known. Returns `None`
/// once every admitted request has been delivered, or once the drain grace
/// after the deadline has run out.
pub struct ScheduledRun {
    rx: mpsc::UnboundedReceiver<Completed>,
    ctx: Arc<RunContext>,
    close_at: tokio::time::Instant,
}

impl ScheduledRun {
    pub async fn next(&mut self) -> Option<Completed> {
        match tokio::time::timeout_at(self.close_at, self.rx.recv()).await {
            Ok(Some((request, outcome))) => {
                self.ctx.record_outcome(&outcome);
                tracing::debug!(
                    rank = request.rank,
                    url = %request.url,
                    success = outcome.is_success(),
                    elapsed_ms = self.ctx.elapsed_ms(),
                    "Delivered"
                );
                Some((request, outcome))
            }
            Ok(None) => None,
            Err(_) => {
                let abandoned = self.ctx.admitted().saturating_sub(self.ctx.delivered());
                tracing::warn!(
                    abandoned,
                    elapsed_ms = self.ctx.elapsed_ms(),
                    "Closing run with requests still in flight"
                );
                self.rx.close();
                None
            }
        }
    }

    /// Stops the run early; workers finish their current request and exit
    pub fn close(&mut self) {
        self.rx.close();
    }

    pub fn context(&self) -> &Arc<RunContext> {
        &self.ctx
    }
}

/// Fetches one URL, escalating through the timeout tiers on failure
///
/// Only a `Failed` outcome moves on to the next tier; a `Blocked` outcome has
/// already spent its identity retry and is returned as is. Each invocation is
/// bounded by [`TimeoutTier::invocation_budget`], so a fetcher that never
/// returns still produces a timeout.
pub async fn fetch_with_escalation<F>(
    fetcher: &F,
    url: &str,
    tiers: &[TimeoutTier],
    backoff: Duration,
) -> FetchOutcome
where
    F: PageFetcher + ?Sized,
{
    let mut last: Option<FetchOutcome> = None;

    for (index, tier) in tiers.iter().enumerate() {
        if let Some(FetchOutcome::Failed { error, .. }) = &last {
            tracing::debug!(url, tier = index, error = %error, "Escalating to slower timeout tier");
        }

        let budget = tier.invocation_budget(backoff);
        let outcome = match tokio::time::timeout(budget, fetcher.fetch(url, *tier)).await {
            Ok(outcome) => outcome,
            Err(_) => {
                let after_ms = budget.as_millis() as u64;
                FetchOutcome::Failed {
                    url: url.to_string(),
                    response_time_ms: Some(after_ms),
                    error: FetchError::Timeout {
                        phase: FetchPhase::Invocation,
                        after_ms,
                    },
                }
            }
        };

        if !matches!(outcome, FetchOutcome::Failed { .. }) {
            return outcome;
        }
        last = Some(outcome);
    }

    last.unwrap_or_else(|| FetchOutcome::Failed {
        url: url.to_string(),
        response_time_ms: None,
        error: FetchError::Transport {
            message: "no timeout tiers configured".to_string(),
        },
    })
}
