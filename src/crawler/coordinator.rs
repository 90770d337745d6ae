//! Run coordinator - orchestration of one search request
//!
//! This module ties the pieces of a run together:
//! - Resolving the query into ranked links through the provider
//! - Splitting the links into deny-listed placeholders and requests to fetch
//! - Driving the scheduler and cleaning each outcome into a display row
//! - Handing rows to a batch or streaming sink, then the terminal summary

use crate::blacklist::{Blacklist, BlacklistCache};
use crate::config::{BrandSource, Config};
use crate::crawler::fetcher::{build_http_client, HttpFetcher, PageFetcher};
use crate::crawler::scheduler::{fetch_with_escalation, SchedulePolicy, Scheduler};
use crate::output::{
    BatchCollector, BatchResponse, CleanedResult, ResultSink, RetryResult, RunSummary,
    StreamEmitter,
};
use crate::provider::{RankedLink, SerpClient};
use crate::state::{FetchRequest, RunContext};
use crate::url::derive_brand;
use crate::{Result, ScoutError};
use std::sync::Arc;

/// Ranked links split by the deny-list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunPlan {
    /// Deny-listed links; rendered as placeholders without any network call
    pub excluded: Vec<FetchRequest>,

    /// Links to hand to the scheduler, in rank order
    pub to_fetch: Vec<FetchRequest>,
}

impl RunPlan {
    /// Assigns ranks and brands, then splits on the deny-list
    pub fn split(links: &[RankedLink], blacklist: &Blacklist, brand_source: BrandSource) -> Self {
        let mut plan = Self::default();

        for (index, link) in links.iter().enumerate() {
            let brand = derive_brand(brand_source, &link.link, link.source.as_deref());
            let request = FetchRequest::new(link.link.clone(), index as u32 + 1, brand);

            if blacklist.is_url_blacklisted(&request.url) {
                tracing::debug!(rank = request.rank, url = %request.url, "Deny-listed");
                plan.excluded.push(request);
            } else {
                plan.to_fetch.push(request);
            }
        }

        plan
    }

    pub fn total(&self) -> usize {
        self.excluded.len() + self.to_fetch.len()
    }
}

/// Main orchestration structure
///
/// One coordinator serves every request of a running instance; each call to
/// [`Coordinator::run`] gets its own [`RunContext`].
pub struct Coordinator<F = HttpFetcher> {
    config: Arc<Config>,
    provider: SerpClient,
    fetcher: Arc<F>,
    blacklist: Arc<BlacklistCache>,
}

impl Coordinator<HttpFetcher> {
    /// Creates a coordinator with the HTTP fetcher and a lazily loaded deny-list
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to serve requests
    /// * `Err(ScoutError)` - The HTTP client could not be built
    pub fn from_config(config: Config) -> Result<Self> {
        let client = build_http_client()?;
        let fetcher = HttpFetcher::new(client.clone(), config.scrape.block_retry_backoff());
        let provider = SerpClient::new(client, config.provider.clone());
        let blacklist = BlacklistCache::new(&config.blacklist.path);

        Ok(Self::new(
            Arc::new(config),
            provider,
            Arc::new(fetcher),
            Arc::new(blacklist),
        ))
    }
}

impl<F> Coordinator<F>
where
    F: PageFetcher + 'static,
{
    pub fn new(
        config: Arc<Config>,
        provider: SerpClient,
        fetcher: Arc<F>,
        blacklist: Arc<BlacklistCache>,
    ) -> Self {
        Self {
            config,
            provider,
            fetcher,
            blacklist,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn provider(&self) -> &SerpClient {
        &self.provider
    }

    pub fn blacklist(&self) -> &Arc<BlacklistCache> {
        &self.blacklist
    }

    /// Splits ranked links against the cached deny-list
    pub async fn plan(&self, links: &[RankedLink]) -> RunPlan {
        let blacklist = self.blacklist.get().await;
        RunPlan::split(links, &blacklist, self.config.scrape.brand_source)
    }

    /// Runs one orchestration over already-ranked links
    ///
    /// Placeholders reach the sink before any fetch starts; fetched rows follow
    /// in completion order; the summary comes last.
    pub async fn run(&self, links: &[RankedLink], sink: &mut dyn ResultSink) -> RunSummary {
        let ctx = Arc::new(RunContext::new(self.config.scrape.global_deadline()));
        let plan = self.plan(links).await;

        ctx.record_plan(plan.total(), plan.excluded.len(), plan.to_fetch.len());
        tracing::info!(
            total = plan.total(),
            blacklisted = plan.excluded.len(),
            to_fetch = plan.to_fetch.len(),
            deadline_ms = self.config.scrape.global_deadline_ms,
            "Run planned"
        );

        for request in &plan.excluded {
            sink.placeholder(CleanedResult::placeholder(request));
        }

        if sink.is_closed() {
            tracing::info!("Client went away before fetching, skipping run");
        } else {
            let scheduler = Scheduler::new(
                Arc::clone(&self.fetcher),
                SchedulePolicy::from_config(&self.config.scrape),
            );
            let mut scheduled = scheduler.run(plan.to_fetch, Arc::clone(&ctx));

            while let Some((request, outcome)) = scheduled.next().await {
                let row = CleanedResult::from_outcome(&request, &outcome, &self.config.display);
                sink.outcome(request, outcome, row);

                if sink.is_closed() {
                    tracing::info!(elapsed_ms = ctx.elapsed_ms(), "Client went away, stopping run");
                    scheduled.close();
                    break;
                }
            }
        }

        let summary = ctx.summary();
        summary.log();
        sink.finish(summary.clone());
        summary
    }

    /// Resolves a query and runs it in batch mode
    ///
    /// # Errors
    ///
    /// * `BadRequest` - Empty query or location
    /// * `MissingCredential` - No provider API key
    /// * `Provider` - The provider failed; no fetch is attempted
    pub async fn search_batch(&self, query: &str, location: &str) -> Result<BatchResponse> {
        validate_search(query, location)?;

        let results = self.provider.ranked_links(query, location).await?;
        let mut collector = BatchCollector::new();
        self.run(&results.links, &mut collector).await;

        Ok(collector.into_response(query, location, results.raw))
    }

    /// Resolves a query and streams its rows to `emitter`
    ///
    /// A provider failure becomes a single `error` event; the error is also
    /// returned so the caller can log it.
    pub async fn search_stream(
        &self,
        query: &str,
        location: &str,
        mut emitter: StreamEmitter,
    ) -> Result<RunSummary> {
        if let Err(e) = validate_search(query, location) {
            emitter.error(e.to_string());
            return Err(e);
        }

        let results = match self.provider.ranked_links(query, location).await {
            Ok(results) => results,
            Err(e) => {
                emitter.error(e.to_string());
                return Err(e);
            }
        };

        Ok(self.run(&results.links, &mut emitter).await)
    }

    /// Re-fetches a single URL with the generous timeout tier
    ///
    /// Fetch failures are reported inside the returned value, never as an error.
    pub async fn retry_one(&self, url: &str) -> RetryResult {
        let tier = self.config.scrape.retry_one_tier;
        tracing::info!(url, fetch_timeout_ms = tier.fetch_timeout_ms, "Retrying single URL");

        let outcome = fetch_with_escalation(
            self.fetcher.as_ref(),
            url,
            &[tier],
            self.config.scrape.block_retry_backoff(),
        )
        .await;

        RetryResult::from_outcome(url, &outcome, &self.config.display)
    }
}

/// Rejects blank search inputs
pub fn validate_search(query: &str, location: &str) -> Result<()> {
    if query.trim().is_empty() || location.trim().is_empty() {
        return Err(ScoutError::BadRequest("missing q or location".to_string()));
    }
    Ok(())
}
