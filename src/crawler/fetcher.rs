//! HTTP fetcher implementation
//!
//! This module handles the network side of one page:
//! - Building the shared HTTP client
//! - A timed GET under a browser identity, with separate bounds on the
//!   response head and the body
//! - Bot-block detection and exactly one retry under a second identity
//! - Error classification into timeout / transport failures

use crate::config::TimeoutTier;
use crate::crawler::block::detect_block;
use crate::crawler::identity::IdentityProfile;
use crate::extract::extract;
use crate::state::{BlockReason, FetchError, FetchOutcome, FetchPhase};
use async_trait::async_trait;
use reqwest::{redirect::Policy, Client};
use std::time::{Duration, Instant};

/// Anything that can turn a URL into a [`FetchOutcome`] under a timeout tier
///
/// The scheduler is written against this trait so the pool can be exercised
/// without a network.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str, tier: TimeoutTier) -> FetchOutcome;
}

/// Builds the HTTP client shared by all fetches
///
/// Identity headers are set per request, so the client carries no default
/// user agent. Per-attempt timeouts are enforced by the fetcher; the client
/// timeouts only guard against a fetcher bug leaving a socket open forever.
pub fn build_http_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(Duration::from_secs(120))
        .connect_timeout(Duration::from_secs(30))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// One fully read response
#[derive(Debug)]
struct PageResponse {
    status: u16,
    final_url: String,
    body: String,
}

/// Where the fetch is in its retry protocol
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    /// First attempt, primary identity
    Primary,
    /// The one retry after a block, secondary identity
    Retry,
}

/// Fetches pages over HTTP with block detection and a single identity retry
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
    primary: IdentityProfile,
    retry: IdentityProfile,
    backoff: Duration,
}

impl HttpFetcher {
    /// Creates a fetcher with the default Chrome / Safari identity pair
    pub fn new(client: Client, backoff: Duration) -> Self {
        Self::with_identities(
            client,
            IdentityProfile::chrome_windows(),
            IdentityProfile::safari_macos(),
            backoff,
        )
    }

    pub fn with_identities(
        client: Client,
        primary: IdentityProfile,
        retry: IdentityProfile,
        backoff: Duration,
    ) -> Self {
        Self {
            client,
            primary,
            retry,
            backoff,
        }
    }

    /// Fetches a URL and extracts its signals
    ///
    /// # Retry Protocol
    ///
    /// | Stage | Result | Next |
    /// |-------|--------|------|
    /// | Primary | transport error / timeout | `Failed` |
    /// | Primary | blocked | backoff, then Retry |
    /// | Primary | ok | `Success` |
    /// | Retry | transport error / timeout | `Failed` |
    /// | Retry | blocked | `Blocked` |
    /// | Retry | ok | `Success` |
    ///
    /// `response_time_ms` runs from the start of the first attempt to the end of
    /// the last body read, so a retried page reports its total cost.
    pub async fn fetch_page(&self, url: &str, tier: TimeoutTier) -> FetchOutcome {
        let started = Instant::now();
        let mut stage = Stage::Primary;

        loop {
            let profile = match stage {
                Stage::Primary => &self.primary,
                Stage::Retry => &self.retry,
            };

            let page = match self.attempt(url, profile, tier).await {
                Ok(page) => page,
                Err(error) => {
                    tracing::warn!(url, identity = profile.name(), error = %error, "Fetch failed");
                    return FetchOutcome::Failed {
                        url: url.to_string(),
                        response_time_ms: Some(elapsed_ms(started)),
                        error,
                    };
                }
            };
            let response_time_ms = elapsed_ms(started);

            match (stage, detect_block(page.status, &page.body)) {
                (_, None) => {
                    if stage == Stage::Retry {
                        tracing::info!(url, "Retry with alternate identity succeeded");
                    }
                    return success(page, response_time_ms);
                }
                (Stage::Primary, Some(reason)) => {
                    tracing::info!(url, reason = %reason, "Blocked, retrying with alternate identity");
                    tokio::time::sleep(self.backoff).await;
                    stage = Stage::Retry;
                }
                (Stage::Retry, Some(reason)) => {
                    tracing::warn!(url, reason = %reason, "Still blocked after retry");
                    return blocked(page, response_time_ms, reason);
                }
            }
        }
    }

    /// One timed GET under an identity, body included
    async fn attempt(
        &self,
        url: &str,
        profile: &IdentityProfile,
        tier: TimeoutTier,
    ) -> Result<PageResponse, FetchError> {
        let attempt_started = Instant::now();
        let request = self.client.get(url).headers(profile.headers());

        let response = match tokio::time::timeout(tier.fetch_timeout(), request.send()).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => return Err(classify_error(&e, FetchPhase::Fetch, tier.fetch_timeout_ms)),
            Err(_) => {
                return Err(FetchError::Timeout {
                    phase: FetchPhase::Fetch,
                    after_ms: tier.fetch_timeout_ms,
                })
            }
        };

        let status = response.status().as_u16();
        let final_url = response.url().to_string();
        tracing::debug!(
            url,
            final_url = %final_url,
            status,
            elapsed_ms = elapsed_ms(attempt_started),
            identity = profile.name(),
            "Response received"
        );

        let body = match tokio::time::timeout(tier.body_read_timeout(), response.text()).await {
            Ok(Ok(body)) => body,
            Ok(Err(e)) => {
                return Err(classify_error(
                    &e,
                    FetchPhase::BodyRead,
                    tier.body_read_timeout_ms,
                ))
            }
            Err(_) => {
                return Err(FetchError::Timeout {
                    phase: FetchPhase::BodyRead,
                    after_ms: tier.body_read_timeout_ms,
                })
            }
        };

        tracing::debug!(
            url,
            bytes = body.len(),
            elapsed_ms = elapsed_ms(attempt_started),
            "Body read"
        );

        Ok(PageResponse {
            status,
            final_url,
            body,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str, tier: TimeoutTier) -> FetchOutcome {
        self.fetch_page(url, tier).await
    }
}

fn success(page: PageResponse, response_time_ms: u64) -> FetchOutcome {
    FetchOutcome::Success {
        final_url: page.final_url,
        response_time_ms,
        page: extract(&page.body),
    }
}

fn blocked(page: PageResponse, response_time_ms: u64, reason: BlockReason) -> FetchOutcome {
    FetchOutcome::Blocked {
        final_url: page.final_url,
        response_time_ms,
        reason,
    }
}

/// Classifies a client error into the per-item taxonomy
fn classify_error(error: &reqwest::Error, phase: FetchPhase, budget_ms: u64) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            phase,
            after_ms: budget_ms,
        }
    } else if error.is_connect() {
        FetchError::Transport {
            message: format!("connection failed: {}", error),
        }
    } else if error.is_builder() {
        FetchError::Transport {
            message: format!("invalid request: {}", error),
        }
    } else {
        FetchError::Transport {
            message: error.to_string(),
        }
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    since.elapsed().as_millis() as u64
}
