use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Serp-Scout
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub provider: ProviderConfig,
    pub scrape: ScrapeConfig,
    pub display: DisplayConfig,
    pub blacklist: BlacklistConfig,
}

/// HTTP service configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ServerConfig {
    /// Socket address to listen on
    pub bind: String,

    /// Interval between keep-alive comments on the event stream (seconds)
    pub keep_alive_secs: u64,

    /// Whether to answer CORS preflights for any origin
    pub cors_allow_any_origin: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1:3000".to_string(),
            keep_alive_secs: 10,
            cors_allow_any_origin: true,
        }
    }
}

/// Ranked-list provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProviderConfig {
    /// Provider root URL; `/search.json` and `/locations.json` hang off it
    pub base_url: String,

    /// Name of the environment variable holding the API key
    pub api_key_env: String,

    /// Number of ranked links kept from the provider payload
    pub max_results: usize,

    pub engine: String,
    pub hl: String,
    pub gl: String,

    /// Number of suggestions requested from the location lookup
    pub location_limit: u32,

    /// Bound on one provider round-trip (milliseconds)
    pub request_timeout_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: "https://serpapi.com".to_string(),
            api_key_env: "SERPAPI_KEY".to_string(),
            max_results: 20,
            engine: "google".to_string(),
            hl: "en".to_string(),
            gl: "us".to_string(),
            location_limit: 10,
            request_timeout_ms: 15_000,
        }
    }
}

impl ProviderConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// Where a row's display brand comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BrandSource {
    /// The provider's `source` label, falling back to the URL's domain
    #[default]
    Provider,
    /// Always the URL's domain
    Domain,
}

/// A pair of per-attempt timeouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct TimeoutTier {
    /// Bound on acquiring a response (milliseconds)
    pub fetch_timeout_ms: u64,

    /// Bound on consuming the response body (milliseconds)
    pub body_read_timeout_ms: u64,
}

impl TimeoutTier {
    pub const fn new(fetch_timeout_ms: u64, body_read_timeout_ms: u64) -> Self {
        Self {
            fetch_timeout_ms,
            body_read_timeout_ms,
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_millis(self.fetch_timeout_ms)
    }

    pub fn body_read_timeout(&self) -> Duration {
        Duration::from_millis(self.body_read_timeout_ms)
    }

    /// Upper bound on one fetcher invocation under this tier, including the
    /// block retry and its backoff
    pub fn invocation_budget(&self, backoff: Duration) -> Duration {
        (self.fetch_timeout() + self.body_read_timeout()) * 2 + backoff
    }
}

/// Scrape orchestration configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ScrapeConfig {
    /// Maximum number of concurrent fetcher invocations
    pub pool_size: usize,

    /// Wall-clock budget of one orchestration run (milliseconds)
    pub global_deadline_ms: u64,

    /// How long past the deadline in-flight work may still be collected (milliseconds)
    pub drain_grace_ms: u64,

    /// Pause before the second-identity retry of a blocked page (milliseconds)
    pub block_retry_backoff_ms: u64,

    /// First, aggressive timeout pair
    pub fast_tier: TimeoutTier,

    /// Escalation timeout pair used after a failed fast attempt
    pub slow_tier: TimeoutTier,

    /// Generous timeout pair used by the single-URL retry
    pub retry_one_tier: TimeoutTier,

    pub brand_source: BrandSource,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            pool_size: 4,
            global_deadline_ms: 59_000,
            drain_grace_ms: 5_000,
            block_retry_backoff_ms: 150,
            fast_tier: TimeoutTier::new(6_000, 3_000),
            slow_tier: TimeoutTier::new(10_000, 5_000),
            retry_one_tier: TimeoutTier::new(30_000, 8_000),
            brand_source: BrandSource::Provider,
        }
    }
}

impl ScrapeConfig {
    pub fn global_deadline(&self) -> Duration {
        Duration::from_millis(self.global_deadline_ms)
    }

    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }

    pub fn block_retry_backoff(&self) -> Duration {
        Duration::from_millis(self.block_retry_backoff_ms)
    }
}

/// Display truncation limits, in characters
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DisplayConfig {
    pub title_max: usize,
    pub meta_description_max: usize,
    pub h1_max: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            title_max: 120,
            meta_description_max: 160,
            h1_max: 100,
        }
    }
}

/// Deny-list source configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BlacklistConfig {
    /// Path to the newline-separated hostname list
    pub path: String,
}

impl Default for BlacklistConfig {
    fn default() -> Self {
        Self {
            path: "blacklist.txt".to_string(),
        }
    }
}
