//! Ranked-list provider client
//!
//! Resolves a keyword and location into an ordered list of links, and proxies
//! the provider's location autocomplete. The API key is read at request time so
//! a process can start without one and report the missing credential per
//! request.

mod results;

pub use results::{parse_organic_results, ProviderResults, RankedLink};

use crate::config::ProviderConfig;
use crate::{ProviderError, Result, ScoutError};
use reqwest::Client;
use serde_json::Value;

/// Where the provider API key comes from
#[derive(Debug, Clone)]
pub enum Credential {
    /// Read from the named environment variable on every request
    Env(String),
    /// A fixed key
    Fixed(String),
}

impl Credential {
    fn resolve(&self) -> Result<String> {
        match self {
            Self::Env(var) => std::env::var(var)
                .ok()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| ScoutError::MissingCredential { var: var.clone() }),
            Self::Fixed(key) if !key.is_empty() => Ok(key.clone()),
            Self::Fixed(_) => Err(ScoutError::MissingCredential {
                var: "api key".to_string(),
            }),
        }
    }
}

/// Upstream location lookup response, passed through verbatim
#[derive(Debug, Clone)]
pub struct LocationsResponse {
    pub status: u16,
    pub body: String,
}

/// Client for the search-result provider
#[derive(Debug, Clone)]
pub struct SerpClient {
    client: Client,
    config: ProviderConfig,
    credential: Credential,
}

impl SerpClient {
    pub fn new(client: Client, config: ProviderConfig) -> Self {
        let credential = Credential::Env(config.api_key_env.clone());
        Self {
            client,
            config,
            credential,
        }
    }

    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = credential;
        self
    }

    /// Resolves the API key, failing with a configuration error when absent
    pub fn api_key(&self) -> Result<String> {
        self.credential.resolve()
    }

    /// Fetches the ranked organic links for a query
    ///
    /// # Errors
    ///
    /// * `MissingCredential` - No API key is configured
    /// * `Provider` - Non-2xx status, transport failure, an `error` field in the
    ///   payload, or a payload that is not the expected shape
    pub async fn ranked_links(&self, query: &str, location: &str) -> Result<ProviderResults> {
        let api_key = self.api_key()?;
        let num = self.config.max_results.to_string();

        tracing::info!(query, location, "Querying search provider");

        let response = self
            .client
            .get(self.endpoint("search.json"))
            .timeout(self.config.request_timeout())
            .query(&[
                ("engine", self.config.engine.as_str()),
                ("q", query),
                ("location", location),
                ("num", num.as_str()),
                ("hl", self.config.hl.as_str()),
                ("gl", self.config.gl.as_str()),
                ("api_key", api_key.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!(status = status.as_u16(), "Search provider returned an error status");
            return Err(ProviderError::Status(status.as_u16()).into());
        }

        let raw: Value = response
            .json()
            .await
            .map_err(|e| ProviderError::Malformed(e.to_string()))?;

        let links = parse_organic_results(&raw, self.config.max_results).map_err(|e| {
            tracing::error!(error = %e, "Search provider payload rejected");
            e
        })?;

        tracing::info!(count = links.len(), "Search provider returned ranked links");

        Ok(ProviderResults { raw, links })
    }

    /// Looks up location suggestions for a partial query
    ///
    /// The upstream status and body are returned as is; only a transport failure
    /// is an error.
    pub async fn locations(&self, query: &str) -> Result<LocationsResponse> {
        let api_key = self.api_key()?;
        let limit = self.config.location_limit.to_string();

        let response = self
            .client
            .get(self.endpoint("locations.json"))
            .timeout(self.config.request_timeout())
            .query(&[
                ("q", query),
                ("limit", limit.as_str()),
                ("api_key", api_key.as_str()),
            ])
            .send()
            .await
            .map_err(transport)?;

        let status = response.status().as_u16();
        let body = response.text().await.map_err(transport)?;
        tracing::debug!(query, status, bytes = body.len(), "Location lookup");

        Ok(LocationsResponse { status, body })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }
}

fn transport(error: reqwest::Error) -> ScoutError {
    let error = error.without_url();
    tracing::error!(error = %error, "Search provider unreachable");
    ProviderError::Transport(error.to_string()).into()
}
