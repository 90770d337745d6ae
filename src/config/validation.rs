use crate::config::types::{
    Config, DisplayConfig, ProviderConfig, ScrapeConfig, ServerConfig, TimeoutTier,
};
use crate::ConfigError;
use std::net::SocketAddr;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_server_config(&config.server)?;
    validate_provider_config(&config.provider)?;
    validate_scrape_config(&config.scrape)?;
    validate_display_config(&config.display)?;
    Ok(())
}

/// Validates server configuration
fn validate_server_config(config: &ServerConfig) -> Result<(), ConfigError> {
    config.bind.parse::<SocketAddr>().map_err(|e| {
        ConfigError::Validation(format!("bind must be a socket address, got '{}': {}", config.bind, e))
    })?;

    if config.keep_alive_secs == 0 {
        return Err(ConfigError::Validation(
            "keep_alive_secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates provider configuration
fn validate_provider_config(config: &ProviderConfig) -> Result<(), ConfigError> {
    let url = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url must be http or https, got '{}'",
            config.base_url
        )));
    }

    if config.api_key_env.is_empty() {
        return Err(ConfigError::Validation(
            "api_key_env cannot be empty".to_string(),
        ));
    }

    if config.max_results < 1 || config.max_results > 100 {
        return Err(ConfigError::Validation(format!(
            "max_results must be between 1 and 100, got {}",
            config.max_results
        )));
    }

    if config.request_timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "request_timeout_ms must be > 0".to_string(),
        ));
    }

    Ok(())
}

/// Validates scrape orchestration configuration
fn validate_scrape_config(config: &ScrapeConfig) -> Result<(), ConfigError> {
    if config.pool_size < 1 || config.pool_size > 64 {
        return Err(ConfigError::Validation(format!(
            "pool_size must be between 1 and 64, got {}",
            config.pool_size
        )));
    }

    if config.global_deadline_ms == 0 {
        return Err(ConfigError::Validation(
            "global_deadline_ms must be > 0".to_string(),
        ));
    }

    validate_tier("fast_tier", &config.fast_tier)?;
    validate_tier("slow_tier", &config.slow_tier)?;
    validate_tier("retry_one_tier", &config.retry_one_tier)?;

    Ok(())
}

fn validate_tier(name: &str, tier: &TimeoutTier) -> Result<(), ConfigError> {
    if tier.fetch_timeout_ms == 0 || tier.body_read_timeout_ms == 0 {
        return Err(ConfigError::Validation(format!(
            "{} timeouts must be > 0, got fetch={}ms body={}ms",
            name, tier.fetch_timeout_ms, tier.body_read_timeout_ms
        )));
    }
    Ok(())
}

/// Validates display limits
fn validate_display_config(config: &DisplayConfig) -> Result<(), ConfigError> {
    for (name, value) in [
        ("title_max", config.title_max),
        ("meta_description_max", config.meta_description_max),
        ("h1_max", config.h1_max),
    ] {
        if value < 1 {
            return Err(ConfigError::Validation(format!(
                "{} must be >= 1, got {}",
                name, value
            )));
        }
    }
    Ok(())
}
