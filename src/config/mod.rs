//! Configuration module for Serp-Scout
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every section carries defaults, so an empty file is a valid configuration.
//!
//! # Example
//!
//! ```no_run
//! use serp_scout::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("scout.toml")).unwrap();
//! println!("Global deadline: {}ms", config.scrape.global_deadline_ms);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    BlacklistConfig, BrandSource, Config, DisplayConfig, ProviderConfig, ScrapeConfig,
    ServerConfig, TimeoutTier,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
