//! Serp-Scout main entry point
//!
//! This is the command-line interface for the Serp-Scout competitor scraper.

use anyhow::Context;
use clap::{Parser, Subcommand};
use serp_scout::config::{load_config_with_hash, Config};
use serp_scout::crawler::Coordinator;
use serp_scout::server;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Serp-Scout: competitor page signals for a search query
///
/// Serp-Scout asks a search provider for the ranked results of a query,
/// skips directories and listicles on a deny-list, and scrapes each remaining
/// page for its title, meta description, first heading and word count within
/// a fixed time budget.
#[derive(Parser, Debug)]
#[command(name = "serp-scout")]
#[command(version = "1.0.0")]
#[command(about = "Competitor SEO signals for a search query", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP service
    Serve,

    /// Run one search in batch mode and print the response as JSON
    Search {
        /// Search keyword
        query: String,

        /// Location the search is made from, e.g. "Bend, OR"
        location: String,
    },

    /// Scrape a single URL with the generous retry timeouts and print the result
    Scrape {
        url: String,
    },

    /// Validate configuration and show what would be used, then exit
    Check,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = load(cli.config.as_deref())?;

    match cli.command {
        Command::Serve => server::serve(config).await.context("Server error")?,
        Command::Search { query, location } => handle_search(config, &query, &location).await?,
        Command::Scrape { url } => handle_scrape(config, &url).await?,
        Command::Check => handle_check(config),
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("serp_scout=info,warn"),
            1 => EnvFilter::new("serp_scout=debug,tower_http=debug,info"),
            2 => EnvFilter::new("serp_scout=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
    tracing::info!(hash = %hash, "Configuration loaded successfully");

    Ok(config)
}

/// Handles `search`: one batch-mode run printed to stdout
async fn handle_search(config: Config, query: &str, location: &str) -> anyhow::Result<()> {
    let coordinator = Coordinator::from_config(config)?;
    let response = coordinator
        .search_batch(query, location)
        .await
        .context("Search failed")?;

    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}

/// Handles `scrape`: the single-URL retry path printed to stdout
async fn handle_scrape(config: Config, url: &str) -> anyhow::Result<()> {
    let coordinator = Coordinator::from_config(config)?;
    let result = coordinator.retry_one(url).await;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Handles `check`: validates config and shows what would be used
fn handle_check(config: Config) {
    println!("=== Serp-Scout Configuration Check ===\n");

    println!("Server:");
    println!("  Bind: {}", config.server.bind);
    println!("  Keep-alive: {}s", config.server.keep_alive_secs);
    println!("  CORS any origin: {}", config.server.cors_allow_any_origin);

    println!("\nProvider:");
    println!("  Base URL: {}", config.provider.base_url);
    println!("  Max results: {}", config.provider.max_results);
    let credential = match std::env::var(&config.provider.api_key_env) {
        Ok(key) if !key.trim().is_empty() => "set",
        _ => "NOT SET",
    };
    println!("  API key ({}): {}", config.provider.api_key_env, credential);

    let scrape = &config.scrape;
    println!("\nScrape:");
    println!("  Pool size: {}", scrape.pool_size);
    println!("  Global deadline: {}ms", scrape.global_deadline_ms);
    println!("  Drain grace: {}ms", scrape.drain_grace_ms);
    println!("  Block retry backoff: {}ms", scrape.block_retry_backoff_ms);
    for (name, tier) in [
        ("Fast tier", scrape.fast_tier),
        ("Slow tier", scrape.slow_tier),
        ("Retry-one tier", scrape.retry_one_tier),
    ] {
        println!(
            "  {}: fetch {}ms, body {}ms",
            name, tier.fetch_timeout_ms, tier.body_read_timeout_ms
        );
    }
    println!("  Brand source: {:?}", scrape.brand_source);

    println!("\nDisplay limits:");
    println!(
        "  Title {}, meta description {}, h1 {}",
        config.display.title_max, config.display.meta_description_max, config.display.h1_max
    );

    let blacklist = serp_scout::Blacklist::load_or_empty(Path::new(&config.blacklist.path));
    println!("\nBlacklist ({}): {} hosts", config.blacklist.path, blacklist.len());

    println!("\n✓ Configuration is valid");
}
