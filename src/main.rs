//! Listing-Sweep main entry point
//!
//! This is the command-line interface for the Listing-Sweep crawler.

use clap::Parser;
use listing_sweep::config::{load_config_with_hash, Config};
use listing_sweep::crawler::{crawl_with_progress, LogProgress};
use listing_sweep::output::{print_statistics, write_outputs, ListingStatistics, RunInfo};
use listing_sweep::query::Query;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Listing-Sweep: retrieves every listing of a page-capped search API
///
/// Listing-Sweep works around the API's page ceiling by re-partitioning the
/// price range, retries failed pages, deduplicates listings and stops at a
/// wall-clock budget with whatever it has retrieved.
#[derive(Parser, Debug)]
#[command(name = "listing-sweep")]
#[command(version = "1.0.0")]
#[command(about = "An adaptive crawler for page-capped listing search APIs", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show the first request without crawling
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if cli.dry_run {
        handle_dry_run(&config)?;
    } else {
        handle_crawl(&config, config_hash).await?;
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
            0 => EnvFilter::new("listing_sweep=info,warn"),
            1 => EnvFilter::new("listing_sweep=debug,info"),
            2 => EnvFilter::new("listing_sweep=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn display_opt<T: std::fmt::Display>(value: &Option<T>) -> String {
    value
        .as_ref()
        .map_or_else(|| "-".to_string(), |v| v.to_string())
}

/// Handles the --dry-run mode: validates config and shows the first request
fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let query = Query::from_config(&config.search)?;

    println!("=== Listing-Sweep Dry Run ===\n");

    println!("Search:");
    println!("  Endpoint: {}", config.search.endpoint);
    println!("  Region: {}", config.search.region);
    println!("  Province: {}", display_opt(&config.search.province));
    println!("  Municipality: {}", display_opt(&config.search.municipality));
    println!("  Contract: {}", config.search.contract);
    println!("  Category: {}", config.search.category);
    println!(
        "  Price range: {} - {}",
        display_opt(&config.search.min_price),
        display_opt(&config.search.max_price)
    );

    println!("\nFetcher:");
    println!("  Max attempts: {}", config.fetcher.max_attempts);
    println!("  Retry delay: {}ms", config.fetcher.retry_delay_ms);
    println!("  Request timeout: {}s", config.fetcher.request_timeout_secs);
    println!("  User agent: {}", config.fetcher.user_agent);

    println!("\nCrawler:");
    println!("  Page ceiling: {}", config.crawler.page_ceiling);
    println!(
        "  Max concurrent requests: {}",
        config.crawler.max_concurrent_requests
    );
    println!("  Timeout: {}s", config.crawler.timeout_secs);

    println!("\nOutput:");
    println!("  Listings: {}", display_opt(&config.output.listings_path));
    println!("  Summary: {}", display_opt(&config.output.summary_path));

    println!("\n✓ Configuration is valid");
    println!("✓ Would start with: {}", query.page_url(1));

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: String) -> Result<(), Box<dyn std::error::Error>> {
    let first_page_url = Query::from_config(&config.search)?.page_url(1).to_string();
    tracing::info!("First request: {}", first_page_url);

    let outcome = match crawl_with_progress(config, LogProgress).await {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            return Err(e.into());
        }
    };

    // Partial outcomes are still results: report them and exit normally
    if outcome.is_partial() {
        tracing::warn!(
            "Crawl ended {}: {} of {} listings retrieved",
            outcome.status,
            outcome.total(),
            outcome.expected_total
        );
    }

    let stats = ListingStatistics::from_listings(&outcome.listings);
    print_statistics(&stats);
    println!(
        "Status: {} ({} of {} listings)",
        outcome.status,
        outcome.total(),
        outcome.expected_total
    );

    let info = RunInfo {
        config_hash,
        first_page_url,
    };
    write_outputs(&config.output, &outcome, &stats, &info)?;

    Ok(())
}
