//! Crawler module for adaptive paginated retrieval
//!
//! This module contains the core crawling logic, including:
//! - HTTP page fetching with retry logic
//! - Concurrent batch scheduling under a page ceiling
//! - Price-range partitioning past the ceiling
//! - Overall crawl orchestration and progress reporting

mod coordinator;
mod fetcher;
mod outcome;
mod partitioner;
mod progress;
mod scheduler;

pub use coordinator::{run_crawl, Coordinator};
pub use fetcher::{build_http_client, FetchError, PageFetcher, PageOutcome, PageResult, PageSource};
pub use outcome::{CrawlOutcome, CrawlStats, CrawlStatus};
pub use partitioner::{next_lower_bound, next_query, PartitionStep};
pub use progress::{LogProgress, NoProgress, ProgressEvent, ProgressReporter};
pub use scheduler::{BatchResult, BatchScheduler};

use crate::config::Config;
use crate::SweepError;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Build the initial query and the HTTP client
/// 2. Probe the expected total
/// 3. Fetch batches, re-partitioning the price range as needed
/// 4. Return the deduplicated listings and how the crawl ended
///
/// # Returns
///
/// * `Ok(CrawlOutcome)` - Crawl finished, completely or partially
/// * `Err(SweepError)` - The crawl could not be started
pub async fn crawl(config: &Config) -> Result<CrawlOutcome, SweepError> {
    run_crawl(config).await
}

/// Runs a crawl, reporting progress to `progress`
pub async fn crawl_with_progress<P>(config: &Config, progress: P) -> Result<CrawlOutcome, SweepError>
where
    P: ProgressReporter + 'static,
{
    let coordinator = Coordinator::new(config)?.with_progress(progress);
    Ok(coordinator.run().await)
}
