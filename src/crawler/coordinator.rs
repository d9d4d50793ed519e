//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that drives the state machine:
//! - Probing page 1 for the expected total and page count
//! - Running batches over the page window of the current query
//! - Merging batches into the deduplicated crawl state
//! - Re-partitioning the price range when a batch leaves listings unseen
//! - Enforcing the wall-clock budget at batch boundaries

use crate::config::{Config, CrawlerConfig};
use crate::crawler::fetcher::{PageFetcher, PageOutcome, PageResult, PageSource};
use crate::crawler::outcome::{CrawlOutcome, CrawlStats, CrawlStatus};
use crate::crawler::partitioner::{next_query, PartitionStep};
use crate::crawler::progress::{NoProgress, ProgressEvent, ProgressReporter};
use crate::crawler::scheduler::{BatchResult, BatchScheduler};
use crate::query::Query;
use crate::state::{CrawlPhase, CrawlState};
use crate::SweepError;
use chrono::Utc;
use std::sync::Arc;
use std::time::Duration;

/// Main crawler coordinator structure
pub struct Coordinator {
    source: Arc<dyn PageSource>,
    scheduler: BatchScheduler,
    state: CrawlState,
    stats: CrawlStats,
    timeout: Duration,
    progress: Arc<dyn ProgressReporter>,
}

impl Coordinator {
    /// Creates a coordinator that fetches over HTTP
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Ready to run
    /// * `Err(SweepError)` - Invalid endpoint or HTTP client construction failed
    pub fn new(config: &Config) -> Result<Self, SweepError> {
        let query = Query::from_config(&config.search)?;
        let fetcher = PageFetcher::new(&config.fetcher)?;
        Ok(Self::with_source(query, &config.crawler, Arc::new(fetcher)))
    }

    /// Creates a coordinator over any page source
    pub fn with_source(query: Query, config: &CrawlerConfig, source: Arc<dyn PageSource>) -> Self {
        Self {
            scheduler: BatchScheduler::new(config, Arc::clone(&source)),
            source,
            state: CrawlState::new(query),
            stats: CrawlStats::default(),
            timeout: Duration::from_secs(config.timeout_secs),
            progress: Arc::new(NoProgress),
        }
    }

    /// Sets the receiver of progress events
    pub fn with_progress<P>(mut self, progress: P) -> Self
    where
        P: ProgressReporter + 'static,
    {
        self.progress = Arc::new(progress);
        self
    }

    /// Overrides the wall-clock budget
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs the crawl to a terminal phase
    ///
    /// Never fails: whatever was merged before the crawl stopped is returned,
    /// with the status telling complete and partial results apart.
    pub async fn run(mut self) -> CrawlOutcome {
        tracing::info!(
            "Starting crawl (page ceiling {}, budget {:?})",
            self.scheduler.page_ceiling(),
            self.timeout
        );

        let status = match self.drive().await {
            Ok(status) => status,
            Err(e) => {
                tracing::error!("Crawl stopped early: {}", e);
                CrawlStatus::Exhausted
            }
        };

        self.finish(status)
    }

    /// Drives the state machine; returns the terminal status
    async fn drive(&mut self) -> Result<CrawlStatus, SweepError> {
        self.state.transition(CrawlPhase::Probing)?;

        let probe = self.source.fetch_page(self.state.query(), 1).await;
        self.state.expected_total = probe.total_count;
        if let Some(bound) = self.state.query().min_price() {
            self.stats.record_lower_bound(bound);
        }

        self.progress.report(&ProgressEvent::TotalDiscovered {
            expected_total: probe.total_count,
            max_pages: probe.max_pages,
        });

        if !probe.is_usable() {
            self.state.transition(CrawlPhase::Done)?;
            self.stats.record_page(probe.outcome);
            return Ok(match probe.outcome {
                PageOutcome::Failed => {
                    tracing::warn!("Probe failed; nothing retrieved");
                    CrawlStatus::Exhausted
                }
                _ if probe.total_count == 0 => {
                    tracing::info!("Query matched no listings");
                    CrawlStatus::Complete
                }
                _ => {
                    tracing::warn!(
                        "Probe reported {} listings but returned none; nothing retrieved",
                        probe.total_count
                    );
                    CrawlStatus::Exhausted
                }
            });
        }

        // Page 1 of the current query, reused as the first page of its batch
        let mut first_page = Some(probe);

        loop {
            if self.state.is_over_budget(self.timeout) {
                tracing::warn!(
                    "Timeout after {:?}: stopping with {} of {} listings",
                    self.state.elapsed(),
                    self.state.accumulated(),
                    self.state.expected_total
                );
                self.state.transition(CrawlPhase::TimedOut)?;
                return Ok(CrawlStatus::TimedOut);
            }

            self.state.transition(CrawlPhase::Batching)?;
            let mut batch = self.run_batch(first_page.take()).await;

            self.state.transition(CrawlPhase::Merging)?;
            self.stats.record_batch(&batch);
            let new_listings = self.state.merge(std::mem::take(&mut batch.listings));

            self.progress.report(&ProgressEvent::BatchCompleted {
                batch: self.stats.batches,
                pages_scanned: batch.pages_scanned(),
                new_listings,
                accumulated: self.state.accumulated(),
                expected_total: self.state.expected_total,
                lower_bound: self.state.query().min_price(),
            });

            if self.state.target_reached() {
                self.state.transition(CrawlPhase::Done)?;
                return Ok(CrawlStatus::Complete);
            }

            let max_price = match batch.max_price {
                Some(price) if batch.is_usable() => price,
                _ => {
                    tracing::warn!(
                        "Batch {} yielded no usable pages; stopping at {} of {} listings",
                        self.stats.batches,
                        self.state.accumulated(),
                        self.state.expected_total
                    );
                    self.state.transition(CrawlPhase::Done)?;
                    return Ok(CrawlStatus::Exhausted);
                }
            };

            match next_query(self.state.query(), max_price) {
                PartitionStep::Advance(query) => {
                    if let Some(bound) = query.min_price() {
                        tracing::debug!("Advancing price lower bound to {}", bound);
                        self.stats.record_lower_bound(bound);
                    }
                    self.state.set_query(query);
                }
                PartitionStep::Stalled { bound } => {
                    tracing::warn!(
                        "Price partitioning stalled at lower bound {}; stopping",
                        bound
                    );
                    self.state.transition(CrawlPhase::Done)?;
                    return Ok(CrawlStatus::Exhausted);
                }
                PartitionStep::BeyondUpperBound { bound } => {
                    tracing::info!(
                        "Next lower bound {} exceeds the price range; stopping",
                        bound
                    );
                    self.state.transition(CrawlPhase::Done)?;
                    return Ok(CrawlStatus::Exhausted);
                }
            }
        }
    }

    /// Fetches one batch for the current query
    ///
    /// `first_page` is page 1 of the current query when already fetched (the
    /// probe); otherwise page 1 is fetched first to learn the query's page count.
    async fn run_batch(&self, first_page: Option<PageResult>) -> BatchResult {
        let first_page = match first_page {
            Some(page) => page,
            None => {
                let page = self.source.fetch_page(self.state.query(), 1).await;
                tracing::debug!(
                    "Query above {:?} reports {} listings in {} pages",
                    self.state.query().min_price(),
                    page.total_count,
                    page.max_pages
                );
                page
            }
        };

        if !first_page.is_usable() {
            return single_page_batch(first_page);
        }

        let last_page = self.scheduler.last_page(first_page.max_pages);
        let mut batch = self
            .scheduler
            .fetch_batch(self.state.query(), 2, last_page)
            .await;
        batch.absorb(first_page);

        tracing::info!(
            "Batch {}: pages 1..={} -> {} listings ({} ok, {} empty, {} failed)",
            self.stats.batches + 1,
            last_page.max(1),
            batch.record_count(),
            batch.pages_ok,
            batch.pages_empty,
            batch.pages_failed
        );

        batch
    }

    /// Builds the outcome from the terminal state
    fn finish(self, status: CrawlStatus) -> CrawlOutcome {
        let final_phase = self.state.phase();
        let expected_total = self.state.expected_total;
        let started_at = self.state.started_at;
        let elapsed = self.state.elapsed();
        let listings = self.state.into_listings();

        self.progress.report(&ProgressEvent::Finished {
            status,
            accumulated: listings.len() as u64,
        });

        tracing::info!(
            "Crawl {}: {} unique listings of {} expected in {:?} ({} pages)",
            status,
            listings.len(),
            expected_total,
            elapsed,
            self.stats.pages_scanned()
        );

        CrawlOutcome {
            status,
            final_phase,
            listings,
            expected_total,
            stats: self.stats,
            started_at,
            finished_at: Utc::now(),
            elapsed,
        }
    }
}

fn single_page_batch(page: PageResult) -> BatchResult {
    let mut batch = BatchResult::default();
    batch.absorb(page);
    batch
}

/// Runs a complete crawl for `config`
///
/// # Example
///
/// ```no_run
/// use listing_sweep::config::load_config;
/// use listing_sweep::crawler::run_crawl;
/// use std::path::Path;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let config = load_config(Path::new("sweep.toml"))?;
/// let outcome = run_crawl(&config).await?;
/// println!("{} listings ({})", outcome.total(), outcome.status);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(config: &Config) -> Result<CrawlOutcome, SweepError> {
    let coordinator = Coordinator::new(config)?;
    Ok(coordinator.run().await)
}
