//! Batch scheduler for concurrent page fetching
//!
//! This module handles:
//! - Fan-out of one fetch per page in a page window
//! - Global concurrency limiting via a semaphore
//! - Enforcing the per-query page ceiling
//! - Fan-in of all page results into a single batch

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{PageOutcome, PageResult, PageSource};
use crate::listing::Listing;
use crate::query::Query;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

/// Merged result of one batch of page fetches
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    /// Listings from every usable page, in completion order
    pub listings: Vec<Listing>,

    /// Highest numeric price among `listings`
    pub max_price: Option<f64>,

    /// Pages that returned listings
    pub pages_ok: u32,

    /// Well-formed pages without listings
    pub pages_empty: u32,

    /// Pages whose attempts were exhausted
    pub pages_failed: u32,
}

impl BatchResult {
    /// Folds one page result into the batch
    ///
    /// Failed and empty pages are counted but contribute no listings.
    pub fn absorb(&mut self, page: PageResult) {
        match page.outcome {
            PageOutcome::Ok if !page.listings.is_empty() => {
                self.pages_ok += 1;
                for listing in &page.listings {
                    if let Some(price) = listing.price_value() {
                        self.max_price = Some(self.max_price.map_or(price, |m| m.max(price)));
                    }
                }
                self.listings.extend(page.listings);
            }
            PageOutcome::Ok | PageOutcome::Empty => self.pages_empty += 1,
            PageOutcome::Failed => self.pages_failed += 1,
        }
    }

    /// A batch is usable if at least one page returned listings
    pub fn is_usable(&self) -> bool {
        self.pages_ok > 0
    }

    /// Number of pages dispatched for this batch
    pub fn pages_scanned(&self) -> u32 {
        self.pages_ok + self.pages_empty + self.pages_failed
    }

    /// Listings contributed by this batch, before deduplication
    pub fn record_count(&self) -> usize {
        self.listings.len()
    }
}

/// Scheduler fans a page window out over a bounded worker pool
///
/// The scheduler coordinates:
/// - Global concurrency limits (max in-flight requests)
/// - The page ceiling the API enforces on any single query
pub struct BatchScheduler {
    /// Page source shared read-only by all tasks
    source: Arc<dyn PageSource>,

    /// Global semaphore for limiting concurrent fetches
    semaphore: Arc<Semaphore>,

    /// Maximum page number served for a single query
    page_ceiling: u32,
}

impl BatchScheduler {
    /// Creates a new scheduler
    pub fn new(config: &CrawlerConfig, source: Arc<dyn PageSource>) -> Self {
        let width = config.max_concurrent_requests.max(1) as usize;
        Self {
            source,
            semaphore: Arc::new(Semaphore::new(width)),
            page_ceiling: config.page_ceiling.max(1),
        }
    }

    pub fn page_ceiling(&self) -> u32 {
        self.page_ceiling
    }

    /// Last page to fetch for a query reporting `max_pages` pages
    pub fn last_page(&self, max_pages: u32) -> u32 {
        self.page_ceiling.min(max_pages)
    }

    /// Fetches pages `first_page..=last_page` of `query` concurrently
    ///
    /// `last_page` is clamped to the page ceiling. Waits for every dispatched
    /// fetch to finish; a slow page never causes faster pages to be dropped.
    pub async fn fetch_batch(&self, query: &Query, first_page: u32, last_page: u32) -> BatchResult {
        let first_page = first_page.max(1);
        let last_page = last_page.min(self.page_ceiling);
        let mut batch = BatchResult::default();

        if first_page > last_page {
            return batch;
        }

        tracing::debug!("Dispatching pages {}..={}", first_page, last_page);

        let query = Arc::new(query.clone());
        let mut tasks = JoinSet::new();

        for page in first_page..=last_page {
            let source = Arc::clone(&self.source);
            let semaphore = Arc::clone(&self.semaphore);
            let query = Arc::clone(&query);

            tasks.spawn(async move {
                let _permit = match semaphore.acquire_owned().await {
                    Ok(permit) => permit,
                    Err(_) => return PageResult::failed(page),
                };
                source.fetch_page(&query, page).await
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(page) => batch.absorb(page),
                Err(e) => {
                    tracing::error!("Page fetch task aborted: {}", e);
                    batch.pages_failed += 1;
                }
            }
        }

        if batch.pages_failed > 0 {
            tracing::warn!(
                "Batch finished with {} failed page(s) out of {}",
                batch.pages_failed,
                batch.pages_scanned()
            );
        }

        batch
    }
}
