//! HTTP page fetcher
//!
//! This module handles every request to the search API:
//! - Building the shared HTTP client with a browser user agent
//! - GET of one page of one query
//! - Decoding the response envelope into listings
//! - Retry of transient failures with a fixed delay
//! - Classification of the outcome (ok / empty / failed)

use crate::config::FetcherConfig;
use crate::listing::{decode_page, DecodeError, Listing};
use crate::query::Query;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;

/// Outcome tag of a page fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageOutcome {
    /// Well-formed response with at least one listing
    Ok,

    /// Well-formed response without listings
    Empty,

    /// Attempts exhausted on transient errors
    Failed,
}

impl PageOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::Empty => "empty",
            Self::Failed => "failed",
        }
    }
}

/// Result of fetching one page of one query
///
/// Immutable once produced; the scheduler only reads it.
#[derive(Debug, Clone)]
pub struct PageResult {
    /// Requested page number
    pub page: u32,

    /// Listings in response order (empty unless `outcome` is `Ok`)
    pub listings: Vec<Listing>,

    /// Total matches reported for the query
    pub total_count: u64,

    /// Pages reported for the query
    pub max_pages: u32,

    pub outcome: PageOutcome,
}

impl PageResult {
    /// A page that returned listings
    pub fn ok(page: u32, listings: Vec<Listing>, total_count: u64, max_pages: u32) -> Self {
        if listings.is_empty() {
            return Self::empty(page, total_count, max_pages);
        }
        Self {
            page,
            listings,
            total_count,
            max_pages,
            outcome: PageOutcome::Ok,
        }
    }

    /// A well-formed page without listings
    pub fn empty(page: u32, total_count: u64, max_pages: u32) -> Self {
        Self {
            page,
            listings: Vec::new(),
            total_count,
            max_pages,
            outcome: PageOutcome::Empty,
        }
    }

    /// A page whose attempts were exhausted
    pub fn failed(page: u32) -> Self {
        Self {
            page,
            listings: Vec::new(),
            total_count: 0,
            max_pages: 0,
            outcome: PageOutcome::Failed,
        }
    }

    /// True if the page contributes listings to a batch
    pub fn is_usable(&self) -> bool {
        self.outcome == PageOutcome::Ok && !self.listings.is_empty()
    }
}

/// Source of result pages
///
/// Implementations must absorb their own errors: every call yields a
/// `PageResult`, failures included.
#[async_trait]
pub trait PageSource: Send + Sync {
    async fn fetch_page(&self, query: &Query, page: u32) -> PageResult;
}

/// Transient errors of a single attempt
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),

    #[error("malformed response: {0}")]
    Malformed(#[from] DecodeError),
}

/// Builds an HTTP client with proper configuration
///
/// The client is shared read-only by all concurrent page fetches.
pub fn build_http_client(config: &FetcherConfig) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(config.user_agent.as_str())
        .timeout(Duration::from_secs(config.request_timeout_secs))
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Fetches search pages over HTTP with retry logic
///
/// # Retry Logic
///
/// | Condition | Action |
/// |-----------|--------|
/// | Network error / timeout | Retry after fixed delay |
/// | Non-200 status | Retry after fixed delay |
/// | Malformed JSON | Retry after fixed delay |
/// | Attempts exhausted | `PageOutcome::Failed`, zero listings |
#[derive(Debug, Clone)]
pub struct PageFetcher {
    client: Client,
    max_attempts: u32,
    retry_delay: Duration,
}

impl PageFetcher {
    /// Creates a fetcher with a freshly built client
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(config)?;
        Ok(Self::with_client(client, config))
    }

    /// Creates a fetcher around an existing client
    pub fn with_client(client: Client, config: &FetcherConfig) -> Self {
        Self {
            client,
            max_attempts: config.max_attempts.max(1),
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }

    /// Single attempt: GET, status check, decode
    async fn attempt(&self, url: &str) -> Result<PageResult, FetchError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(FetchError::Status(status));
        }

        let body = response.text().await?;
        let decoded = decode_page(&body)?;

        Ok(PageResult::ok(
            decoded.current_page,
            decoded.listings,
            decoded.total_count,
            decoded.max_pages,
        ))
    }
}

#[async_trait]
impl PageSource for PageFetcher {
    async fn fetch_page(&self, query: &Query, page: u32) -> PageResult {
        let url = query.page_url(page);

        for attempt in 1..=self.max_attempts {
            tracing::debug!("Fetching page {} (attempt {}): {}", page, attempt, url);

            match self.attempt(url.as_str()).await {
                Ok(mut result) => {
                    // Trust the requested page number over the echoed one
                    result.page = page;
                    if result.outcome == PageOutcome::Empty {
                        tracing::debug!("Page {} returned no listings", page);
                    }
                    return result;
                }
                Err(e) => {
                    tracing::warn!(
                        "Page {} attempt {}/{} failed: {}",
                        page,
                        attempt,
                        self.max_attempts,
                        e
                    );
                    if attempt < self.max_attempts {
                        tokio::time::sleep(self.retry_delay).await;
                    }
                }
            }
        }

        tracing::error!(
            "Page {} failed after {} attempts: {}",
            page,
            self.max_attempts,
            url
        );
        PageResult::failed(page)
    }
}
