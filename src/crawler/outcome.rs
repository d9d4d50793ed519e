//! Final result of a crawl

use crate::crawler::fetcher::PageOutcome;
use crate::crawler::scheduler::BatchResult;
use crate::listing::Listing;
use crate::state::CrawlPhase;
use chrono::{DateTime, Utc};
use std::fmt;
use std::time::Duration;

/// How a crawl ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlStatus {
    /// Every expected listing was retrieved, or the query matched nothing
    Complete,

    /// No further progress was possible before reaching the expected total
    Exhausted,

    /// The wall-clock budget ran out
    TimedOut,
}

impl CrawlStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Complete => "complete",
            Self::Exhausted => "exhausted",
            Self::TimedOut => "partial-timeout",
        }
    }
}

impl fmt::Display for CrawlStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Page and batch counters for diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStats {
    /// Batches merged
    pub batches: u32,

    pub pages_ok: u32,
    pub pages_empty: u32,
    pub pages_failed: u32,

    /// Highest price lower bound queried
    pub highest_lower_bound: Option<u64>,
}

impl CrawlStats {
    pub fn record_batch(&mut self, batch: &BatchResult) {
        self.batches += 1;
        self.pages_ok += batch.pages_ok;
        self.pages_empty += batch.pages_empty;
        self.pages_failed += batch.pages_failed;
    }

    /// Counts a page fetched outside any batch
    pub fn record_page(&mut self, outcome: PageOutcome) {
        match outcome {
            PageOutcome::Ok => self.pages_ok += 1,
            PageOutcome::Empty => self.pages_empty += 1,
            PageOutcome::Failed => self.pages_failed += 1,
        }
    }

    pub fn record_lower_bound(&mut self, bound: u64) {
        self.highest_lower_bound = Some(self.highest_lower_bound.map_or(bound, |b| b.max(bound)));
    }

    /// Total page requests that produced a result
    pub fn pages_scanned(&self) -> u32 {
        self.pages_ok + self.pages_empty + self.pages_failed
    }
}

/// Deduplicated listings plus how the crawl ended
#[derive(Debug, Clone)]
pub struct CrawlOutcome {
    pub status: CrawlStatus,

    /// Phase the state machine stopped in (`Done` or `TimedOut`)
    pub final_phase: CrawlPhase,

    /// Unique listings in first-seen order
    pub listings: Vec<Listing>,

    /// Total matches reported by the probe
    pub expected_total: u64,

    pub stats: CrawlStats,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed: Duration,
}

impl CrawlOutcome {
    pub fn is_complete(&self) -> bool {
        self.status == CrawlStatus::Complete
    }

    /// True if the crawl stopped before retrieving everything
    pub fn is_partial(&self) -> bool {
        !self.is_complete()
    }

    /// Number of unique listings retrieved
    pub fn total(&self) -> usize {
        self.listings.len()
    }
}
