use crate::listing::Listing;
use crate::query::Query;
use crate::state::CrawlPhase;
use crate::SweepError;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::time::{Duration, Instant};

/// Process-scoped state of a single crawl
///
/// Owned by the orchestrator and mutated only at phase transitions. Listings
/// are keyed by identifier; the first listing seen for an identifier wins and
/// insertion order is preserved for the final result.
#[derive(Debug)]
pub struct CrawlState {
    /// Current phase of the state machine
    phase: CrawlPhase,

    /// Query the next batch will fetch
    query: Query,

    /// Deduplicated listings by identifier
    listings: HashMap<String, Listing>,

    /// Identifiers in first-seen order
    order: Vec<String>,

    /// Total matches reported by the probe
    pub expected_total: u64,

    /// Monotonic clock for the timeout budget
    started: Instant,

    /// Wall-clock start for reporting
    pub started_at: DateTime<Utc>,
}

impl CrawlState {
    /// Creates the state for a crawl starting from `query`
    pub fn new(query: Query) -> Self {
        Self {
            phase: CrawlPhase::Init,
            query,
            listings: HashMap::new(),
            order: Vec::new(),
            expected_total: 0,
            started: Instant::now(),
            started_at: Utc::now(),
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn query(&self) -> &Query {
        &self.query
    }

    /// Moves the state machine to `next`
    ///
    /// # Returns
    ///
    /// * `Err(SweepError::InvalidTransition)` - `next` is not reachable from the current phase
    pub fn transition(&mut self, next: CrawlPhase) -> Result<(), SweepError> {
        if !self.phase.can_transition_to(next) {
            return Err(SweepError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::trace!("Crawl phase {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Replaces the query used by the next batch
    pub fn set_query(&mut self, query: Query) {
        self.query = query;
    }

    /// Merges listings into the state, keeping the first-seen record per identifier
    ///
    /// Returns the number of identifiers that were new.
    pub fn merge<I>(&mut self, listings: I) -> usize
    where
        I: IntoIterator<Item = Listing>,
    {
        let mut added = 0;
        for listing in listings {
            if self.listings.contains_key(&listing.id) {
                continue;
            }
            self.order.push(listing.id.clone());
            self.listings.insert(listing.id.clone(), listing);
            added += 1;
        }
        added
    }

    /// Number of unique listings accumulated so far
    pub fn accumulated(&self) -> u64 {
        self.order.len() as u64
    }

    pub fn get(&self, id: &str) -> Option<&Listing> {
        self.listings.get(id)
    }

    /// True once the accumulated count reaches the probed total
    pub fn target_reached(&self) -> bool {
        self.accumulated() >= self.expected_total
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    pub fn is_over_budget(&self, budget: Duration) -> bool {
        self.elapsed() > budget
    }

    /// Consumes the state, returning listings in first-seen order
    pub fn into_listings(mut self) -> Vec<Listing> {
        self.order
            .iter()
            .filter_map(|id| self.listings.remove(id))
            .collect()
    }
}
