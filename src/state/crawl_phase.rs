/// Crawl phase definitions for the orchestrator state machine
///
/// `Init → Probing → Batching → Merging → (Batching | Done | TimedOut)`
use std::fmt;

/// Represents the current phase of a crawl
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    // ===== Active Phases =====
    /// Initial query accepted, nothing fetched yet
    Init,

    /// Fetching page 1 to learn the total match count and page count
    Probing,

    /// Fetching the page window of the current query
    Batching,

    /// Deduplicating a finished batch into the crawl state
    Merging,

    // ===== Terminal Phases =====
    /// Crawl stopped: target reached or no further progress possible
    Done,

    /// Wall-clock budget exceeded at a batch boundary
    TimedOut,
}

impl CrawlPhase {
    /// Returns true if no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::TimedOut)
    }

    /// Returns true if `self → next` is an edge of the state machine
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        use CrawlPhase::*;
        matches!(
            (self, next),
            (Init, Probing)
                | (Probing, Batching)
                | (Probing, Done)
                | (Probing, TimedOut)
                | (Batching, Merging)
                | (Merging, Batching)
                | (Merging, Done)
                | (Merging, TimedOut)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Probing => "probing",
            Self::Batching => "batching",
            Self::Merging => "merging",
            Self::Done => "done",
            Self::TimedOut => "timed_out",
        }
    }

    /// Returns all crawl phases
    pub fn all_phases() -> Vec<Self> {
        vec![
            Self::Init,
            Self::Probing,
            Self::Batching,
            Self::Merging,
            Self::Done,
            Self::TimedOut,
        ]
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
