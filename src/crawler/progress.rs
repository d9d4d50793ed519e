//! Progress signals for callers
//!
//! The orchestrator emits plain events; how they are displayed is up to the
//! caller. Any `Fn(&ProgressEvent)` closure is a reporter.

use crate::crawler::outcome::CrawlStatus;

/// Incremental progress of a crawl
#[derive(Debug, Clone, PartialEq)]
pub enum ProgressEvent {
    /// The probe learned the total match count and page count
    TotalDiscovered { expected_total: u64, max_pages: u32 },

    /// A batch was merged into the crawl state
    BatchCompleted {
        batch: u32,
        pages_scanned: u32,
        new_listings: usize,
        accumulated: u64,
        expected_total: u64,
        lower_bound: Option<u64>,
    },

    /// The crawl reached a terminal phase
    Finished { status: CrawlStatus, accumulated: u64 },
}

/// Receiver of crawl progress events
pub trait ProgressReporter: Send + Sync {
    fn report(&self, event: &ProgressEvent);
}

impl<F> ProgressReporter for F
where
    F: Fn(&ProgressEvent) + Send + Sync,
{
    fn report(&self, event: &ProgressEvent) {
        self(event)
    }
}

/// Discards all events
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressReporter for NoProgress {
    fn report(&self, _event: &ProgressEvent) {}
}

/// Logs events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgress;

impl ProgressReporter for LogProgress {
    fn report(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::TotalDiscovered {
                expected_total,
                max_pages,
            } => {
                tracing::info!(
                    "Listings to retrieve: {} (in {} pages)",
                    expected_total,
                    max_pages
                );
            }
            ProgressEvent::BatchCompleted {
                batch,
                pages_scanned,
                accumulated,
                expected_total,
                ..
            } => {
                let percent = if *expected_total > 0 {
                    (*accumulated as f64 / *expected_total as f64) * 100.0
                } else {
                    100.0
                };
                tracing::info!(
                    "Progress: batch {} scanned {} pages, {}/{} listings ({:.1}%)",
                    batch,
                    pages_scanned,
                    accumulated,
                    expected_total,
                    percent
                );
            }
            ProgressEvent::Finished {
                status,
                accumulated,
            } => {
                tracing::info!("Crawl {}: {} unique listings", status, accumulated);
            }
        }
    }
}
