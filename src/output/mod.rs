//! Output module for crawl summaries and exports
//!
//! This module handles:
//! - Computing statistics over retrieved listings
//! - Generating markdown summaries of crawl results
//! - Exporting listings as JSON

mod json;
mod markdown;
pub mod stats;

pub use json::{to_json, write_listings_json};
pub use markdown::{format_markdown_summary, generate_markdown_summary, RunInfo};
pub use stats::{print_statistics, GroupStat, ListingStatistics};

use crate::config::OutputConfig;
use crate::crawler::CrawlOutcome;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to write output: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;

/// Writes every output enabled in `config`
///
/// # Returns
///
/// * `Ok(())` - All configured outputs written (or none configured)
/// * `Err(OutputError)` - An output could not be written
pub fn write_outputs(
    config: &OutputConfig,
    outcome: &CrawlOutcome,
    stats: &ListingStatistics,
    info: &RunInfo,
) -> OutputResult<()> {
    if let Some(path) = &config.listings_path {
        write_listings_json(outcome, Path::new(path))
            .map_err(|e| OutputError::Write(format!("{}: {}", path, e)))?;
        tracing::info!("Wrote {} listings to {}", outcome.total(), path);
    }

    if let Some(path) = &config.summary_path {
        generate_markdown_summary(outcome, stats, info, Path::new(path))
            .map_err(|e| OutputError::Write(format!("{}: {}", path, e)))?;
        tracing::info!("Wrote summary to {}", path);
    }

    Ok(())
}
