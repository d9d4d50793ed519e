//! JSON export of retrieved listings

use crate::crawler::CrawlOutcome;
use crate::listing::Listing;
use crate::output::OutputResult;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

#[derive(Serialize)]
struct Export<'a> {
    status: &'a str,
    expected_total: u64,
    retrieved: usize,
    started_at: DateTime<Utc>,
    finished_at: DateTime<Utc>,
    listings: &'a [Listing],
}

/// Serializes the outcome's listings and status as pretty-printed JSON
pub fn to_json(outcome: &CrawlOutcome) -> OutputResult<String> {
    Ok(serde_json::to_string_pretty(&export(outcome))?)
}

/// Writes the outcome's listings to `output_path`
pub fn write_listings_json(outcome: &CrawlOutcome, output_path: &Path) -> OutputResult<()> {
    let mut writer = BufWriter::new(File::create(output_path)?);
    serde_json::to_writer_pretty(&mut writer, &export(outcome))?;
    writer.write_all(b"\n")?;
    writer.flush()?;
    Ok(())
}

fn export(outcome: &CrawlOutcome) -> Export<'_> {
    Export {
        status: outcome.status.as_str(),
        expected_total: outcome.expected_total,
        retrieved: outcome.listings.len(),
        started_at: outcome.started_at,
        finished_at: outcome.finished_at,
        listings: &outcome.listings,
    }
}
