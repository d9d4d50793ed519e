//! Markdown summary generation
//!
//! This module generates human-readable markdown summaries of crawl results,
//! including run information, page counters and listing statistics.

use crate::crawler::CrawlOutcome;
use crate::output::stats::{GroupStat, ListingStatistics};
use crate::output::OutputResult;
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Run metadata not carried by the outcome itself
#[derive(Debug, Clone, Default)]
pub struct RunInfo {
    pub config_hash: String,
    pub first_page_url: String,
}

/// Generates a markdown summary of a crawl
///
/// # Arguments
///
/// * `outcome` - The finished crawl
/// * `stats` - Statistics over the outcome's listings
/// * `info` - Run metadata
/// * `output_path` - Path where the markdown file should be written
///
/// # Returns
///
/// * `Ok(())` - Successfully wrote markdown summary
/// * `Err(OutputError)` - Failed to write summary
pub fn generate_markdown_summary(
    outcome: &CrawlOutcome,
    stats: &ListingStatistics,
    info: &RunInfo,
    output_path: &Path,
) -> OutputResult<()> {
    let markdown = format_markdown_summary(outcome, stats, info);

    let mut file = File::create(output_path)?;
    file.write_all(markdown.as_bytes())?;

    Ok(())
}

fn format_price(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

fn push_group_table(md: &mut String, title: &str, groups: &[GroupStat]) {
    if groups.is_empty() {
        return;
    }

    md.push_str(&format!("### By {}\n\n", title));
    md.push_str("| Value | Listings | Mean Price per m² |\n");
    md.push_str("|-------|----------|-------------------|\n");
    for group in groups {
        md.push_str(&format!(
            "| {} | {} | {:.2} |\n",
            group.label, group.listings, group.mean_price_per_sqm
        ));
    }
    md.push('\n');
}

/// Formats a crawl summary as markdown
pub fn format_markdown_summary(
    outcome: &CrawlOutcome,
    stats: &ListingStatistics,
    info: &RunInfo,
) -> String {
    let mut md = String::new();

    md.push_str("# Listing-Sweep Crawl Summary\n\n");

    // Run metadata
    md.push_str("## Run Information\n\n");
    md.push_str(&format!("- **Started**: {}\n", outcome.started_at.to_rfc3339()));
    md.push_str(&format!("- **Finished**: {}\n", outcome.finished_at.to_rfc3339()));
    md.push_str(&format!(
        "- **Duration**: {:.2} seconds\n",
        outcome.elapsed.as_secs_f64()
    ));
    md.push_str(&format!("- **Status**: {}\n", outcome.status));
    if !info.first_page_url.is_empty() {
        md.push_str(&format!("- **Query**: {}\n", info.first_page_url));
    }
    if !info.config_hash.is_empty() {
        md.push_str(&format!("- **Config Hash**: {}\n", info.config_hash));
    }
    md.push('\n');

    // Retrieval counters
    let coverage = if outcome.expected_total > 0 {
        (outcome.total() as f64 / outcome.expected_total as f64) * 100.0
    } else {
        100.0
    };
    md.push_str("## Retrieval\n\n");
    md.push_str(&format!("- **Expected Listings**: {}\n", outcome.expected_total));
    md.push_str(&format!("- **Unique Listings**: {}\n", outcome.total()));
    md.push_str(&format!("- **Coverage**: {:.2}%\n", coverage));
    md.push_str(&format!("- **Batches**: {}\n", outcome.stats.batches));
    if let Some(bound) = outcome.stats.highest_lower_bound {
        md.push_str(&format!("- **Highest Price Lower Bound**: {}\n", bound));
    }
    md.push('\n');

    md.push_str("| Pages | Count |\n");
    md.push_str("|-------|-------|\n");
    md.push_str(&format!("| With listings | {} |\n", outcome.stats.pages_ok));
    md.push_str(&format!("| Empty | {} |\n", outcome.stats.pages_empty));
    md.push_str(&format!("| Failed | {} |\n\n", outcome.stats.pages_failed));

    // Listing statistics
    md.push_str("## Listing Statistics\n\n");
    md.push_str(&format!("- **With Price**: {}\n", stats.priced));
    md.push_str(&format!("- **Mean Price**: {}\n", format_price(stats.mean_price)));
    md.push_str(&format!("- **Min Price**: {}\n", format_price(stats.min_price)));
    md.push_str(&format!("- **Max Price**: {}\n", format_price(stats.max_price)));
    md.push_str(&format!(
        "- **Mean Surface (m²)**: {}\n",
        format_price(stats.mean_surface)
    ));
    md.push_str(&format!(
        "- **Median Price per m²**: {}\n\n",
        format_price(stats.median_price_per_sqm)
    ));

    push_group_table(&mut md, "Condition", &stats.by_condition);
    push_group_table(&mut md, "Rooms", &stats.by_rooms);
    push_group_table(&mut md, "Bathrooms", &stats.by_bathrooms);
    push_group_table(&mut md, "Garage", &stats.by_garage);

    md
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawler::{CrawlStats, CrawlStatus};
    use crate::listing::{Coerced, Listing};
    use crate::state::CrawlPhase;
    use chrono::Utc;
    use std::time::Duration;

    fn create_test_outcome(status: CrawlStatus) -> CrawlOutcome {
        let mut listing = Listing::new("42");
        listing.price = Some(Coerced::Typed(200_000.0));
        listing.surface = Some(Coerced::Typed(80.0));
        listing.condition = Some(Coerced::Typed("Buono".to_string()));

        CrawlOutcome {
            status,
            final_phase: CrawlPhase::Done,
            listings: vec![listing],
            expected_total: 2,
            stats: CrawlStats {
                batches: 1,
                pages_ok: 1,
                pages_empty: 0,
                pages_failed: 1,
                highest_lower_bound: Some(0),
            },
            started_at: Utc::now(),
            finished_at: Utc::now(),
            elapsed: Duration::from_secs(3),
        }
    }

    #[test]
    fn test_format_markdown_summary() {
        let outcome = create_test_outcome(CrawlStatus::Exhausted);
        let stats = ListingStatistics::from_listings(&outcome.listings);
        let info = RunInfo {
            config_hash: "abc123".to_string(),
            first_page_url: "https://api.example.com/search?pag=1".to_string(),
        };
        let markdown = format_markdown_summary(&outcome, &stats, &info);

        assert!(markdown.contains("# Listing-Sweep Crawl Summary"));
        assert!(markdown.contains("- **Status**: exhausted"));
        assert!(markdown.contains("- **Config Hash**: abc123"));
        assert!(markdown.contains("- **Coverage**: 50.00%"));
        assert!(markdown.contains("| Failed | 1 |"));
    }

    #[test]
    fn test_markdown_with_grouped_statistics() {
        let outcome = create_test_outcome(CrawlStatus::Complete);
        let stats = ListingStatistics::from_listings(&outcome.listings);
        let markdown = format_markdown_summary(&outcome, &stats, &RunInfo::default());

        assert!(markdown.contains("### By Condition"));
        assert!(markdown.contains("| Buono | 1 | 2500.00 |"));
        assert!(!markdown.contains("### By Rooms"));
        assert!(!markdown.contains("Config Hash"));
    }

    #[test]
    fn test_generate_markdown_summary_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.md");
        let outcome = create_test_outcome(CrawlStatus::TimedOut);
        let stats = ListingStatistics::from_listings(&outcome.listings);

        generate_markdown_summary(&outcome, &stats, &RunInfo::default(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("partial-timeout"));
    }
}
