//! Statistics over retrieved listings
//!
//! This module aggregates prices and surfaces of a crawl's listings and
//! prints them in a readable form.

use crate::listing::{Coerced, Listing};
use std::collections::BTreeMap;

/// Mean price per m² for one value of a grouping field
#[derive(Debug, Clone, PartialEq)]
pub struct GroupStat {
    pub label: String,
    pub listings: usize,
    pub mean_price_per_sqm: f64,
}

/// Listing statistics summary
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListingStatistics {
    /// Number of listings considered
    pub count: usize,

    /// Listings with a numeric price
    pub priced: usize,

    pub mean_price: Option<f64>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,

    /// Mean surface in m² over listings with a numeric surface
    pub mean_surface: Option<f64>,

    pub median_price_per_sqm: Option<f64>,

    pub by_condition: Vec<GroupStat>,
    pub by_rooms: Vec<GroupStat>,
    pub by_bathrooms: Vec<GroupStat>,
    pub by_garage: Vec<GroupStat>,
}

impl ListingStatistics {
    /// Computes statistics over `listings`
    pub fn from_listings(listings: &[Listing]) -> Self {
        let prices: Vec<f64> = listings.iter().filter_map(Listing::price_value).collect();
        let surfaces: Vec<f64> = listings.iter().filter_map(Listing::surface_value).collect();
        let mut per_sqm: Vec<f64> = listings.iter().filter_map(Listing::price_per_sqm).collect();

        Self {
            count: listings.len(),
            priced: prices.len(),
            mean_price: mean(&prices),
            min_price: prices.iter().copied().reduce(f64::min),
            max_price: prices.iter().copied().reduce(f64::max),
            mean_surface: mean(&surfaces),
            median_price_per_sqm: median(&mut per_sqm),
            by_condition: group_by(listings, |l| l.condition.as_ref()),
            by_rooms: group_by(listings, |l| l.rooms.as_ref()),
            by_bathrooms: group_by(listings, |l| l.bathrooms.as_ref()),
            by_garage: group_by(listings, |l| l.garage.as_ref()),
        }
    }
}

fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

fn median(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    let mid = values.len() / 2;
    if values.len() % 2 == 0 {
        Some((values[mid - 1] + values[mid]) / 2.0)
    } else {
        Some(values[mid])
    }
}

/// Display label of a textual field; raw values use their JSON form
fn label(value: &Coerced<String>) -> String {
    match value {
        Coerced::Typed(text) => text.clone(),
        Coerced::Raw(raw) => raw.to_string(),
    }
}

/// Mean price per m² grouped by a textual field, sorted by label
fn group_by<F>(listings: &[Listing], field: F) -> Vec<GroupStat>
where
    F: Fn(&Listing) -> Option<&Coerced<String>>,
{
    let mut groups: BTreeMap<String, Vec<f64>> = BTreeMap::new();

    for listing in listings {
        if let (Some(value), Some(per_sqm)) = (field(listing), listing.price_per_sqm()) {
            groups.entry(label(value)).or_default().push(per_sqm);
        }
    }

    groups
        .into_iter()
        .filter_map(|(label, values)| {
            mean(&values).map(|m| GroupStat {
                label,
                listings: values.len(),
                mean_price_per_sqm: m,
            })
        })
        .collect()
}

fn format_opt(value: Option<f64>) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{:.2}", v))
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &ListingStatistics) {
    println!("=== Listing Statistics ===\n");

    println!("Overview:");
    println!("  Listings: {}", stats.count);
    println!("  With price: {}", stats.priced);
    println!("  Mean price: {}", format_opt(stats.mean_price));
    println!(
        "  Price range: {} - {}",
        format_opt(stats.min_price),
        format_opt(stats.max_price)
    );
    println!("  Mean surface (m²): {}", format_opt(stats.mean_surface));
    println!(
        "  Median price per m²: {}",
        format_opt(stats.median_price_per_sqm)
    );

    for (title, groups) in [
        ("Condition", &stats.by_condition),
        ("Rooms", &stats.by_rooms),
        ("Bathrooms", &stats.by_bathrooms),
        ("Garage", &stats.by_garage),
    ] {
        if groups.is_empty() {
            continue;
        }
        println!();
        println!("Mean price per m² by {}:", title.to_lowercase());
        for group in groups {
            println!(
                "  {}: {:.2} ({} listings)",
                group.label, group.mean_price_per_sqm, group.listings
            );
        }
    }
    println!();
}
