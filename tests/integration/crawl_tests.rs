//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the listing search API and
//! exercise the full crawl cycle end-to-end over HTTP.

use listing_sweep::config::{Config, CrawlerConfig, FetcherConfig, OutputConfig, SearchConfig};
use listing_sweep::crawler::{Coordinator, CrawlStatus};
use listing_sweep::state::CrawlPhase;
use serde_json::{json, Value};
use std::time::Duration;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration pointing at the mock server
fn create_test_config(base_url: &str, page_ceiling: u32) -> Config {
    Config {
        search: SearchConfig {
            endpoint: format!("{}/search", base_url),
            region: "lom".to_string(),
            province: Some("MI".to_string()),
            municipality: None,
            nation: "IT".to_string(),
            contract: "1".to_string(),
            category: "1".to_string(),
            min_price: Some(0),
            max_price: None,
            language: "it".to_string(),
        },
        fetcher: FetcherConfig {
            max_attempts: 3,
            retry_delay_ms: 10, // Very short for testing
            request_timeout_secs: 5,
            user_agent: "ListingSweepTest/1.0".to_string(),
        },
        crawler: CrawlerConfig {
            page_ceiling,
            max_concurrent_requests: 4,
            timeout_secs: 60,
        },
        output: OutputConfig::default(),
    }
}

/// Builds a search response body with one listing per id
///
/// Listing `ids[i]` is priced `start + step * i`.
fn page_body(ids: std::ops::Range<u32>, start: u64, step: u64, count: u64, max_pages: u32) -> Value {
    let results: Vec<Value> = ids
        .enumerate()
        .map(|(i, id)| {
            json!({
                "realEstate": {
                    "id": id,
                    "properties": [{
                        "price": { "value": start + step * i as u64 },
                        "surface": "80 m²",
                        "rooms": "3"
                    }]
                },
                "seo": { "url": format!("https://listings.example/{}", id) }
            })
        })
        .collect();

    json!({
        "count": count,
        "maxPages": max_pages,
        "currentPage": 1,
        "results": results
    })
}

async fn mount_page(server: &MockServer, min_price: &str, page: &str, body: Value) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("prezzoMinimo", min_price))
        .and(query_param("pag", page))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_partitioned_crawl_retrieves_everything() {
    let mock_server = MockServer::start().await;

    // 150 matches, 50 per page, but only 2 pages served per query
    mount_page(&mock_server, "0", "1", page_body(0..50, 100_000, 1000, 150, 3)).await;
    mount_page(&mock_server, "0", "2", page_body(50..100, 150_000, 1000, 150, 3)).await;
    mount_page(&mock_server, "199001", "1", page_body(100..150, 200_000, 1000, 50, 1)).await;

    // Page 3 of the first query lies beyond the ceiling
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("prezzoMinimo", "0"))
        .and(query_param("pag", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..0, 0, 0, 150, 3)))
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 2);
    let outcome = Coordinator::new(&config)
        .expect("Failed to create coordinator")
        .run()
        .await;

    assert_eq!(outcome.status, CrawlStatus::Complete);
    assert_eq!(outcome.final_phase, CrawlPhase::Done);
    assert_eq!(outcome.expected_total, 150);
    assert_eq!(outcome.total(), 150);
    assert_eq!(outcome.stats.batches, 2);
    assert_eq!(outcome.stats.highest_lower_bound, Some(199_001));

    // Each listing appears exactly once
    let mut ids: Vec<&str> = outcome.listings.iter().map(|l| l.id.as_str()).collect();
    ids.sort_unstable();
    ids.dedup();
    assert_eq!(ids.len(), 150);
}

#[tokio::test]
async fn test_failing_page_is_retried_then_reported() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "0", "1", page_body(0..10, 1000, 10, 20, 2)).await;

    // Page 2 keeps failing: every attempt is made, then the page is given up
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("prezzoMinimo", "0"))
        .and(query_param("pag", "2"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 80);
    let outcome = Coordinator::new(&config)
        .expect("Failed to create coordinator")
        .run()
        .await;

    // The usable page survives; the next partition (unmocked, 404) fails too
    assert_eq!(outcome.status, CrawlStatus::Exhausted);
    assert!(outcome.is_partial());
    assert_eq!(outcome.total(), 10);
    assert_eq!(outcome.stats.pages_ok, 1);
    assert_eq!(outcome.stats.pages_failed, 2);
}

#[tokio::test]
async fn test_malformed_response_is_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("pag", "1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>maintenance</html>"))
        .up_to_n_times(1)
        .with_priority(1)
        .mount(&mock_server)
        .await;

    mount_page(&mock_server, "0", "1", page_body(0..5, 500, 100, 5, 1)).await;

    let config = create_test_config(&mock_server.uri(), 80);
    let outcome = Coordinator::new(&config)
        .expect("Failed to create coordinator")
        .run()
        .await;

    assert_eq!(outcome.status, CrawlStatus::Complete);
    assert_eq!(outcome.total(), 5);
    assert_eq!(outcome.listings[0].price_value(), Some(500.0));
    assert_eq!(outcome.listings[0].surface_value(), Some(80.0));
}

#[tokio::test]
async fn test_timeout_preserves_merged_listings() {
    let mock_server = MockServer::start().await;
    let delay = Duration::from_millis(200);

    for (min_price, ids, start) in [("0", 0..10, 10), ("101", 10..20, 200), ("291", 20..30, 400)] {
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("prezzoMinimo", min_price))
            .and(query_param("pag", "1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(page_body(ids, start, 10, 1000, 1))
                    .set_delay(delay),
            )
            .mount(&mock_server)
            .await;
    }

    let config = create_test_config(&mock_server.uri(), 80);
    let outcome = Coordinator::new(&config)
        .expect("Failed to create coordinator")
        .with_timeout(Duration::from_millis(300))
        .run()
        .await;

    // Probe and one sizing fetch complete; the budget is spent before a third batch
    assert_eq!(outcome.status, CrawlStatus::TimedOut);
    assert_eq!(outcome.final_phase, CrawlPhase::TimedOut);
    assert_eq!(outcome.expected_total, 1000);
    assert_eq!(outcome.total(), 20);
}

#[tokio::test]
async fn test_requests_carry_configured_user_agent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(header("user-agent", "ListingSweepTest/1.0"))
        .and(query_param("fkRegione", "lom"))
        .and(query_param("criterio", "prezzo"))
        .and(query_param("ordine", "asc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(page_body(0..3, 100, 1, 3, 1)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&mock_server.uri(), 80);
    let outcome = listing_sweep::crawl(&config)
        .await
        .expect("Crawl should start");

    assert!(outcome.is_complete());
    assert_eq!(outcome.total(), 3);
}

#[tokio::test]
async fn test_empty_result_set_completes() {
    let mock_server = MockServer::start().await;

    mount_page(&mock_server, "0", "1", page_body(0..0, 0, 0, 0, 0)).await;

    let config = create_test_config(&mock_server.uri(), 80);
    let outcome = listing_sweep::crawl(&config)
        .await
        .expect("Crawl should start");

    assert_eq!(outcome.status, CrawlStatus::Complete);
    assert_eq!(outcome.total(), 0);
    assert_eq!(outcome.expected_total, 0);
}

#[tokio::test]
async fn test_reported_matches_without_records_is_not_complete() {
    let mock_server = MockServer::start().await;

    // Every result lacks realEstate.id, so nothing decodes
    let body = json!({
        "count": 500,
        "maxPages": 10,
        "currentPage": 1,
        "results": [{ "realEstate": { "properties": [] } }]
    });
    mount_page(&mock_server, "0", "1", body).await;

    let config = create_test_config(&mock_server.uri(), 80);
    let outcome = listing_sweep::crawl(&config)
        .await
        .expect("Crawl should start");

    assert_eq!(outcome.status, CrawlStatus::Exhausted);
    assert!(!outcome.is_complete());
    assert_eq!(outcome.expected_total, 500);
    assert_eq!(outcome.total(), 0);
}
