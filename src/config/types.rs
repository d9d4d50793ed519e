use serde::Deserialize;

/// Desktop browser identification sent with every request; the upstream API
/// degrades responses for clients that do not look like a browser.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Main configuration structure for Listing-Sweep
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub search: SearchConfig,
    #[serde(default)]
    pub fetcher: FetcherConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

/// Search filters and the initial price range
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    /// Search endpoint of the listing API
    pub endpoint: String,

    /// Region identifier (e.g. "lom")
    pub region: String,

    /// Province identifier (e.g. "MI")
    #[serde(default)]
    pub province: Option<String>,

    /// Municipality identifier
    #[serde(default)]
    pub municipality: Option<String>,

    #[serde(default = "default_nation")]
    pub nation: String,

    /// Contract code (1 = sale)
    #[serde(default = "default_code")]
    pub contract: String,

    /// Category code (1 = residential)
    #[serde(default = "default_code")]
    pub category: String,

    /// Lower price bound of the initial query
    #[serde(rename = "min-price", default)]
    pub min_price: Option<u64>,

    /// Upper price bound, fixed for the whole crawl
    #[serde(rename = "max-price", default)]
    pub max_price: Option<u64>,

    #[serde(default = "default_language")]
    pub language: String,
}

/// Page fetcher behaviour
#[derive(Debug, Clone, Deserialize)]
pub struct FetcherConfig {
    /// Attempts per page before it is reported as failed
    #[serde(rename = "max-attempts", default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    #[serde(rename = "retry-delay-ms", default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "request-timeout-secs", default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    #[serde(rename = "user-agent", default = "default_user_agent")]
    pub user_agent: String,
}

/// Batch and crawl-level limits
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of pages the API serves for a single query
    #[serde(rename = "page-ceiling", default = "default_page_ceiling")]
    pub page_ceiling: u32,

    /// Maximum number of in-flight page requests within a batch
    #[serde(rename = "max-concurrent-requests", default = "default_max_concurrent")]
    pub max_concurrent_requests: u32,

    /// Wall-clock budget for the whole crawl (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Output configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutputConfig {
    /// Path to write the final listing set as JSON
    #[serde(rename = "listings-path", default)]
    pub listings_path: Option<String>,

    /// Path to the markdown summary file
    #[serde(rename = "summary-path", default)]
    pub summary_path: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_ms: default_retry_delay_ms(),
            request_timeout_secs: default_request_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            page_ceiling: default_page_ceiling(),
            max_concurrent_requests: default_max_concurrent(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_nation() -> String {
    "IT".to_string()
}

fn default_code() -> String {
    "1".to_string()
}

fn default_language() -> String {
    "it".to_string()
}

fn default_max_attempts() -> u32 {
    3
}

fn default_retry_delay_ms() -> u64 {
    2000
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

fn default_page_ceiling() -> u32 {
    80
}

fn default_max_concurrent() -> u32 {
    10
}

fn default_timeout_secs() -> u64 {
    120
}
