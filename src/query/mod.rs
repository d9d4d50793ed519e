//! Search query model
//!
//! A [`Query`] is an immutable search description: fixed filters, a price
//! lower bound that the partitioner advances between batches, and a fixed
//! upper bound. Page numbers are supplied per request.

mod params;

use crate::config::SearchConfig;
use crate::ConfigError;
use url::Url;

/// Filters that stay fixed for the whole crawl
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchFilters {
    pub region: String,
    pub province: Option<String>,
    pub municipality: Option<String>,
    pub nation: String,
    pub contract: String,
    pub category: String,
    pub language: String,
}

/// An immutable search description sent to the upstream API
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    endpoint: Url,
    filters: SearchFilters,
    min_price: Option<u64>,
    max_price: Option<u64>,
}

impl Query {
    /// Creates a query against `endpoint` with the given filters and price range
    pub fn new(
        endpoint: Url,
        filters: SearchFilters,
        min_price: Option<u64>,
        max_price: Option<u64>,
    ) -> Self {
        Self {
            endpoint,
            filters,
            min_price,
            max_price,
        }
    }

    /// Builds the initial query from the `[search]` configuration section
    pub fn from_config(config: &SearchConfig) -> Result<Self, ConfigError> {
        let endpoint = Url::parse(&config.endpoint)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid endpoint: {}", e)))?;

        let filters = SearchFilters {
            region: config.region.clone(),
            province: config.province.clone(),
            municipality: config.municipality.clone(),
            nation: config.nation.clone(),
            contract: config.contract.clone(),
            category: config.category.clone(),
            language: config.language.clone(),
        };

        Ok(Self::new(
            endpoint,
            filters,
            config.min_price,
            config.max_price,
        ))
    }

    /// Returns a copy of this query with a different price lower bound
    pub fn with_min_price(&self, min_price: u64) -> Self {
        Self {
            min_price: Some(min_price),
            ..self.clone()
        }
    }

    /// The price lower bound, `None` when the range is open below
    pub fn min_price(&self) -> Option<u64> {
        self.min_price
    }

    /// The fixed price upper bound, `None` when the range is open above
    pub fn max_price(&self) -> Option<u64> {
        self.max_price
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Full request URL for `page` of this query (results sorted by ascending price)
    pub fn page_url(&self, page: u32) -> Url {
        params::encode(self, page)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample_query() -> Query {
        Query::new(
            Url::parse("https://api.example.com/search-list/listings").unwrap(),
            SearchFilters {
                region: "lom".to_string(),
                province: Some("MI".to_string()),
                municipality: None,
                nation: "IT".to_string(),
                contract: "1".to_string(),
                category: "1".to_string(),
                language: "it".to_string(),
            },
            None,
            Some(500_000),
        )
    }

    #[test]
    fn test_with_min_price_keeps_everything_else() {
        let query = sample_query();
        let next = query.with_min_price(120_001);

        assert_eq!(next.min_price(), Some(120_001));
        assert_eq!(next.max_price(), query.max_price());
        assert_eq!(next.filters(), query.filters());
        assert_eq!(next.endpoint(), query.endpoint());
        assert_eq!(query.min_price(), None);
    }

    #[test]
    fn test_from_config_rejects_bad_endpoint() {
        let config = SearchConfig {
            endpoint: "::nope".to_string(),
            region: "lom".to_string(),
            province: None,
            municipality: None,
            nation: "IT".to_string(),
            contract: "1".to_string(),
            category: "1".to_string(),
            min_price: None,
            max_price: None,
            language: "it".to_string(),
        };

        assert!(matches!(
            Query::from_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }
}
