use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration from TOML text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Logged at startup so runs made with different settings can be told apart.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_config() {
        let config_content = r#"
[search]
endpoint = "https://www.immobiliare.it/api-next/search-list/listings"
region = "lom"
province = "MI"
municipality = "8042"
min-price = 50000
max-price = 500000

[fetcher]
max-attempts = 5
retry-delay-ms = 500

[crawler]
page-ceiling = 40
max-concurrent-requests = 4
timeout-secs = 60

[output]
listings-path = "./listings.json"
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.search.region, "lom");
        assert_eq!(config.search.province.as_deref(), Some("MI"));
        assert_eq!(config.search.min_price, Some(50000));
        assert_eq!(config.search.max_price, Some(500000));
        assert_eq!(config.fetcher.max_attempts, 5);
        assert_eq!(config.fetcher.retry_delay_ms, 500);
        assert_eq!(config.crawler.page_ceiling, 40);
        assert_eq!(config.crawler.max_concurrent_requests, 4);
        assert_eq!(config.output.listings_path.as_deref(), Some("./listings.json"));
        assert!(config.output.summary_path.is_none());
    }

    #[test]
    fn test_defaults_applied() {
        let config = parse_config(
            r#"
[search]
endpoint = "https://api.example.com/search"
region = "lom"
"#,
        )
        .unwrap();

        assert_eq!(config.search.nation, "IT");
        assert_eq!(config.search.contract, "1");
        assert_eq!(config.search.category, "1");
        assert_eq!(config.search.language, "it");
        assert!(config.search.min_price.is_none());
        assert_eq!(config.fetcher.max_attempts, 3);
        assert_eq!(config.fetcher.retry_delay_ms, 2000);
        assert!(config.fetcher.user_agent.starts_with("Mozilla/5.0"));
        assert_eq!(config.crawler.page_ceiling, 80);
        assert_eq!(config.crawler.max_concurrent_requests, 10);
        assert_eq!(config.crawler.timeout_secs, 120);
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/sweep.toml"));
        assert!(matches!(result, Err(ConfigError::Io(_))));
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let config_content = r#"
[search]
endpoint = "https://api.example.com/search"
region = "lom"

[crawler]
max-concurrent-requests = 0
"#;

        let file = create_temp_config(config_content);
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);

        let other = create_temp_config("other content");
        assert_ne!(hash1, compute_config_hash(other.path()).unwrap());
    }
}
