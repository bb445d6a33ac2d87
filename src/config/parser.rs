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
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use jobtrawl::config::load_config;
///
/// let config = load_config(Path::new("jobtrawl.toml")).unwrap();
/// println!("Max pages: {}", config.crawler.max_pages);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parses and validates configuration text
pub fn parse_config(content: &str) -> Result<Config, ConfigError> {
    let config: Config = toml::from_str(content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// The hash is recorded with every crawl run so runs can be traced back to
/// the configuration that produced them.
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
    use crate::config::{CrawlConfiguration, RendererBackend};
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    const MINIMAL: &str = r#"
[crawler]
query = "Java"
city-code = "101270100"
max-pages = 40

[output]
database-path = "./test.db"
export-path = "./results.csv"
"#;

    #[test]
    fn test_load_minimal_config_applies_defaults() {
        let file = create_temp_config(MINIMAL);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.query, "Java");
        assert_eq!(config.crawler.max_pages, 40);
        assert_eq!(config.crawler.fetch_delay_ms, 2000);
        assert_eq!(config.site.detail_marker, "/job_detail/");
        assert_eq!(config.site.min_detail_url_length, 40);
        assert_eq!(config.renderer.backend, RendererBackend::Webdriver);
        assert_eq!(config.renderer.scroll_steps, 2);
        assert!(!config.renderer.user_agents.is_empty());
        assert!(config.auto_start.enabled);
    }

    #[test]
    fn test_load_full_config() {
        let content = r#"
[crawler]
query = "rust, go"
city-code = "101300600"
max-pages = 5
fetch-delay-ms = 0

[site]
start-url = "http://127.0.0.1:9000/jobs?query=rust&city=1"
listing-url = "http://127.0.0.1:9000/jobs"
detail-marker = "/job_detail/"

[renderer]
backend = "http"
ready-timeout-ms = 5000
user-agents = ["TestAgent/1.0"]

[output]
database-path = "./test.db"
export-path = "./results.csv"

[auto-start]
enabled = false
"#;
        let file = create_temp_config(content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.crawler.fetch_delay_ms, 0);
        assert_eq!(config.renderer.backend, RendererBackend::Http);
        assert_eq!(config.renderer.user_agents, vec!["TestAgent/1.0".to_string()]);
        assert!(!config.auto_start.enabled);

        let run = CrawlConfiguration::from_config(&config).unwrap();
        assert_eq!(run.domain(), "127.0.0.1");
        assert_eq!(run.start_url().as_str(), "http://127.0.0.1:9000/jobs?query=rust&city=1");
    }

    #[test]
    fn test_start_url_derived_from_listing() {
        let config = parse_config(MINIMAL).unwrap();
        let run = CrawlConfiguration::from_config(&config).unwrap();
        assert_eq!(
            run.start_url().as_str(),
            "https://www.zhipin.com/web/geek/job?query=Java&city=101270100"
        );
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/jobtrawl.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let content = r#"
[crawler]
query = "Java"
city-code = "101270100"
max-pages = 0

[output]
database-path = "./test.db"
export-path = "./results.csv"
"#;
        let file = create_temp_config(content);
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
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }
}
