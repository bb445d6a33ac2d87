use crate::config::types::{
    Config, CrawlerConfig, OutputConfig, RendererBackend, RendererConfig, SiteConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_site_config(&config.site)?;
    validate_renderer_config(&config.renderer)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates search parameters and pacing
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.city_code.trim().is_empty() {
        return Err(ConfigError::Validation(
            "city_code cannot be empty".to_string(),
        ));
    }

    // fetch_delay_ms of 0 disables pacing and is allowed

    Ok(())
}

/// Validates the crawl target description
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    validate_http_url(&config.listing_url, "listing_url")?;

    if let Some(start_url) = &config.start_url {
        validate_http_url(start_url, "start_url")?;
    }

    if config.detail_marker.is_empty() || !config.detail_marker.starts_with('/') {
        return Err(ConfigError::Validation(format!(
            "detail_marker must be a non-empty path segment starting with '/', got '{}'",
            config.detail_marker
        )));
    }

    Ok(())
}

/// Validates renderer configuration
fn validate_renderer_config(config: &RendererConfig) -> Result<(), ConfigError> {
    if config.backend == RendererBackend::Webdriver {
        Url::parse(&config.webdriver_url)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid webdriver_url: {}", e)))?;
    }

    if config.ready_timeout_ms < 1000 {
        return Err(ConfigError::Validation(format!(
            "ready_timeout_ms must be >= 1000ms, got {}ms",
            config.ready_timeout_ms
        )));
    }

    if config.scroll_steps > 10 {
        return Err(ConfigError::Validation(format!(
            "scroll_steps must be <= 10, got {}",
            config.scroll_steps
        )));
    }

    if config.user_agents.iter().any(|ua| ua.trim().is_empty()) {
        return Err(ConfigError::Validation(
            "user_agents cannot contain empty entries".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }

    if config.export_path.is_empty() {
        return Err(ConfigError::Validation(
            "export_path cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Checks that `raw` is an absolute http(s) URL with a host
fn validate_http_url(raw: &str, field: &str) -> Result<(), ConfigError> {
    let url = Url::parse(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", field, raw, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "{} '{}' must use http or https",
            field, raw
        )));
    }

    if url.host_str().is_none() {
        return Err(ConfigError::InvalidUrl(format!(
            "{} '{}' has no host",
            field, raw
        )));
    }

    Ok(())
}
