//! Per-run crawl parameters
//!
//! A `CrawlConfiguration` is built once per `initialize` call and never
//! mutated afterwards; the next run gets a fresh value.

use crate::config::types::Config;
use crate::url::{extract_domain, parse_http_url as parse_absolute_url};
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Immutable parameters of one crawl run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlConfiguration {
    start_url: Url,
    listing_url: Url,
    query: String,
    city_code: String,
    domain: String,
    max_pages: u32,
}

impl CrawlConfiguration {
    /// Builds the run parameters, deriving the target domain from `start_url`
    ///
    /// # Arguments
    ///
    /// * `start_url` - First URL of the run (usually page 1 of the listing)
    /// * `listing_url` - Listing endpoint used to compose pagination URLs
    /// * `query` - Search query, may be blank
    /// * `city_code` - City/region code of the target site
    /// * `max_pages` - Page budget, must be at least 1
    pub fn new(
        start_url: &str,
        listing_url: &str,
        query: &str,
        city_code: &str,
        max_pages: u32,
    ) -> ConfigResult<Self> {
        let start = parse_http_url(start_url, "start URL")?;
        let listing = parse_http_url(listing_url, "listing URL")?;

        let domain = extract_domain(&start).ok_or_else(|| {
            ConfigError::InvalidUrl(format!("start URL '{}' has no host", start_url))
        })?;

        if max_pages < 1 {
            return Err(ConfigError::Validation(format!(
                "max_pages must be >= 1, got {}",
                max_pages
            )));
        }

        Ok(Self {
            start_url: start,
            listing_url: listing,
            query: query.trim().to_string(),
            city_code: city_code.trim().to_string(),
            domain,
            max_pages,
        })
    }

    /// Builds the run parameters from a loaded configuration file
    ///
    /// When `site.start-url` is absent the first listing page is used.
    pub fn from_config(config: &Config) -> ConfigResult<Self> {
        let listing = parse_http_url(&config.site.listing_url, "listing URL")?;
        let start = match &config.site.start_url {
            Some(start) => start.clone(),
            None => compose_listing_url(
                &listing,
                &config.crawler.query,
                &config.crawler.city_code,
                None,
            )
            .to_string(),
        };

        Self::new(
            &start,
            listing.as_str(),
            &config.crawler.query,
            &config.crawler.city_code,
            config.crawler.max_pages,
        )
    }

    pub fn start_url(&self) -> &Url {
        &self.start_url
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn city_code(&self) -> &str {
        &self.city_code
    }

    /// Host of the start URL; links outside it are not followed
    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn max_pages(&self) -> u32 {
        self.max_pages
    }

    /// URL of listing page `page` for this run's query and city
    pub fn listing_page_url(&self, page: u32) -> Url {
        compose_listing_url(&self.listing_url, &self.query, &self.city_code, Some(page))
    }
}

/// Composes `listing?query=<query>&city=<city>[&page=<n>]`
fn compose_listing_url(listing: &Url, query: &str, city: &str, page: Option<u32>) -> Url {
    let mut url = listing.clone();
    url.set_fragment(None);
    {
        let mut pairs = url.query_pairs_mut();
        pairs.clear();
        pairs.append_pair("query", query.trim());
        pairs.append_pair("city", city.trim());
        if let Some(page) = page {
            pairs.append_pair("page", &page.to_string());
        }
    }
    url
}

fn parse_http_url(raw: &str, what: &str) -> ConfigResult<Url> {
    parse_absolute_url(raw)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid {} '{}': {}", what, raw, e)))
}
