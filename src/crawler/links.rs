//! Detail link discovery
//!
//! This module handles extracting job detail links from rendered markup:
//! - An ordered cascade of selector strategies over listing pages, from
//!   site-known job-card patterns down to any link carrying the detail
//!   marker
//! - A broad same-site scan used as a supplementary, lower-priority source
//! - Validation of candidate detail URLs

use crate::config::SiteConfig;
use crate::crawler::frontier::Frontier;
use crate::url::{is_same_host, is_same_site, resolve_link};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Shape rules a detail URL must satisfy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailLinkRules {
    /// Path segment that marks a detail page, e.g. `/job_detail/`
    pub marker: String,
    /// The full URL must be longer than this
    pub min_url_length: usize,
    /// The identifier after the marker must be longer than this
    pub min_id_length: usize,
}

impl DetailLinkRules {
    pub fn from_site(site: &SiteConfig) -> Self {
        Self {
            marker: site.detail_marker.clone(),
            min_url_length: site.min_detail_url_length,
            min_id_length: site.min_detail_id_length,
        }
    }

    /// Checks that `url` points at a single job posting
    ///
    /// The path must contain the marker followed by a non-trivial
    /// identifier: either an `.html` page name or a plain alphanumeric id.
    /// Bare `/job_detail/` paths and query-only variants are rejected.
    pub fn is_valid_detail_url(&self, url: &Url) -> bool {
        if self.marker.is_empty() || url.as_str().len() <= self.min_url_length {
            return false;
        }

        let path = url.path();
        let Some(pos) = path.find(&self.marker) else {
            return false;
        };

        let id = &path[pos + self.marker.len()..];
        if id.chars().count() <= self.min_id_length {
            return false;
        }

        id.contains(".html") || id.chars().all(|c| c.is_ascii_alphanumeric())
    }
}

impl Default for DetailLinkRules {
    fn default() -> Self {
        Self::from_site(&SiteConfig::default())
    }
}

/// Result of one link extraction pass
#[derive(Debug, Default)]
pub struct LinkHarvest {
    /// Accepted detail URLs in document order
    pub urls: Vec<Url>,
    /// Name of the strategy that produced `urls`
    pub strategy: Option<&'static str>,
    /// Candidates dropped by validation
    pub rejected: usize,
}

/// Which hosts a pass accepts links from
#[derive(Debug, Clone, Copy)]
enum HostScope<'a> {
    /// The target domain or any of its subdomains
    Site(&'a str),
    /// Exactly the target host
    Host(&'a str),
}

impl HostScope<'_> {
    fn admits(&self, url: &Url) -> bool {
        let Some(host) = url.host_str() else {
            return false;
        };
        match *self {
            Self::Site(domain) => is_same_site(host, domain),
            Self::Host(domain) => is_same_host(host, domain),
        }
    }
}

/// Extracts detail links from listing markup
pub struct LinkExtractor {
    rules: DetailLinkRules,
    strategies: Vec<(&'static str, Selector)>,
    any_link: Option<Selector>,
}

impl LinkExtractor {
    /// Builds the selector cascade for the configured detail marker
    pub fn new(rules: DetailLinkRules) -> Self {
        let marker = rules.marker.as_str();
        let loose = marker.trim_matches('/');

        let containers = [
            ".job-list-box",
            ".job-card-wrapper",
            ".job-list",
            ".job-primary-wrapper",
            ".job-card",
            "[class*=job-card]",
            "[class*=job-item]",
        ]
        .iter()
        .map(|container| format!("{} a[href*='{}']", container, marker))
        .collect::<Vec<_>>()
        .join(", ");

        let candidates = [
            ("job-card", "a.job-card-left".to_string()),
            ("ka-job-list", "a[ka*='job_list']".to_string()),
            ("card-container", containers),
            ("marker-href", format!("a[href*='{}']", marker)),
            ("loose-marker-href", format!("a[href*='{}']", loose)),
        ];

        let strategies = candidates
            .into_iter()
            .filter_map(|(name, css)| match Selector::parse(&css) {
                Ok(selector) => Some((name, selector)),
                Err(e) => {
                    tracing::warn!("Skipping link strategy {} ({}): {}", name, css, e);
                    None
                }
            })
            .collect();

        Self {
            rules,
            strategies,
            any_link: Selector::parse("a[href]").ok(),
        }
    }

    pub fn rules(&self) -> &DetailLinkRules {
        &self.rules
    }

    /// Runs the strategy cascade over a listing page
    ///
    /// Strategies are tried in order and the first one that yields at least
    /// one valid, unvisited URL on the target site wins; later strategies
    /// are not consulted.
    pub fn extract_detail_links(
        &self,
        document: &Html,
        base_url: &Url,
        domain: &str,
        frontier: &Frontier,
    ) -> LinkHarvest {
        let mut rejected = 0;

        for (name, selector) in &self.strategies {
            let hrefs = document
                .select(selector)
                .filter_map(|element| element.value().attr("href"));
            let (urls, dropped) = self.accept(hrefs, base_url, frontier, HostScope::Site(domain));
            rejected += dropped;

            if !urls.is_empty() {
                tracing::debug!("Link strategy {} found {} detail URLs", name, urls.len());
                return LinkHarvest {
                    urls,
                    strategy: Some(name),
                    rejected,
                };
            }
        }

        tracing::debug!("No link strategy matched on {}", base_url);
        LinkHarvest {
            urls: Vec::new(),
            strategy: None,
            rejected,
        }
    }

    /// Scans every link on the page for detail URLs on the target host
    ///
    /// Links to other hosts, subdomains included, are skipped silently.
    pub fn scan_same_site(
        &self,
        document: &Html,
        base_url: &Url,
        domain: &str,
        frontier: &Frontier,
    ) -> LinkHarvest {
        let Some(selector) = &self.any_link else {
            return LinkHarvest::default();
        };

        let hrefs = document
            .select(selector)
            .filter_map(|element| element.value().attr("href"));
        let scope = HostScope::Host(domain);
        let hrefs = hrefs.filter(|href| {
            resolve_link(href, base_url).is_some_and(|url| {
                scope.admits(&url) && url.path().contains(&self.rules.marker)
            })
        });
        let (urls, rejected) = self.accept(hrefs, base_url, frontier, scope);

        LinkHarvest {
            urls,
            strategy: Some("same-site-scan"),
            rejected,
        }
    }

    /// Resolves and validates candidate hrefs, dropping duplicates
    fn accept<'a>(
        &self,
        hrefs: impl Iterator<Item = &'a str>,
        base_url: &Url,
        frontier: &Frontier,
        scope: HostScope<'_>,
    ) -> (Vec<Url>, usize) {
        let mut seen = HashSet::new();
        let mut urls = Vec::new();
        let mut rejected = 0;

        for href in hrefs {
            let Some(url) = resolve_link(href, base_url) else {
                tracing::debug!("Rejected unresolvable link: {}", href);
                rejected += 1;
                continue;
            };

            if !scope.admits(&url) {
                tracing::debug!("Rejected off-site link: {}", url);
                rejected += 1;
                continue;
            }

            if !self.rules.is_valid_detail_url(&url) {
                tracing::debug!("Rejected malformed detail link: {}", url);
                rejected += 1;
                continue;
            }

            if frontier.is_done(url.as_str()) {
                tracing::debug!("Rejected already visited link: {}", url);
                rejected += 1;
                continue;
            }

            if seen.insert(url.as_str().to_string()) {
                urls.push(url);
            }
        }

        (urls, rejected)
    }
}
