//! URL handling module for Jobtrawl
//!
//! This module provides link resolution, same-site matching and the page
//! classifier that tells listing pages from job detail pages.

mod domain;
mod resolve;

use crate::state::PageKind;
use url::Url;

// Re-export main functions
pub use domain::{extract_domain, is_same_host, is_same_site};
pub use resolve::{parse_http_url, resolve_link};

/// Classifies a page by the shape of its URL
///
/// A URL is a detail page if and only if its path contains the site's
/// detail marker segment; every other URL is a listing page. No network or
/// DOM access is involved.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use jobtrawl::state::PageKind;
/// use jobtrawl::url::classify_page;
///
/// let detail = Url::parse("https://www.zhipin.com/job_detail/a1b2c3d4e5.html").unwrap();
/// assert_eq!(classify_page(&detail, "/job_detail/"), PageKind::Detail);
///
/// let listing = Url::parse("https://www.zhipin.com/web/geek/job?query=Java").unwrap();
/// assert_eq!(classify_page(&listing, "/job_detail/"), PageKind::Listing);
/// ```
pub fn classify_page(url: &Url, detail_marker: &str) -> PageKind {
    if !detail_marker.is_empty() && url.path().contains(detail_marker) {
        PageKind::Detail
    } else {
        PageKind::Listing
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MARKER: &str = "/job_detail/";

    fn classify(raw: &str) -> PageKind {
        classify_page(&Url::parse(raw).unwrap(), MARKER)
    }

    #[test]
    fn test_detail_page() {
        assert_eq!(
            classify("https://www.zhipin.com/job_detail/0f5e2b3c4d1a.html?ka=search_list_1"),
            PageKind::Detail
        );
    }

    #[test]
    fn test_listing_page() {
        assert_eq!(
            classify("https://www.zhipin.com/web/geek/job?query=Java&city=101270100&page=2"),
            PageKind::Listing
        );
    }

    #[test]
    fn test_marker_in_query_is_not_detail() {
        assert_eq!(
            classify("https://www.zhipin.com/web/geek/job?next=/job_detail/abc.html"),
            PageKind::Listing
        );
    }

    #[test]
    fn test_marker_without_trailing_slash_is_not_detail() {
        assert_eq!(classify("https://www.zhipin.com/job_detail"), PageKind::Listing);
    }

    #[test]
    fn test_empty_marker_never_detail() {
        let url = Url::parse("https://www.zhipin.com/job_detail/abc.html").unwrap();
        assert_eq!(classify_page(&url, ""), PageKind::Listing);
    }
}
