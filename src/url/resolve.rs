use crate::{UrlError, UrlResult};
use url::Url;

/// Parses an absolute http(s) URL with a host
///
/// # Examples
///
/// ```
/// use jobtrawl::url::parse_http_url;
///
/// assert!(parse_http_url("https://www.zhipin.com/web/geek/job").is_ok());
/// assert!(parse_http_url("ftp://www.zhipin.com/").is_err());
/// assert!(parse_http_url("/web/geek/job").is_err());
/// ```
pub fn parse_http_url(raw: &str) -> UrlResult<Url> {
    let url = Url::parse(raw.trim()).map_err(|e| UrlError::Parse(e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::InvalidScheme(url.scheme().to_string()));
    }

    if url.host_str().is_none() {
        return Err(UrlError::MissingDomain);
    }

    Ok(url)
}

/// Resolves a link href against the page URL
///
/// Returns None if the link should be excluded:
/// - empty or fragment-only hrefs
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
///
/// The fragment of the resolved URL is dropped.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use jobtrawl::url::resolve_link;
///
/// let base = Url::parse("https://www.zhipin.com/web/geek/job?query=Java").unwrap();
/// let url = resolve_link("/job_detail/abc123.html#top", &base).unwrap();
/// assert_eq!(url.as_str(), "https://www.zhipin.com/job_detail/abc123.html");
/// ```
pub fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    let lower = href.to_ascii_lowercase();
    if lower.starts_with("javascript:")
        || lower.starts_with("mailto:")
        || lower.starts_with("tel:")
        || lower.starts_with("data:")
    {
        return None;
    }

    let mut absolute = base_url.join(href).ok()?;
    if absolute.scheme() != "http" && absolute.scheme() != "https" {
        return None;
    }
    if absolute.host_str().is_none() {
        return None;
    }

    absolute.set_fragment(None);
    Some(absolute)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_url() -> Url {
        Url::parse("https://www.zhipin.com/web/geek/job?query=Java&city=101270100").unwrap()
    }

    #[test]
    fn test_resolve_absolute() {
        let url = resolve_link("https://other.com/page", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://other.com/page");
    }

    #[test]
    fn test_resolve_root_relative() {
        let url = resolve_link("/job_detail/abc.html", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://www.zhipin.com/job_detail/abc.html");
    }

    #[test]
    fn test_resolve_path_relative() {
        let url = resolve_link("other", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://www.zhipin.com/web/geek/other");
    }

    #[test]
    fn test_resolve_protocol_relative() {
        let url = resolve_link("//m.zhipin.com/job_detail/x.html", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://m.zhipin.com/job_detail/x.html");
    }

    #[test]
    fn test_skip_special_schemes() {
        assert!(resolve_link("javascript:void(0)", &base_url()).is_none());
        assert!(resolve_link("JavaScript:void(0)", &base_url()).is_none());
        assert!(resolve_link("mailto:hr@example.com", &base_url()).is_none());
        assert!(resolve_link("tel:+861234", &base_url()).is_none());
        assert!(resolve_link("data:text/html,<h1>x</h1>", &base_url()).is_none());
    }

    #[test]
    fn test_skip_empty_and_fragment() {
        assert!(resolve_link("", &base_url()).is_none());
        assert!(resolve_link("   ", &base_url()).is_none());
        assert!(resolve_link("#section", &base_url()).is_none());
    }

    #[test]
    fn test_parse_http_url_errors() {
        assert!(matches!(parse_http_url("not a url"), Err(UrlError::Parse(_))));
        assert!(matches!(
            parse_http_url("mailto:hr@zhipin.com"),
            Err(UrlError::InvalidScheme(_))
        ));
        assert!(parse_http_url("  https://www.zhipin.com/  ").is_ok());
    }

    #[test]
    fn test_fragment_dropped() {
        let url = resolve_link("/job_detail/abc.html?ka=1#x", &base_url()).unwrap();
        assert_eq!(url.as_str(), "https://www.zhipin.com/job_detail/abc.html?ka=1");
    }
}
