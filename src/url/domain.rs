use url::Url;

/// Extracts the domain from a URL
///
/// This function retrieves the host portion of a URL and converts it to lowercase.
///
/// # Examples
///
/// ```
/// use url::Url;
/// use jobtrawl::url::extract_domain;
///
/// let url = Url::parse("https://WWW.ZHIPIN.COM/job_detail/abc.html").unwrap();
/// assert_eq!(extract_domain(&url), Some("www.zhipin.com".to_string()));
/// ```
pub fn extract_domain(url: &Url) -> Option<String> {
    url.host_str().map(|h| h.to_lowercase())
}

/// Checks whether `host` belongs to the same site as `domain`
///
/// A leading `www.` is ignored on both sides; otherwise the host must equal
/// the domain or be one of its subdomains.
///
/// # Examples
///
/// ```
/// use jobtrawl::url::is_same_site;
///
/// assert!(is_same_site("www.zhipin.com", "www.zhipin.com"));
/// assert!(is_same_site("zhipin.com", "www.zhipin.com"));
/// assert!(is_same_site("m.zhipin.com", "www.zhipin.com"));
/// assert!(!is_same_site("notzhipin.com", "www.zhipin.com"));
/// ```
pub fn is_same_site(host: &str, domain: &str) -> bool {
    let host = host.to_lowercase();
    let domain = domain.to_lowercase();
    let host = host.strip_prefix("www.").unwrap_or(&host);
    let base = domain.strip_prefix("www.").unwrap_or(&domain);

    if base.is_empty() {
        return false;
    }

    host == base || host.ends_with(&format!(".{}", base))
}

/// Checks whether `host` is exactly the crawl target's host
///
/// Only ASCII case is ignored; `www.` prefixes and subdomains count as
/// different hosts.
///
/// # Examples
///
/// ```
/// use jobtrawl::url::is_same_host;
///
/// assert!(is_same_host("WWW.zhipin.com", "www.zhipin.com"));
/// assert!(!is_same_host("m.zhipin.com", "www.zhipin.com"));
/// assert!(!is_same_host("zhipin.com", "www.zhipin.com"));
/// ```
pub fn is_same_host(host: &str, domain: &str) -> bool {
    !domain.is_empty() && host.eq_ignore_ascii_case(domain)
}
