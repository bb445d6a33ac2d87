//! Detail page field extraction
//!
//! Each field is filled by an ordered chain of strategies; the first one
//! that yields a non-empty value wins. Chains start with site-known
//! selectors, then search inside the primary content region, and for the
//! title and company fields finish with a broad heuristic scan.

use scraper::{ElementRef, Html, Selector};

/// Candidate job posting extracted from a detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedJobRecord {
    pub url: String,
    pub title: Option<String>,
    pub salary: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub degree: Option<String>,
    pub company: Option<String>,
    /// Recruiter activity text, e.g. "刚刚活跃"
    pub hr_active: Option<String>,
}

impl ExtractedJobRecord {
    /// A record is complete when it has a non-empty title
    pub fn is_complete(&self) -> bool {
        self.title.as_deref().is_some_and(|t| !t.trim().is_empty())
    }
}

/// A detail page being extracted, with fields resolved so far
struct DetailPage<'a> {
    document: &'a Html,
    title: Option<&'a str>,
}

type FieldStrategy = fn(&DetailPage<'_>) -> Option<String>;

const TITLE_STRATEGIES: &[FieldStrategy] =
    &[title_from_site, title_from_primary_region, title_from_headings];
const SALARY_STRATEGIES: &[FieldStrategy] = &[salary_from_site, salary_from_primary_region];
const ADDRESS_STRATEGIES: &[FieldStrategy] = &[address_from_site, address_from_primary_region];
const DESCRIPTION_STRATEGIES: &[FieldStrategy] = &[description_from_site, description_merged];
const EXPERIENCE_STRATEGIES: &[FieldStrategy] = &[experience_from_site, experience_from_tags];
const DEGREE_STRATEGIES: &[FieldStrategy] = &[degree_from_site, degree_from_tags];
const COMPANY_STRATEGIES: &[FieldStrategy] = &[
    company_from_site,
    company_from_links,
    company_from_primary_region,
];
const HR_ACTIVE_STRATEGIES: &[FieldStrategy] = &[hr_active_from_site];

const PRIMARY_REGION: &str = ".job-primary, .job-primary-box, .job-banner, .job-detail-header";

/// Tokens that mark salary text rather than a heading
const SALARY_TOKENS: &[&str] = &["K-", "k-", "万", "薪"];

/// Prompts that show the page was served to a logged-out visitor
const LOGIN_TOKENS: &[&str] = &["点击登录", "登录", "login", "Login"];

/// Extracts all fields of a detail page
///
/// The returned record may be incomplete; callers check
/// [`ExtractedJobRecord::is_complete`] before passing it on.
pub fn extract_job(document: &Html, url: &str) -> ExtractedJobRecord {
    let mut page = DetailPage {
        document,
        title: None,
    };

    let title = first_match(&page, TITLE_STRATEGIES);
    if title.is_none() && page_mentions_login(document) {
        tracing::warn!("No title on {}; the page probably requires login", url);
    }
    page.title = title.as_deref();

    ExtractedJobRecord {
        url: url.to_string(),
        salary: first_match(&page, SALARY_STRATEGIES),
        address: first_match(&page, ADDRESS_STRATEGIES),
        description: first_match(&page, DESCRIPTION_STRATEGIES),
        experience: first_match(&page, EXPERIENCE_STRATEGIES),
        degree: first_match(&page, DEGREE_STRATEGIES),
        company: first_match(&page, COMPANY_STRATEGIES),
        hr_active: first_match(&page, HR_ACTIVE_STRATEGIES),
        title,
    }
}

fn first_match(page: &DetailPage<'_>, strategies: &[FieldStrategy]) -> Option<String> {
    strategies
        .iter()
        .find_map(|strategy| strategy(page).filter(|value| !value.is_empty()))
}

/// Element text with whitespace runs collapsed to single spaces
fn text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

fn parse(css: &str) -> Option<Selector> {
    match Selector::parse(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            tracing::debug!("Invalid selector {}: {}", css, e);
            None
        }
    }
}

/// Texts of all elements matching `css`, in document order, empty ones skipped
fn texts<'a>(root: impl Iterator<Item = ElementRef<'a>>, css: &str) -> Vec<String> {
    let Some(selector) = parse(css) else {
        return Vec::new();
    };
    root.flat_map(|element| element.select(&selector).map(text).collect::<Vec<_>>())
        .filter(|t| !t.is_empty())
        .collect()
}

/// Tries each selector in turn and returns the first non-empty text
fn select_first(document: &Html, selectors: &[&str]) -> Option<String> {
    selectors
        .iter()
        .find_map(|css| texts(std::iter::once(document.root_element()), css).into_iter().next())
}

/// Root elements of the primary content region
fn primary_region(document: &Html) -> Vec<ElementRef<'_>> {
    match parse(PRIMARY_REGION) {
        Some(selector) => document.select(&selector).collect(),
        None => Vec::new(),
    }
}

fn contains_any(text: &str, tokens: &[&str]) -> bool {
    tokens.iter().any(|token| text.contains(token))
}

fn page_mentions_login(document: &Html) -> bool {
    let body = text(document.root_element());
    contains_any(&body, LOGIN_TOKENS)
}

// ===== Title =====

fn title_from_site(page: &DetailPage<'_>) -> Option<String> {
    select_first(
        page.document,
        &[
            "div.name h1",
            ".job-name h1",
            "h1.job-name",
            ".job-detail-header h1",
            ".job-header h1",
            "h1.name",
            ".name-box h1",
            ".job-primary .name h1",
            "[class*=job-name] h1",
            ".job-title",
            "[class*=job-title]",
            "h1",
        ],
    )
}

fn title_from_primary_region(page: &DetailPage<'_>) -> Option<String> {
    texts(
        primary_region(page.document).into_iter(),
        "h1, .name, [class*=name]",
    )
    .into_iter()
    .find(|t| t.chars().count() < 100 && !contains_any(t, SALARY_TOKENS))
}

fn title_from_headings(page: &DetailPage<'_>) -> Option<String> {
    texts(
        std::iter::once(page.document.root_element()),
        "h1, h2.title, h2, [class*=title]:not([class*=salary])",
    )
    .into_iter()
    .find(|t| plausible_title(t))
}

/// Length window 3..100 and none of the salary, label, login or
/// call-to-action tokens
fn plausible_title(text: &str) -> bool {
    let len = text.chars().count();
    (3..100).contains(&len)
        && !contains_any(text, SALARY_TOKENS)
        && !contains_any(text, &["经验", "学历", "立即"])
        && !contains_any(text, LOGIN_TOKENS)
}

// ===== Salary / address =====

fn salary_from_site(page: &DetailPage<'_>) -> Option<String> {
    select_first(
        page.document,
        &[
            "div.name span.salary",
            ".job-primary span.salary",
            "span.salary-text",
            ".salary",
        ],
    )
}

fn salary_from_primary_region(page: &DetailPage<'_>) -> Option<String> {
    texts(primary_region(page.document).into_iter(), "[class*=salary]")
        .into_iter()
        .next()
}

fn address_from_site(page: &DetailPage<'_>) -> Option<String> {
    select_first(
        page.document,
        &[
            "div.location-address",
            ".location-address",
            ".job-location",
            "[class*=location]",
        ],
    )
}

fn address_from_primary_region(page: &DetailPage<'_>) -> Option<String> {
    texts(
        primary_region(page.document).into_iter(),
        "[class*=address], [class*=city], .text-city",
    )
    .into_iter()
    .next()
}

// ===== Description =====

fn description_from_site(page: &DetailPage<'_>) -> Option<String> {
    select_first(
        page.document,
        &[
            "div.job-sec-text",
            ".job-sec-text",
            ".job-detail-content",
            ".job-detail-text",
            ".job-description",
            ".description",
        ],
    )
}

/// Joins every description-like block longer than 10 characters
fn description_merged(page: &DetailPage<'_>) -> Option<String> {
    let blocks: Vec<String> = texts(
        std::iter::once(page.document.root_element()),
        ".job-sec, [class*=job-sec], [class*=job-detail], [class*=description]",
    )
    .into_iter()
    .filter(|t| t.chars().count() > 10)
    .collect();

    if blocks.is_empty() {
        None
    } else {
        Some(blocks.join("\n"))
    }
}

// ===== Experience / degree =====

const TAG_REGION: &[&str] = &[".job-primary-info span", ".job-detail-header .text", ".job-tags span"];

fn scan_tags(page: &DetailPage<'_>, tokens: &[&str]) -> Option<String> {
    TAG_REGION.iter().find_map(|css| {
        texts(std::iter::once(page.document.root_element()), css)
            .into_iter()
            .find(|t| contains_any(t, tokens))
    })
}

fn experience_from_site(page: &DetailPage<'_>) -> Option<String> {
    select_first(
        page.document,
        &["p.text-experience", ".text-experience", "[class*=experience]"],
    )
}

fn experience_from_tags(page: &DetailPage<'_>) -> Option<String> {
    scan_tags(page, &["经验", "年", "应届"])
}

fn degree_from_site(page: &DetailPage<'_>) -> Option<String> {
    select_first(page.document, &["p.text-degree", ".text-degree", "[class*=degree]"])
}

fn degree_from_tags(page: &DetailPage<'_>) -> Option<String> {
    scan_tags(page, &["学历", "大专", "本科", "硕士", "博士"])
}

// ===== Company =====

fn company_from_site(page: &DetailPage<'_>) -> Option<String> {
    [
        "a.company-name",
        ".company-name",
        ".company-info a",
        ".company-info .name",
        ".job-header .company-name",
        ".job-detail-header .company-name",
        "div.company-name",
        "h2.company-name",
        "[class*=company-name]",
        "[class*=company][class*=name]",
        ".job-primary .name-info .name",
        ".job-primary-info .name",
        ".company-box .name",
        ".company-wrapper .name",
        ".info-company a",
    ]
    .iter()
    .find_map(|css| {
        texts(std::iter::once(page.document.root_element()), css)
            .into_iter()
            .find(|t| t != "公司")
    })
}

fn company_from_links(page: &DetailPage<'_>) -> Option<String> {
    texts(
        std::iter::once(page.document.root_element()),
        "a[href*='/company/'], a[href*='company']",
    )
    .into_iter()
    .find(|t| t.chars().count() < 50 && t != "公司")
}

fn company_from_primary_region(page: &DetailPage<'_>) -> Option<String> {
    texts(
        primary_region(page.document).into_iter(),
        ".name, h2, h3, [class*=name]",
    )
    .into_iter()
    .find(|t| {
        Some(t.as_str()) != page.title
            && t.chars().count() < 50
            && t != "公司"
            && !contains_any(t, SALARY_TOKENS)
    })
}

// ===== Recruiter =====

fn hr_active_from_site(page: &DetailPage<'_>) -> Option<String> {
    select_first(
        page.document,
        &["h2.name span", ".hr-info span", ".hr-active-time", "[class*=active]"],
    )
}
