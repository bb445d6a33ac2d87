use serde::Deserialize;

/// Main configuration structure for Jobtrawl
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub site: SiteConfig,
    #[serde(default)]
    pub renderer: RendererConfig,
    pub output: OutputConfig,
    #[serde(rename = "auto-start", default)]
    pub auto_start: AutoStartConfig,
}

/// Search parameters and pacing
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Free-text search query, may hold several keywords or be blank
    #[serde(default)]
    pub query: String,

    /// City/region code understood by the target site
    #[serde(rename = "city-code")]
    pub city_code: String,

    /// Maximum number of pages fetched in one run
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Delay between two fetches (milliseconds)
    #[serde(rename = "fetch-delay-ms", default = "default_fetch_delay_ms")]
    pub fetch_delay_ms: u64,
}

/// Shape of the crawl target
#[derive(Debug, Clone, Deserialize)]
pub struct SiteConfig {
    /// First URL of the run; derived from `listing_url` when absent
    #[serde(rename = "start-url", default)]
    pub start_url: Option<String>,

    /// Listing endpoint that accepts `query`, `city` and `page` parameters
    #[serde(rename = "listing-url", default = "default_listing_url")]
    pub listing_url: String,

    /// Path segment that identifies a job detail page
    #[serde(rename = "detail-marker", default = "default_detail_marker")]
    pub detail_marker: String,

    /// Detail URLs shorter than this are rejected as truncated
    #[serde(
        rename = "min-detail-url-length",
        default = "default_min_detail_url_length"
    )]
    pub min_detail_url_length: usize,

    /// The identifier after the detail marker must be longer than this
    #[serde(
        rename = "min-detail-id-length",
        default = "default_min_detail_id_length"
    )]
    pub min_detail_id_length: usize,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            start_url: None,
            listing_url: default_listing_url(),
            detail_marker: default_detail_marker(),
            min_detail_url_length: default_min_detail_url_length(),
            min_detail_id_length: default_min_detail_id_length(),
        }
    }
}

/// Which renderer backend drives page fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RendererBackend {
    /// Browser session through a WebDriver endpoint
    Webdriver,
    /// Plain HTTP GET, no script execution
    Http,
}

/// Renderer configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RendererConfig {
    #[serde(default = "default_backend")]
    pub backend: RendererBackend,

    /// WebDriver endpoint (chromedriver, selenium, ...)
    #[serde(rename = "webdriver-url", default = "default_webdriver_url")]
    pub webdriver_url: String,

    #[serde(default = "default_headless")]
    pub headless: bool,

    /// Upper bound on waiting for `document.readyState == "complete"` (milliseconds)
    #[serde(rename = "ready-timeout-ms", default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Pause after the ready signal and after every scroll (milliseconds)
    #[serde(rename = "settle-delay-ms", default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Number of scroll actions used to trigger lazy loading
    #[serde(rename = "scroll-steps", default = "default_scroll_steps")]
    pub scroll_steps: u32,

    /// User agent pool; one is picked at random per session
    #[serde(rename = "user-agents", default = "default_user_agents")]
    pub user_agents: Vec<String>,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            backend: default_backend(),
            webdriver_url: default_webdriver_url(),
            headless: default_headless(),
            ready_timeout_ms: default_ready_timeout_ms(),
            settle_delay_ms: default_settle_delay_ms(),
            scroll_steps: default_scroll_steps(),
            user_agents: default_user_agents(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path to the SQLite job database
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Path of the per-run CSV export; overwritten every run
    #[serde(rename = "export-path")]
    pub export_path: String,
}

/// Whether the binary starts a crawl on launch
#[derive(Debug, Clone, Deserialize)]
pub struct AutoStartConfig {
    #[serde(default = "default_auto_start")]
    pub enabled: bool,
}

impl Default for AutoStartConfig {
    fn default() -> Self {
        Self {
            enabled: default_auto_start(),
        }
    }
}

fn default_fetch_delay_ms() -> u64 {
    2000
}

fn default_listing_url() -> String {
    "https://www.zhipin.com/web/geek/job".to_string()
}

fn default_detail_marker() -> String {
    "/job_detail/".to_string()
}

fn default_min_detail_url_length() -> usize {
    40
}

fn default_min_detail_id_length() -> usize {
    5
}

fn default_backend() -> RendererBackend {
    RendererBackend::Webdriver
}

fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_headless() -> bool {
    true
}

fn default_ready_timeout_ms() -> u64 {
    15_000
}

fn default_settle_delay_ms() -> u64 {
    2000
}

fn default_scroll_steps() -> u32 {
    2
}

fn default_auto_start() -> bool {
    true
}

fn default_user_agents() -> Vec<String> {
    [
        "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.6668.101 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/128.0.6613.138 Safari/537.36",
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/129.0.0.0 Safari/537.36 Edg/129.0.0.0",
        "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/127.0.6533.119 Safari/537.36",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}
