//! Page renderers
//!
//! A renderer turns a URL into fully rendered markup. Two backends exist:
//! - `WebDriverRenderer` drives one browser session through WebDriver and
//!   waits for script-built content to appear
//! - `HttpRenderer` performs a plain GET, for targets that serve complete
//!   HTML without script execution
//!
//! Every failure is returned as a `RenderError`; nothing here panics or
//! aborts the run.

use crate::config::RendererConfig;
use async_trait::async_trait;
use fantoccini::{Client, ClientBuilder};
use reqwest::header::CONTENT_TYPE;
use std::time::Duration;
use thiserror::Error;
use url::Url;

/// How often `document.readyState` is polled while waiting for a page
const READY_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Errors that can occur while rendering a page
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Failed to start browser session: {0}")]
    Session(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Page {url} not ready after {timeout_ms}ms")]
    Timeout { url: String, timeout_ms: u64 },

    #[error("Script error: {0}")]
    Script(String),

    #[error("HTTP {status} for {url}")]
    Http { url: String, status: u16 },

    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Expected HTML from {url}, got {content_type}")]
    NotHtml { url: String, content_type: String },

    #[error("Rendered markup for {0} is empty")]
    Empty(String),
}

/// Loads URLs and returns their rendered markup
///
/// A renderer is owned by a single crawl run. `shutdown` releases whatever
/// session the renderer holds and is called exactly once, when the run ends.
#[async_trait]
pub trait Renderer: Send {
    /// Renders `url` and returns the page markup
    async fn render(&mut self, url: &Url) -> Result<String, RenderError>;

    /// Releases the underlying session
    async fn shutdown(self);
}

/// Picks a user agent from the pool, if the pool is non-empty
fn pick_user_agent(pool: &[String]) -> Option<&str> {
    if pool.is_empty() {
        return None;
    }
    Some(pool[fastrand::usize(..pool.len())].as_str())
}

/// Browser renderer backed by a WebDriver session
pub struct WebDriverRenderer {
    client: Client,
    ready_timeout: Duration,
    settle_delay: Duration,
    scroll_steps: u32,
}

impl WebDriverRenderer {
    /// Opens a WebDriver session with a randomized browser fingerprint
    ///
    /// The user agent is drawn from the configured pool and the window size
    /// is jittered around 1280x700. Failing to open the session is fatal for
    /// the run, so the error is returned to the caller.
    pub async fn connect(config: &RendererConfig) -> Result<Self, RenderError> {
        let width = 1240 + fastrand::u32(0..=80);
        let height = 680 + fastrand::u32(0..=40);

        let mut args = vec![
            format!("--window-size={},{}", width, height),
            "--disable-blink-features=AutomationControlled".to_string(),
            "--no-sandbox".to_string(),
        ];
        if let Some(agent) = pick_user_agent(&config.user_agents) {
            args.push(format!("--user-agent={}", agent));
        }
        if config.headless {
            args.push("--headless=new".to_string());
            args.push("--disable-gpu".to_string());
        }

        let mut capabilities = serde_json::Map::new();
        capabilities.insert(
            "goog:chromeOptions".to_string(),
            serde_json::json!({ "args": args }),
        );

        let mut builder = ClientBuilder::native();
        builder.capabilities(capabilities);
        let client = builder
            .connect(&config.webdriver_url)
            .await
            .map_err(|e| RenderError::Session(e.to_string()))?;

        tracing::info!(
            "WebDriver session opened at {} ({}x{})",
            config.webdriver_url,
            width,
            height
        );

        Ok(Self {
            client,
            ready_timeout: Duration::from_millis(config.ready_timeout_ms),
            settle_delay: Duration::from_millis(config.settle_delay_ms),
            scroll_steps: config.scroll_steps,
        })
    }

    /// Polls `document.readyState` until it reports `complete`
    async fn wait_until_ready(&self, url: &Url) -> Result<(), RenderError> {
        let poll = async {
            loop {
                let state = self
                    .client
                    .execute("return document.readyState;", vec![])
                    .await?;
                if state.as_str() == Some("complete") {
                    return Ok::<(), fantoccini::error::CmdError>(());
                }
                tokio::time::sleep(READY_POLL_INTERVAL).await;
            }
        };

        match tokio::time::timeout(self.ready_timeout, poll).await {
            Ok(Ok(())) => Ok(()),
            Ok(Err(e)) => Err(RenderError::Script(e.to_string())),
            Err(_) => Err(RenderError::Timeout {
                url: url.to_string(),
                timeout_ms: self.ready_timeout.as_millis() as u64,
            }),
        }
    }

    /// Scrolls down in steps to trigger lazily loaded content
    ///
    /// Intermediate steps scroll to an even fraction of the page height, the
    /// last one to just above the bottom. Failures are tolerated.
    async fn scroll(&self) {
        for step in 1..=self.scroll_steps {
            let result = if step == self.scroll_steps {
                self.client
                    .execute(
                        "window.scrollTo(0, Math.max(0, document.body.scrollHeight - 1000));",
                        vec![],
                    )
                    .await
            } else {
                let fraction = step as f64 / self.scroll_steps as f64;
                self.client
                    .execute(
                        "window.scrollTo(0, Math.floor(document.body.scrollHeight * arguments[0]));",
                        vec![serde_json::json!(fraction)],
                    )
                    .await
            };

            if let Err(e) = result {
                tracing::debug!("Scroll step {} failed: {}", step, e);
            }
            tokio::time::sleep(self.settle_delay).await;
        }
    }
}

#[async_trait]
impl Renderer for WebDriverRenderer {
    async fn render(&mut self, url: &Url) -> Result<String, RenderError> {
        self.client
            .goto(url.as_str())
            .await
            .map_err(|e| RenderError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        self.wait_until_ready(url).await?;
        tokio::time::sleep(self.settle_delay).await;
        self.scroll().await;

        let source = self
            .client
            .source()
            .await
            .map_err(|e| RenderError::Script(e.to_string()))?;

        if source.trim().is_empty() {
            return Err(RenderError::Empty(url.to_string()));
        }
        Ok(source)
    }

    async fn shutdown(self) {
        match self.client.close().await {
            Ok(()) => tracing::info!("WebDriver session closed"),
            Err(e) => tracing::warn!("Failed to close WebDriver session: {}", e),
        }
    }
}

/// Plain HTTP renderer
pub struct HttpRenderer {
    client: reqwest::Client,
}

impl HttpRenderer {
    /// Builds an HTTP client with a user agent drawn from the pool
    pub fn new(config: &RendererConfig) -> Result<Self, RenderError> {
        let mut builder = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.ready_timeout_ms))
            .connect_timeout(Duration::from_secs(10))
            .gzip(true)
            .brotli(true);
        if let Some(agent) = pick_user_agent(&config.user_agents) {
            builder = builder.user_agent(agent);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }
}

#[async_trait]
impl Renderer for HttpRenderer {
    async fn render(&mut self, url: &Url) -> Result<String, RenderError> {
        let response = self.client.get(url.clone()).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(RenderError::Http {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_lowercase();
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(RenderError::NotHtml {
                url: url.to_string(),
                content_type,
            });
        }

        let body = response.text().await?;
        if body.trim().is_empty() {
            return Err(RenderError::Empty(url.to_string()));
        }
        Ok(body)
    }

    async fn shutdown(self) {
        tracing::debug!("HTTP renderer released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn http_renderer() -> HttpRenderer {
        HttpRenderer::new(&RendererConfig::default()).unwrap()
    }

    #[test]
    fn test_pick_user_agent() {
        assert!(pick_user_agent(&[]).is_none());

        let pool = vec!["a".to_string(), "b".to_string()];
        let agent = pick_user_agent(&pool).unwrap();
        assert!(agent == "a" || agent == "b");
    }

    #[tokio::test]
    async fn test_http_renderer_returns_markup() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/page"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><body>ok</body></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let mut renderer = http_renderer();
        let url = Url::parse(&format!("{}/page", server.uri())).unwrap();
        let markup = renderer.render(&url).await.unwrap();
        assert!(markup.contains("ok"));
        renderer.shutdown().await;
    }

    #[tokio::test]
    async fn test_http_renderer_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let mut renderer = http_renderer();
        let url = Url::parse(&format!("{}/down", server.uri())).unwrap();
        let err = renderer.render(&url).await.unwrap_err();
        assert!(matches!(err, RenderError::Http { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_http_renderer_rejects_non_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
            .mount(&server)
            .await;

        let mut renderer = http_renderer();
        let url = Url::parse(&format!("{}/api", server.uri())).unwrap();
        let err = renderer.render(&url).await.unwrap_err();
        assert!(matches!(err, RenderError::NotHtml { .. }));
    }

    #[tokio::test]
    async fn test_http_renderer_rejects_empty_body() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("   ", "text/html"))
            .mount(&server)
            .await;

        let mut renderer = http_renderer();
        let url = Url::parse(&format!("{}/blank", server.uri())).unwrap();
        let err = renderer.render(&url).await.unwrap_err();
        assert!(matches!(err, RenderError::Empty(_)));
    }
}
