//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl loop that coordinates all aspects of a
//! run, including:
//! - The Idle/Running/Completed lifecycle
//! - Popping the frontier, rendering and classifying pages
//! - Following listing pages to detail pages and paginating
//! - Extracting, filtering and persisting job records
//! - Pacing, the page budget and end-of-run cleanup

use crate::config::{Config, CrawlConfiguration};
use crate::crawler::extractor::{extract_job, ExtractedJobRecord};
use crate::crawler::frontier::{Frontier, Priority};
use crate::crawler::gate::{persist_if_new, GateOutcome};
use crate::crawler::links::{DetailLinkRules, LinkExtractor};
use crate::crawler::relevance::is_relevant;
use crate::crawler::renderer::Renderer;
use crate::output::{export_jobs, RunSummary};
use crate::state::{CrawlState, PageKind};
use crate::storage::JobStore;
use crate::url::classify_page;
use crate::{Result, TrawlError};
use scraper::Html;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use url::Url;

/// Settings that outlive a single run
#[derive(Debug, Clone)]
pub struct CrawlerOptions {
    /// Shape rules for detail URLs
    pub link_rules: DetailLinkRules,

    /// Delay between two fetches
    pub fetch_delay: Duration,

    /// Where the CSV export is written; `None` disables the export
    pub export_path: Option<PathBuf>,

    /// Hash of the configuration file, recorded with each run
    pub config_hash: String,
}

impl CrawlerOptions {
    pub fn from_config(config: &Config, config_hash: &str) -> Self {
        Self {
            link_rules: DetailLinkRules::from_site(&config.site),
            fetch_delay: Duration::from_millis(config.crawler.fetch_delay_ms),
            export_path: Some(PathBuf::from(&config.output.export_path)),
            config_hash: config_hash.to_string(),
        }
    }
}

impl Default for CrawlerOptions {
    fn default() -> Self {
        Self {
            link_rules: DetailLinkRules::default(),
            fetch_delay: Duration::from_millis(2000),
            export_path: None,
            config_hash: String::new(),
        }
    }
}

/// State of one crawl run, built fresh by every `initialize` call
struct CrawlRun<R> {
    config: CrawlConfiguration,
    renderer: R,
    frontier: Frontier,
    /// Index of the last listing page queued
    page_counter: u32,
    summary: RunSummary,
    /// Records saved during this run, in save order
    exported: Vec<ExtractedJobRecord>,
}

impl<R> CrawlRun<R> {
    fn new(config: CrawlConfiguration, renderer: R) -> Self {
        Self {
            config,
            renderer,
            frontier: Frontier::new(),
            page_counter: 1,
            summary: RunSummary::default(),
            exported: Vec::new(),
        }
    }
}

/// Main crawl controller
///
/// `initialize` must be called before each `crawl`. A run owns its renderer
/// and releases it when the run ends, whatever the outcome.
pub struct Crawler<R: Renderer, S: JobStore> {
    store: S,
    links: LinkExtractor,
    options: CrawlerOptions,
    state: CrawlState,
    run: Option<CrawlRun<R>>,
}

impl<R: Renderer, S: JobStore> Crawler<R, S> {
    /// Creates an idle controller over `store`
    pub fn new(store: S, options: CrawlerOptions) -> Self {
        Self {
            store,
            links: LinkExtractor::new(options.link_rules.clone()),
            options,
            state: CrawlState::Idle,
            run: None,
        }
    }

    pub fn state(&self) -> CrawlState {
        self.state
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Prepares a new run, replacing any previous run parameters wholesale
    ///
    /// # Errors
    ///
    /// Returns `TrawlError::InvalidTransition` while a run is in progress.
    pub fn initialize(&mut self, config: CrawlConfiguration, renderer: R) -> Result<()> {
        self.transition(CrawlState::Idle)?;

        tracing::info!(
            "Initialized crawl: query='{}', city={}, domain={}, max_pages={}",
            config.query(),
            config.city_code(),
            config.domain(),
            config.max_pages()
        );
        self.run = Some(CrawlRun::new(config, renderer));
        Ok(())
    }

    /// Crawls from the configured start URL
    pub async fn crawl(&mut self) -> Result<RunSummary> {
        let start_url = self
            .run
            .as_ref()
            .ok_or(TrawlError::NotInitialized)?
            .config
            .start_url()
            .clone();
        self.crawl_from(start_url).await
    }

    /// Crawls from `start_url` until the frontier is empty or the page
    /// budget is spent
    ///
    /// Per-page faults are logged and skipped. The renderer is shut down and
    /// the saved records are exported before this returns.
    ///
    /// # Errors
    ///
    /// * `TrawlError::NotInitialized` - no prior `initialize`, or the run
    ///   was already consumed by an earlier `crawl`
    /// * `TrawlError::Storage` - the run could not be registered in the store
    pub async fn crawl_from(&mut self, start_url: Url) -> Result<RunSummary> {
        let mut run = self.run.take().ok_or(TrawlError::NotInitialized)?;

        let run_id = match self.store.create_run(
            &self.options.config_hash,
            run.config.query(),
            run.config.city_code(),
        ) {
            Ok(id) => id,
            Err(e) => {
                run.renderer.shutdown().await;
                return Err(e.into());
            }
        };

        self.transition(CrawlState::Running)?;
        tracing::info!("Starting crawl run {} at {}", run_id, start_url);

        let started = Instant::now();
        run.frontier.push(start_url, Priority::NextListing);
        self.run_loop(&mut run, run_id, started).await;

        // Cleanup runs on every exit from the loop
        let CrawlRun {
            renderer,
            frontier,
            mut summary,
            exported,
            ..
        } = run;
        renderer.shutdown().await;
        summary.elapsed = started.elapsed();

        self.export(&exported);

        if let Err(e) = self.store.complete_run(run_id, &summary) {
            tracing::error!("Failed to record completion of run {}: {}", run_id, e);
        }
        self.transition(CrawlState::Completed)?;

        tracing::info!(
            "Crawl completed: {} pages fetched ({} detail, {} failed), {} jobs saved, {} URLs left pending, in {:?}",
            summary.pages_fetched,
            summary.detail_pages_fetched,
            summary.pages_failed,
            summary.jobs_saved,
            frontier.pending_len(),
            summary.elapsed
        );

        Ok(summary)
    }

    async fn run_loop(&mut self, run: &mut CrawlRun<R>, run_id: i64, started: Instant) {
        while run.summary.pages_fetched < run.config.max_pages() {
            let Some(queued) = run.frontier.pop() else {
                tracing::info!("Frontier is empty, crawl complete");
                break;
            };
            let url = queued.url;

            if run.frontier.is_visited(url.as_str()) {
                continue;
            }

            tracing::debug!("Rendering {} (priority {:?})", url, queued.priority);
            let markup = match run.renderer.render(&url).await {
                Ok(markup) => markup,
                Err(e) => {
                    tracing::warn!("Render failed for {}: {}", url, e);
                    run.frontier.mark_abandoned(&url);
                    run.summary.pages_failed += 1;
                    self.pace().await;
                    continue;
                }
            };

            run.frontier.mark_visited(&url);
            run.summary.pages_fetched += 1;

            if let Err(e) = self.process_page(run, &url, &markup, run_id) {
                tracing::error!("Error processing {}: {}", url, e);
            }

            if run.summary.pages_fetched % 10 == 0 {
                let rate = run.summary.pages_fetched as f64 / started.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} pages fetched, {} in frontier, {} jobs saved, {:.2} pages/sec",
                    run.summary.pages_fetched,
                    run.frontier.pending_len(),
                    run.summary.jobs_saved,
                    rate
                );
            }

            if run.summary.pages_fetched < run.config.max_pages() {
                self.pace().await;
            }
        }

        if run.summary.pages_fetched >= run.config.max_pages() {
            tracing::info!("Page budget of {} reached", run.config.max_pages());
        }
    }

    /// Handles one rendered page
    fn process_page(
        &mut self,
        run: &mut CrawlRun<R>,
        url: &Url,
        markup: &str,
        run_id: i64,
    ) -> Result<()> {
        let document = Html::parse_document(markup);

        match classify_page(url, &self.links.rules().marker) {
            PageKind::Listing => self.process_listing(run, &document, url),
            PageKind::Detail => {
                run.summary.detail_pages_fetched += 1;
                if self.process_detail(run, &document, url, run_id)? {
                    run.summary.jobs_saved += 1;
                }
            }
        }

        let scan = self
            .links
            .scan_same_site(&document, url, run.config.domain(), &run.frontier);
        let mut added = 0;
        for link in scan.urls {
            if run.frontier.push(link, Priority::Supplementary) {
                added += 1;
            }
        }
        if added > 0 {
            tracing::debug!("Same-site scan of {} queued {} more links", url, added);
        }

        Ok(())
    }

    /// Queues the detail links of a listing page and the next listing page
    fn process_listing(&mut self, run: &mut CrawlRun<R>, document: &Html, url: &Url) {
        let harvest = self
            .links
            .extract_detail_links(document, url, run.config.domain(), &run.frontier);

        let found = harvest.urls.len();
        let mut queued = 0;
        for link in harvest.urls {
            if run.frontier.push(link, Priority::ListingDetail) {
                queued += 1;
            }
        }
        tracing::info!(
            "Listing {}: {} detail links via {}, {} queued, {} rejected",
            url,
            found,
            harvest.strategy.unwrap_or("none"),
            queued,
            harvest.rejected
        );

        let next = run.page_counter + 1;
        if next <= run.config.max_pages() {
            run.page_counter = next;
            let next_url = run.config.listing_page_url(next);
            if run.frontier.push(next_url.clone(), Priority::NextListing) {
                tracing::debug!("Queued listing page {}: {}", next, next_url);
            }
        }
    }

    /// Extracts, filters and persists a detail page
    ///
    /// Returns `true` if a new record was saved.
    fn process_detail(
        &mut self,
        run: &mut CrawlRun<R>,
        document: &Html,
        url: &Url,
        run_id: i64,
    ) -> Result<bool> {
        let record = extract_job(document, url.as_str());

        if !record.is_complete() {
            tracing::warn!("No title found on {}, skipping", url);
            return Ok(false);
        }

        if !is_relevant(&record, run.config.query()) {
            tracing::debug!(
                "Not relevant to '{}': {} ({})",
                run.config.query(),
                record.title.as_deref().unwrap_or_default(),
                url
            );
            return Ok(false);
        }

        match persist_if_new(&mut self.store, &record, run_id, &mut run.exported)? {
            GateOutcome::Saved => {
                tracing::info!(
                    "Saved job: {} | {} | {}",
                    record.title.as_deref().unwrap_or_default(),
                    record.company.as_deref().unwrap_or("-"),
                    record.salary.as_deref().unwrap_or("-")
                );
                Ok(true)
            }
            GateOutcome::Duplicate => Ok(false),
        }
    }

    /// Writes the run's saved records; failures are logged only
    fn export(&self, records: &[ExtractedJobRecord]) {
        let Some(path) = &self.options.export_path else {
            return;
        };

        match export_jobs(path, records) {
            Ok(rows) => tracing::info!("Exported {} jobs to {}", rows, path.display()),
            Err(e) => tracing::error!("Failed to export jobs to {}: {}", path.display(), e),
        }
    }

    async fn pace(&self) {
        if !self.options.fetch_delay.is_zero() {
            tokio::time::sleep(self.options.fetch_delay).await;
        }
    }

    fn transition(&mut self, next: CrawlState) -> Result<()> {
        if !self.state.can_transition_to(next) {
            return Err(TrawlError::InvalidTransition {
                from: self.state,
                to: next,
            });
        }
        tracing::debug!("Crawler state {} -> {}", self.state, next);
        self.state = next;
        Ok(())
    }
}
