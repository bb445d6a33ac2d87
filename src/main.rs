//! Jobtrawl main entry point
//!
//! This is the command-line trigger for the Jobtrawl job-listing crawler.

use anyhow::Context;
use clap::Parser;
use jobtrawl::config::{load_config_with_hash, Config, CrawlConfiguration, RendererBackend};
use jobtrawl::crawler::{Crawler, CrawlerOptions, HttpRenderer, Renderer, WebDriverRenderer};
use jobtrawl::output::{print_summary, RunSummary};
use jobtrawl::storage::{open_storage, JobQuery, JobStore, SqliteJobStore};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Jobtrawl: a job-listing crawler
///
/// Jobtrawl renders job-listing pages, follows them to job detail pages,
/// extracts structured postings matching a search query and stores the new
/// ones in a local database, exporting each run's saves as CSV.
#[derive(Parser, Debug)]
#[command(name = "jobtrawl")]
#[command(version = "1.0.0")]
#[command(about = "A job-listing crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Search query, overrides the config file
    #[arg(long)]
    query: Option<String>,

    /// City code, overrides the config file
    #[arg(long)]
    city: Option<String>,

    /// Page budget, overrides the config file
    #[arg(long)]
    max_pages: Option<u32>,

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long, conflicts_with = "list_jobs")]
    dry_run: bool,

    /// List stored jobs and exit
    #[arg(long, conflicts_with = "dry_run")]
    list_jobs: bool,

    /// Filter listed jobs by title substring
    #[arg(long, requires = "list_jobs")]
    title: Option<String>,

    /// Filter listed jobs by company substring
    #[arg(long, requires = "list_jobs")]
    company: Option<String>,

    /// Filter listed jobs by address substring
    #[arg(long, requires = "list_jobs")]
    address: Option<String>,

    /// Page of listed jobs (1-based)
    #[arg(long, default_value_t = 1)]
    page: u32,

    /// Jobs per page (at most 100)
    #[arg(long, default_value_t = 10)]
    page_size: u32,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    apply_overrides(&mut config, &cli);

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.list_jobs {
        handle_list_jobs(&config, &cli)
    } else if !config.auto_start.enabled {
        tracing::info!("Auto-start is disabled; nothing to do");
        Ok(())
    } else {
        let summary = handle_crawl(&config, &config_hash).await?;
        print_summary(&summary);
        Ok(())
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("jobtrawl=info,warn"),
            1 => EnvFilter::new("jobtrawl=debug,info"),
            2 => EnvFilter::new("jobtrawl=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

fn apply_overrides(config: &mut Config, cli: &Cli) {
    if let Some(query) = &cli.query {
        config.crawler.query = query.clone();
        // A fixed start URL would ignore the new query
        config.site.start_url = None;
    }
    if let Some(city) = &cli.city {
        config.crawler.city_code = city.clone();
        config.site.start_url = None;
    }
    if let Some(max_pages) = cli.max_pages {
        config.crawler.max_pages = max_pages;
    }
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let run = CrawlConfiguration::from_config(config)?;

    println!("=== Jobtrawl Dry Run ===\n");

    println!("Crawl:");
    println!("  Query: '{}'", run.query());
    println!("  City code: {}", run.city_code());
    println!("  Max pages: {}", run.max_pages());
    println!("  Fetch delay: {}ms", config.crawler.fetch_delay_ms);

    println!("\nSite:");
    println!("  Domain: {}", run.domain());
    println!("  Start URL: {}", run.start_url());
    println!("  Page 2: {}", run.listing_page_url(2));
    println!("  Detail marker: {}", config.site.detail_marker);

    println!("\nRenderer:");
    println!("  Backend: {:?}", config.renderer.backend);
    if config.renderer.backend == RendererBackend::Webdriver {
        println!("  WebDriver: {}", config.renderer.webdriver_url);
        println!("  Headless: {}", config.renderer.headless);
    }
    println!("  User agents: {}", config.renderer.user_agents.len());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Export: {}", config.output.export_path);

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --list-jobs mode: prints stored jobs
fn handle_list_jobs(config: &Config, cli: &Cli) -> anyhow::Result<()> {
    let store = open_storage(Path::new(&config.output.database_path))?;

    let query = JobQuery {
        title: cli.title.clone(),
        company: cli.company.clone(),
        address: cli.address.clone(),
        page: cli.page,
        page_size: cli.page_size,
        ..JobQuery::default()
    }
    .normalized();

    let total = store.count_jobs()?;
    let jobs = store.list_jobs(&query)?;

    println!(
        "Database: {} ({} jobs stored, page {} of size {})\n",
        config.output.database_path, total, query.page, query.page_size
    );

    if let Some(run) = store.get_latest_run()? {
        println!(
            "Last run #{} ({}): started {}, {} pages, {} saved, query '{}'\n",
            run.id, run.status, run.started_at, run.pages_fetched, run.jobs_saved, run.query
        );
    }

    for job in &jobs {
        println!(
            "[{}] {} | {} | {} | {}",
            job.id,
            job.title,
            job.company.as_deref().unwrap_or("-"),
            job.salary.as_deref().unwrap_or("-"),
            job.address.as_deref().unwrap_or("-")
        );
        println!("    {}", job.url);
    }

    if jobs.is_empty() {
        println!("No jobs match.");
    }
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, config_hash: &str) -> anyhow::Result<RunSummary> {
    let run = CrawlConfiguration::from_config(config)?;
    let store = open_storage(Path::new(&config.output.database_path))
        .with_context(|| format!("Failed to open database {}", config.output.database_path))?;
    let options = CrawlerOptions::from_config(config, config_hash);

    let summary = match config.renderer.backend {
        RendererBackend::Webdriver => {
            let renderer = WebDriverRenderer::connect(&config.renderer)
                .await
                .context("Failed to start the browser renderer")?;
            crawl_with(store, options, run, renderer).await?
        }
        RendererBackend::Http => {
            let renderer = HttpRenderer::new(&config.renderer)?;
            crawl_with(store, options, run, renderer).await?
        }
    };

    Ok(summary)
}

async fn crawl_with<R: Renderer>(
    store: SqliteJobStore,
    options: CrawlerOptions,
    run: CrawlConfiguration,
    renderer: R,
) -> anyhow::Result<RunSummary> {
    let mut crawler = Crawler::new(store, options);
    crawler.initialize(run, renderer)?;

    match crawler.crawl().await {
        Ok(summary) => {
            tracing::info!("Crawl completed successfully");
            Ok(summary)
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
