//! Configuration module for Jobtrawl
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files, and builds the immutable per-run `CrawlConfiguration`.
//!
//! # Example
//!
//! ```no_run
//! use jobtrawl::config::{load_config, CrawlConfiguration};
//! use std::path::Path;
//!
//! let config = load_config(Path::new("jobtrawl.toml")).unwrap();
//! let run = CrawlConfiguration::from_config(&config).unwrap();
//! println!("Crawling {} for '{}'", run.domain(), run.query());
//! ```

mod parser;
mod run;
mod types;
mod validation;

// Re-export types
pub use run::CrawlConfiguration;
pub use types::{
    AutoStartConfig, Config, CrawlerConfig, OutputConfig, RendererBackend, RendererConfig,
    SiteConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
