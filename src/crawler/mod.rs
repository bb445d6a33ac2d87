//! Crawler module for rendering pages and processing job postings
//!
//! This module contains the core crawling logic, including:
//! - Page rendering through a browser session or plain HTTP
//! - The frontier of pending and visited URLs
//! - Detail link discovery on listing pages
//! - Field extraction, relevance filtering and the dedup gate
//! - Overall crawl coordination

mod coordinator;
mod extractor;
mod frontier;
mod gate;
mod links;
mod relevance;
mod renderer;

pub use coordinator::{Crawler, CrawlerOptions};
pub use extractor::{extract_job, ExtractedJobRecord};
pub use frontier::{Frontier, Priority, QueuedUrl};
pub use gate::{persist_if_new, GateOutcome};
pub use links::{DetailLinkRules, LinkExtractor, LinkHarvest};
pub use relevance::{is_relevant, keywords};
pub use renderer::{HttpRenderer, RenderError, Renderer, WebDriverRenderer};
