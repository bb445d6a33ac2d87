//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlState`: lifecycle of the crawl controller (idle, running, completed)
//! - `PageKind`: whether a fetched page is a listing page or a job detail page

mod crawl_state;
mod page_kind;

// Re-export main types
pub use crawl_state::CrawlState;
pub use page_kind::PageKind;
