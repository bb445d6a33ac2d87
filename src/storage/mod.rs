//! Storage module for persisting job records
//!
//! This module handles all database operations, including:
//! - SQLite database initialization and schema management
//! - Existence checks and inserts for job records
//! - Paged, filtered queries over stored records
//! - Run tracking with per-run summary counters

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteJobStore;
pub use traits::{JobStore, StorageError, StorageResult};

use crate::state::CrawlState;
use crate::TrawlError;

use std::path::Path;

/// Largest page size accepted by `JobQuery`
pub const MAX_PAGE_SIZE: u32 = 100;

/// Initializes or opens a job store database
///
/// # Arguments
///
/// * `path` - Path to the SQLite database file
pub fn open_storage(path: &Path) -> Result<SqliteJobStore, TrawlError> {
    Ok(SqliteJobStore::new(path)?)
}

/// A job record as stored in the database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredJob {
    pub id: i64,
    pub url: String,
    pub title: String,
    pub salary: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub experience: Option<String>,
    pub degree: Option<String>,
    pub company: Option<String>,
    pub hr_active: Option<String>,
    pub run_id: Option<i64>,
    pub created_at: String,
}

/// Filter and paging parameters for listing stored jobs
///
/// Text filters on title, company, address and salary are substring
/// matches; experience and degree must match exactly. Blank filters are
/// ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobQuery {
    pub title: Option<String>,
    pub company: Option<String>,
    pub address: Option<String>,
    pub salary: Option<String>,
    pub experience: Option<String>,
    pub degree: Option<String>,
    /// 1-based page number
    pub page: u32,
    pub page_size: u32,
}

impl Default for JobQuery {
    fn default() -> Self {
        Self {
            title: None,
            company: None,
            address: None,
            salary: None,
            experience: None,
            degree: None,
            page: 1,
            page_size: 10,
        }
    }
}

impl JobQuery {
    /// Clamps paging into range: page >= 1, page size within 1..=100
    pub fn normalized(&self) -> Self {
        let mut query = self.clone();
        if query.page == 0 {
            query.page = 1;
        }
        if query.page_size == 0 {
            query.page_size = 10;
        }
        query.page_size = query.page_size.min(MAX_PAGE_SIZE);

        for filter in [
            &mut query.title,
            &mut query.company,
            &mut query.address,
            &mut query.salary,
            &mut query.experience,
            &mut query.degree,
        ] {
            if filter.as_deref().map(str::trim).is_some_and(str::is_empty) {
                *filter = None;
            }
        }

        query
    }

    /// Row offset of the first record on the requested page
    pub fn offset(&self) -> u64 {
        (self.page.max(1) as u64 - 1) * self.page_size as u64
    }
}

/// Represents a crawl run
#[derive(Debug, Clone)]
pub struct RunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub config_hash: String,
    pub query: String,
    pub city_code: String,
    pub status: CrawlState,
    pub pages_fetched: u32,
    pub detail_pages_fetched: u32,
    pub pages_failed: u32,
    pub jobs_saved: u32,
}
