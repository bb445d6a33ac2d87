//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the JobStore trait.

use crate::crawler::ExtractedJobRecord;
use crate::output::RunSummary;
use crate::state::CrawlState;
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{JobStore, StorageError, StorageResult};
use crate::storage::{JobQuery, RunRecord, StoredJob};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;

const RUN_COLUMNS: &str = "id, started_at, finished_at, config_hash, query, city_code, status,
     pages_fetched, detail_pages_fetched, pages_failed, jobs_saved";

/// SQLite job store
pub struct SqliteJobStore {
    conn: Connection,
}

impl SqliteJobStore {
    /// Creates a new SqliteJobStore instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteJobStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self { conn })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self { conn })
    }
}

fn run_from_row(row: &Row<'_>) -> rusqlite::Result<RunRecord> {
    Ok(RunRecord {
        id: row.get(0)?,
        started_at: row.get(1)?,
        finished_at: row.get(2)?,
        config_hash: row.get(3)?,
        query: row.get(4)?,
        city_code: row.get(5)?,
        status: CrawlState::from_db_string(&row.get::<_, String>(6)?)
            .unwrap_or(CrawlState::Running),
        pages_fetched: row.get(7)?,
        detail_pages_fetched: row.get(8)?,
        pages_failed: row.get(9)?,
        jobs_saved: row.get(10)?,
    })
}

fn job_from_row(row: &Row<'_>) -> rusqlite::Result<StoredJob> {
    Ok(StoredJob {
        id: row.get(0)?,
        url: row.get(1)?,
        title: row.get(2)?,
        salary: row.get(3)?,
        address: row.get(4)?,
        description: row.get(5)?,
        experience: row.get(6)?,
        degree: row.get(7)?,
        company: row.get(8)?,
        hr_active: row.get(9)?,
        run_id: row.get(10)?,
        created_at: row.get(11)?,
    })
}

impl JobStore for SqliteJobStore {
    // ===== Job Records =====

    fn exists(&self, url: &str) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT 1 FROM jobs WHERE url = ?1 AND is_deleted = 0 LIMIT 1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn insert(&mut self, record: &ExtractedJobRecord, run_id: i64) -> StorageResult<bool> {
        let title = record.title.as_deref().unwrap_or_default();
        if title.is_empty() {
            return Err(StorageError::InvalidQuery(format!(
                "refusing to store record without title: {}",
                record.url
            )));
        }

        // Single statement so a row that appeared since `exists` is not duplicated
        let now = Utc::now().to_rfc3339();
        let inserted = self.conn.execute(
            "INSERT INTO jobs (url, title, salary, address, description, experience, degree,
                               company, hr_active, run_id, created_at, is_deleted)
             SELECT ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, 0
             WHERE NOT EXISTS (SELECT 1 FROM jobs WHERE url = ?1 AND is_deleted = 0)",
            params![
                record.url,
                title,
                record.salary,
                record.address,
                record.description,
                record.experience,
                record.degree,
                record.company,
                record.hr_active,
                run_id,
                now,
            ],
        )?;

        Ok(inserted > 0)
    }

    fn soft_delete(&mut self, url: &str) -> StorageResult<bool> {
        let updated = self.conn.execute(
            "UPDATE jobs SET is_deleted = 1 WHERE url = ?1 AND is_deleted = 0",
            params![url],
        )?;
        Ok(updated > 0)
    }

    fn list_jobs(&self, query: &JobQuery) -> StorageResult<Vec<StoredJob>> {
        let query = query.normalized();
        let mut stmt = self.conn.prepare(
            "SELECT id, url, title, salary, address, description, experience, degree,
                    company, hr_active, run_id, created_at
             FROM jobs
             WHERE is_deleted = 0
               AND (?1 IS NULL OR title LIKE '%' || ?1 || '%')
               AND (?2 IS NULL OR company LIKE '%' || ?2 || '%')
               AND (?3 IS NULL OR address LIKE '%' || ?3 || '%')
               AND (?4 IS NULL OR salary LIKE '%' || ?4 || '%')
               AND (?5 IS NULL OR experience = ?5)
               AND (?6 IS NULL OR degree = ?6)
             ORDER BY created_at DESC, id DESC
             LIMIT ?7 OFFSET ?8",
        )?;

        let jobs = stmt
            .query_map(
                params![
                    query.title,
                    query.company,
                    query.address,
                    query.salary,
                    query.experience,
                    query.degree,
                    query.page_size as i64,
                    query.offset() as i64,
                ],
                job_from_row,
            )?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(jobs)
    }

    fn count_jobs(&self) -> StorageResult<u64> {
        let count: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM jobs WHERE is_deleted = 0", [], |row| {
                    row.get(0)
                })?;
        Ok(count as u64)
    }

    // ===== Run Management =====

    fn create_run(
        &mut self,
        config_hash: &str,
        query: &str,
        city_code: &str,
    ) -> StorageResult<i64> {
        let now = Utc::now().to_rfc3339();
        self.conn.execute(
            "INSERT INTO runs (started_at, config_hash, query, city_code, status)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                now,
                config_hash,
                query,
                city_code,
                CrawlState::Running.to_db_string()
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn get_latest_run(&self) -> StorageResult<Option<RunRecord>> {
        let sql = format!("SELECT {} FROM runs ORDER BY id DESC LIMIT 1", RUN_COLUMNS);
        let run = self.conn.query_row(&sql, [], run_from_row).optional()?;
        Ok(run)
    }

    fn complete_run(&mut self, run_id: i64, summary: &RunSummary) -> StorageResult<()> {
        let now = Utc::now().to_rfc3339();
        let updated = self.conn.execute(
            "UPDATE runs SET status = ?1, finished_at = ?2, pages_fetched = ?3,
                    detail_pages_fetched = ?4, pages_failed = ?5, jobs_saved = ?6
             WHERE id = ?7",
            params![
                CrawlState::Completed.to_db_string(),
                now,
                summary.pages_fetched,
                summary.detail_pages_fetched,
                summary.pages_failed,
                summary.jobs_saved,
                run_id
            ],
        )?;

        if updated == 0 {
            return Err(StorageError::RunNotFound(run_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(url: &str, title: &str) -> ExtractedJobRecord {
        ExtractedJobRecord {
            url: url.to_string(),
            title: Some(title.to_string()),
            salary: Some("15-25K".to_string()),
            address: Some("成都·高新区".to_string()),
            description: Some("负责后端服务开发".to_string()),
            experience: Some("3-5年".to_string()),
            degree: Some("本科".to_string()),
            company: Some("Acme".to_string()),
            hr_active: None,
        }
    }

    fn store_with_run() -> (SqliteJobStore, i64) {
        let mut store = SqliteJobStore::new_in_memory().unwrap();
        let run_id = store.create_run("hash", "Java", "101270100").unwrap();
        (store, run_id)
    }

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteJobStore::new_in_memory().is_ok());
    }

    #[test]
    fn test_insert_then_exists() {
        let (mut store, run_id) = store_with_run();
        let url = "https://www.zhipin.com/job_detail/abc123def.html";

        assert!(!store.exists(url).unwrap());
        assert!(store.insert(&record(url, "Java Engineer"), run_id).unwrap());
        assert!(store.exists(url).unwrap());
        assert_eq!(store.count_jobs().unwrap(), 1);
    }

    #[test]
    fn test_insert_duplicate_is_noop() {
        let (mut store, run_id) = store_with_run();
        let url = "https://www.zhipin.com/job_detail/abc123def.html";

        assert!(store.insert(&record(url, "Java Engineer"), run_id).unwrap());
        assert!(!store.insert(&record(url, "Java Engineer"), run_id).unwrap());
        assert_eq!(store.count_jobs().unwrap(), 1);
    }

    #[test]
    fn test_exists_is_exact_match() {
        let (mut store, run_id) = store_with_run();
        let url = "https://www.zhipin.com/job_detail/abc123def.html";
        store.insert(&record(url, "Java Engineer"), run_id).unwrap();

        assert!(!store
            .exists("https://www.zhipin.com/job_detail/abc123def.html?ka=1")
            .unwrap());
    }

    #[test]
    fn test_soft_deleted_rows_are_ignored() {
        let (mut store, run_id) = store_with_run();
        let url = "https://www.zhipin.com/job_detail/abc123def.html";
        store.insert(&record(url, "Java Engineer"), run_id).unwrap();

        assert!(store.soft_delete(url).unwrap());
        assert!(!store.soft_delete(url).unwrap());
        assert!(!store.exists(url).unwrap());
        assert_eq!(store.count_jobs().unwrap(), 0);

        // A deleted posting can be stored again
        assert!(store.insert(&record(url, "Java Engineer"), run_id).unwrap());
        assert!(store.exists(url).unwrap());
    }

    #[test]
    fn test_insert_without_title_rejected() {
        let (mut store, run_id) = store_with_run();
        let mut incomplete = record("https://www.zhipin.com/job_detail/abc123def.html", "");
        assert!(store.insert(&incomplete, run_id).is_err());

        incomplete.title = None;
        assert!(store.insert(&incomplete, run_id).is_err());
        assert_eq!(store.count_jobs().unwrap(), 0);
    }

    #[test]
    fn test_list_jobs_filters() {
        let (mut store, run_id) = store_with_run();
        store
            .insert(&record("https://x.com/job_detail/aaaaaa1.html", "Java Engineer"), run_id)
            .unwrap();
        store
            .insert(&record("https://x.com/job_detail/aaaaaa2.html", "Python Engineer"), run_id)
            .unwrap();
        let mut other = record("https://x.com/job_detail/aaaaaa3.html", "Java Architect");
        other.degree = Some("硕士".to_string());
        store.insert(&other, run_id).unwrap();

        let java = store
            .list_jobs(&JobQuery {
                title: Some("java".to_string()),
                ..JobQuery::default()
            })
            .unwrap();
        assert_eq!(java.len(), 2);

        let masters = store
            .list_jobs(&JobQuery {
                degree: Some("硕士".to_string()),
                ..JobQuery::default()
            })
            .unwrap();
        assert_eq!(masters.len(), 1);
        assert_eq!(masters[0].title, "Java Architect");

        let all = store.list_jobs(&JobQuery::default()).unwrap();
        assert_eq!(all.len(), 3);
        // Newest first
        assert_eq!(all[0].url, "https://x.com/job_detail/aaaaaa3.html");
        assert_eq!(all[0].run_id, Some(run_id));
    }

    #[test]
    fn test_list_jobs_paging() {
        let (mut store, run_id) = store_with_run();
        for i in 0..5 {
            let url = format!("https://x.com/job_detail/job{:05}.html", i);
            store.insert(&record(&url, "Engineer"), run_id).unwrap();
        }

        let page = store
            .list_jobs(&JobQuery {
                page: 2,
                page_size: 2,
                ..JobQuery::default()
            })
            .unwrap();
        assert_eq!(page.len(), 2);

        let last = store
            .list_jobs(&JobQuery {
                page: 3,
                page_size: 2,
                ..JobQuery::default()
            })
            .unwrap();
        assert_eq!(last.len(), 1);
    }

    #[test]
    fn test_run_lifecycle() {
        let (mut store, run_id) = store_with_run();

        let run = store.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, CrawlState::Running);
        assert!(run.finished_at.is_none());

        let summary = RunSummary {
            pages_fetched: 7,
            detail_pages_fetched: 5,
            pages_failed: 1,
            jobs_saved: 3,
            ..RunSummary::default()
        };
        store.complete_run(run_id, &summary).unwrap();

        let run = store.get_latest_run().unwrap().unwrap();
        assert_eq!(run.id, run_id);
        assert_eq!(run.status, CrawlState::Completed);
        assert_eq!(run.pages_fetched, 7);
        assert_eq!(run.detail_pages_fetched, 5);
        assert_eq!(run.pages_failed, 1);
        assert_eq!(run.jobs_saved, 3);
        assert!(run.finished_at.is_some());
    }

    #[test]
    fn test_missing_run() {
        let mut store = SqliteJobStore::new_in_memory().unwrap();
        assert!(store.get_latest_run().unwrap().is_none());
        assert!(matches!(
            store.complete_run(42, &RunSummary::default()),
            Err(StorageError::RunNotFound(42))
        ));
    }
}
