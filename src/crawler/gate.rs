//! Dedup and persistence gate

use crate::crawler::ExtractedJobRecord;
use crate::storage::{JobStore, StorageResult};

/// What the gate did with a record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateOutcome {
    /// The record was stored and appended to the export list
    Saved,
    /// A live record with the same URL already exists
    Duplicate,
}

/// Persists `record` unless the store already has its URL
///
/// On success a copy of the record is appended to `exported`; the stored
/// row and the exported copy are independent afterwards.
pub fn persist_if_new<S: JobStore>(
    store: &mut S,
    record: &ExtractedJobRecord,
    run_id: i64,
    exported: &mut Vec<ExtractedJobRecord>,
) -> StorageResult<GateOutcome> {
    if store.exists(&record.url)? {
        tracing::debug!("Already stored, skipping: {}", record.url);
        return Ok(GateOutcome::Duplicate);
    }

    if !store.insert(record, run_id)? {
        tracing::debug!("Stored concurrently, skipping: {}", record.url);
        return Ok(GateOutcome::Duplicate);
    }

    exported.push(record.clone());
    Ok(GateOutcome::Saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::SqliteJobStore;

    fn record(url: &str) -> ExtractedJobRecord {
        ExtractedJobRecord {
            url: url.to_string(),
            title: Some("Java Engineer".to_string()),
            ..ExtractedJobRecord::default()
        }
    }

    #[test]
    fn test_new_record_saved_and_exported() {
        let mut store = SqliteJobStore::new_in_memory().unwrap();
        let run_id = store.create_run("hash", "Java", "101270100").unwrap();
        let mut exported = Vec::new();

        let url = "https://www.zhipin.com/job_detail/3f2a9c1b7d8e4a6f.html";
        let outcome = persist_if_new(&mut store, &record(url), run_id, &mut exported).unwrap();

        assert_eq!(outcome, GateOutcome::Saved);
        assert_eq!(exported.len(), 1);
        assert!(store.exists(url).unwrap());
    }

    #[test]
    fn test_same_url_twice_stores_one_row() {
        let mut store = SqliteJobStore::new_in_memory().unwrap();
        let run_id = store.create_run("hash", "Java", "101270100").unwrap();
        let mut exported = Vec::new();

        let url = "https://www.zhipin.com/job_detail/3f2a9c1b7d8e4a6f.html";
        let first = persist_if_new(&mut store, &record(url), run_id, &mut exported).unwrap();
        let second = persist_if_new(&mut store, &record(url), run_id, &mut exported).unwrap();

        assert_eq!(first, GateOutcome::Saved);
        assert_eq!(second, GateOutcome::Duplicate);
        assert_eq!(store.count_jobs().unwrap(), 1);
        assert_eq!(exported.len(), 1);
    }
}
