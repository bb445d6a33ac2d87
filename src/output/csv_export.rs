//! CSV export of the records saved during a run

use crate::crawler::ExtractedJobRecord;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

/// Column order of the export file
pub const EXPORT_HEADER: [&str; 8] = [
    "URL",
    "title",
    "salary",
    "address",
    "experience",
    "degree",
    "company",
    "description",
];

/// Errors that can occur while writing the export file
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Failed to create export file: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Writes one row per record to `path`, replacing any existing file
///
/// The header row is always written, so an empty run still produces a
/// valid file.
///
/// # Returns
///
/// The number of data rows written
pub fn export_jobs(path: &Path, records: &[ExtractedJobRecord]) -> Result<usize, ExportError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::Writer::from_writer(file);
    writer.write_record(EXPORT_HEADER)?;

    for record in records {
        writer.write_record([
            record.url.as_str(),
            record.title.as_deref().unwrap_or_default(),
            record.salary.as_deref().unwrap_or_default(),
            record.address.as_deref().unwrap_or_default(),
            record.experience.as_deref().unwrap_or_default(),
            record.degree.as_deref().unwrap_or_default(),
            record.company.as_deref().unwrap_or_default(),
            record.description.as_deref().unwrap_or_default(),
        ])?;
    }

    writer.flush()?;
    Ok(records.len())
}
