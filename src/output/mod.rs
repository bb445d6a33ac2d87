//! Output module for run results
//!
//! This module handles:
//! - Exporting the records saved during a run as CSV
//! - Recording and printing run summary counters

mod csv_export;
pub mod stats;

pub use csv_export::{export_jobs, ExportError, EXPORT_HEADER};
pub use stats::{print_summary, RunSummary};
