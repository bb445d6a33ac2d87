//! Run summary counters and their display

use std::time::Duration;

/// Counters accumulated over one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Pages rendered successfully
    pub pages_fetched: u32,

    /// Of those, pages classified as job detail pages
    pub detail_pages_fetched: u32,

    /// Records that passed every gate and were stored
    pub jobs_saved: u32,

    /// Pages whose render failed
    pub pages_failed: u32,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}

impl RunSummary {
    /// Pages per second over the whole run
    pub fn pages_per_sec(&self) -> f64 {
        let secs = self.elapsed.as_secs_f64();
        if secs > 0.0 {
            self.pages_fetched as f64 / secs
        } else {
            0.0
        }
    }
}

/// Prints a run summary to stdout in a formatted manner
pub fn print_summary(summary: &RunSummary) {
    println!("=== Crawl Summary ===\n");

    println!("Pages:");
    println!("  Fetched: {}", summary.pages_fetched);
    println!("  Detail pages: {}", summary.detail_pages_fetched);
    println!("  Failed: {}", summary.pages_failed);
    println!();

    println!("Jobs saved: {}", summary.jobs_saved);

    let hit_rate = if summary.detail_pages_fetched > 0 {
        (summary.jobs_saved as f64 / summary.detail_pages_fetched as f64) * 100.0
    } else {
        0.0
    };
    println!(
        "Save rate: {:.1}% ({} / {} detail pages)",
        hit_rate, summary.jobs_saved, summary.detail_pages_fetched
    );
    println!(
        "Elapsed: {:.1}s ({:.2} pages/sec)",
        summary.elapsed.as_secs_f64(),
        summary.pages_per_sec()
    );
}
