//! Crawl frontier
//!
//! This module handles:
//! - The priority queue of URLs waiting to be fetched
//! - Pending-membership deduplication
//! - The visited set that guarantees at-most-once fetching per run
//! - URLs abandoned after a failed render

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashSet};
use url::Url;

/// Queue priority of a frontier entry (lower is fetched first)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Priority {
    /// Detail link found by the listing link extractor
    ListingDetail = 0,
    /// Next paginated listing page
    NextListing = 1,
    /// Detail link found by the broad same-site scan
    Supplementary = 2,
}

/// A URL queued for fetching with priority information
#[derive(Debug, Clone)]
pub struct QueuedUrl {
    /// The URL to fetch
    pub url: Url,

    /// Queue priority
    pub priority: Priority,

    /// Insertion sequence, breaks ties in FIFO order
    pub seq: u64,
}

// Lower priority values and lower sequence numbers pop first from the BinaryHeap
impl Ord for QueuedUrl {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

impl PartialOrd for QueuedUrl {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for QueuedUrl {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.seq == other.seq
    }
}

impl Eq for QueuedUrl {}

/// Pending and visited URLs of one crawl run
///
/// A URL in `visited` is never queued again, and neither is one whose
/// render failed. Each URL is pending at most once at a time.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: BinaryHeap<QueuedUrl>,
    pending: HashSet<String>,
    visited: HashSet<String>,
    abandoned: HashSet<String>,
    next_seq: u64,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a URL
    ///
    /// # Returns
    ///
    /// `true` if the URL was queued, `false` if it is already pending,
    /// visited or abandoned
    pub fn push(&mut self, url: Url, priority: Priority) -> bool {
        let key = url.as_str();
        if self.is_done(key) || self.pending.contains(key) {
            return false;
        }

        self.pending.insert(key.to_string());
        self.queue.push(QueuedUrl {
            url,
            priority,
            seq: self.next_seq,
        });
        self.next_seq += 1;
        true
    }

    /// Removes the next URL to fetch, skipping any already visited
    pub fn pop(&mut self) -> Option<QueuedUrl> {
        while let Some(queued) = self.queue.pop() {
            self.pending.remove(queued.url.as_str());
            if !self.is_done(queued.url.as_str()) {
                return Some(queued);
            }
        }
        None
    }

    /// Records a successful fetch
    ///
    /// Returns `false` if the URL had already been visited.
    pub fn mark_visited(&mut self, url: &Url) -> bool {
        self.visited.insert(url.as_str().to_string())
    }

    /// Records a failed fetch; the URL is not queued again in this run
    pub fn mark_abandoned(&mut self, url: &Url) {
        self.abandoned.insert(url.as_str().to_string());
    }

    /// Returns true if the URL has been visited
    pub fn is_visited(&self, url: &str) -> bool {
        self.visited.contains(url)
    }

    /// Returns true if the URL was fetched or abandoned in this run
    pub fn is_done(&self, url: &str) -> bool {
        self.visited.contains(url) || self.abandoned.contains(url)
    }

    /// Number of URLs waiting to be fetched
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }
}
