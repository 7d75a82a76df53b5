//! The processed-file watermark and candidate selection.
//!
//! The watermark is the timestamp threshold below which files count as
//! already processed. It only moves forward, it advances only when the watch
//! loop reports a fully processed file, and it is the sole piece of mutable
//! state in the system. Pure module, no IO.

use chrono::{DateTime, Utc};

use crate::catalog::FileEntry;

/// Monotonic threshold over file creation timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Watermark {
    threshold: DateTime<Utc>,
}

impl Default for Watermark {
    /// Start at the Unix epoch, admitting every file the catalog can observe.
    fn default() -> Self {
        Self::new(DateTime::<Utc>::UNIX_EPOCH)
    }
}

impl Watermark {
    /// Start from a caller-supplied threshold.
    pub fn new(threshold: DateTime<Utc>) -> Self {
        Self { threshold }
    }

    /// Whether `entry` is still eligible: created strictly after the
    /// threshold. A file created exactly at the threshold counts as processed.
    pub fn admits(&self, entry: &FileEntry) -> bool {
        entry.created_at > self.threshold
    }

    /// The single oldest eligible entry, or `None` when nothing new exists.
    ///
    /// Ordering is `(created_at, path)`: entries sharing a creation timestamp
    /// are delivered in lexicographic path order, making selection
    /// deterministic where the timestamp alone cannot.
    pub fn select<'a>(&self, entries: &'a [FileEntry]) -> Option<&'a FileEntry> {
        entries.iter().filter(|e| self.admits(e)).min_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.path.cmp(&b.path))
        })
    }

    /// Raise the threshold to `ts`. A timestamp at or below the current
    /// threshold leaves the watermark unchanged; it never regresses.
    pub fn advance(&mut self, ts: DateTime<Utc>) {
        if ts > self.threshold {
            self.threshold = ts;
        }
    }

    /// The current threshold.
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.threshold
    }
}
