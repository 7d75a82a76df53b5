//! Construction-time configuration for the watcher.

use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::retry::RetryPolicy;

/// Everything the watch loop consumes, supplied once at construction.
///
/// Nothing here is mutable at runtime.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Directory to scan for incoming files.
    pub watch_dir: PathBuf,
    /// Extension to match, without the leading dot (e.g. `"csv"`).
    pub extension: String,
    /// Sleep between scans when no eligible file is found.
    pub poll_interval: Duration,
    /// Retry bounds applied to each selected file.
    pub retry: RetryPolicy,
    /// Initial watermark threshold; files created at or before it are
    /// considered already processed.
    pub start_from: DateTime<Utc>,
}

impl WatcherConfig {
    /// Configuration with default pacing: 1 s poll interval, the default
    /// [`RetryPolicy`], and a watermark starting at the Unix epoch.
    pub fn new(watch_dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            watch_dir: watch_dir.into(),
            extension: extension.into(),
            poll_interval: Duration::from_secs(1),
            retry: RetryPolicy::default(),
            start_from: DateTime::<Utc>::UNIX_EPOCH,
        }
    }

    /// Replace the idle-poll interval.
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    /// Replace the retry policy.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Seed the watermark, e.g. with the launch time to ignore files already
    /// present, or with an externally persisted threshold after a restart.
    pub fn starting_from(mut self, threshold: DateTime<Utc>) -> Self {
        self.start_from = threshold;
        self
    }
}
