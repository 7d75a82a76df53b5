//! Structured errors at the watcher boundary.
//!
//! `WatcherError` provides pattern-matchable fatal conditions instead of a
//! generic error type. Unit-of-work failures travel as `anyhow::Error` inside
//! the retry layer and surface here only once the budget is exhausted; an
//! empty scan is not an error at all (see [`ScanOutcome`]).
//!
//! [`ScanOutcome`]: crate::watcher::ScanOutcome

use std::path::PathBuf;

use thiserror::Error;

/// Fatal conditions that stop the watch loop.
///
/// Both variants indicate a structural problem (bad environment, a file that
/// cannot be processed) rather than a transient one; neither is retried, and
/// the caller is expected to translate them into a process-level exit.
#[derive(Debug, Error)]
pub enum WatcherError {
    /// The watched directory could not be read or listed.
    #[error("failed to scan watch directory {}: {source}", .dir.display())]
    Catalog {
        /// The directory the catalog was scanning.
        dir: PathBuf,
        /// The underlying filesystem error.
        #[source]
        source: std::io::Error,
    },

    /// A selected file failed on every permitted attempt.
    ///
    /// The watermark was not advanced; on a restart with the same threshold
    /// this file would be retried from scratch.
    #[error("processing {} failed after {attempts} attempts: {last_error}", .path.display())]
    RetriesExhausted {
        /// The file that could not be processed.
        path: PathBuf,
        /// Attempts consumed before giving up.
        attempts: u32,
        /// The failure from the final attempt.
        last_error: anyhow::Error,
    },
}
