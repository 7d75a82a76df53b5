//! The top-level watch loop.
//!
//! `Watcher` owns the watermark and drives the scan/process cycle: snapshot
//! the catalog, select the oldest eligible file, run the unit of work under
//! the retry policy, advance the watermark on success. An empty scan sleeps
//! the poll interval and rescans; a catalog failure or an exhausted file
//! stops the loop with a [`WatcherError`].

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{debug, error, info};

use crate::catalog::{Catalog, DirCatalog, FileEntry};
use crate::config::WatcherConfig;
use crate::error::WatcherError;
use crate::retry::{invoke_with_retry, Invocation, RetryPolicy};
use crate::watermark::Watermark;
use crate::work::UnitOfWork;

/// Result of a single scan: either one file was fully processed, or nothing
/// new was found and the loop should idle before rescanning.
///
/// "Nothing new" is a normal signal, kept deliberately apart from the error
/// channel that carries processing failures.
#[derive(Debug)]
pub enum ScanOutcome {
    /// The oldest eligible file was processed and the watermark advanced.
    Processed(FileEntry),
    /// No file above the watermark exists yet.
    Idle,
}

/// Sequential directory watcher.
///
/// Exactly one file is in flight at any time: the next scan starts only after
/// the current candidate has definitively succeeded or exhausted its retries.
/// Files are delivered in strictly increasing `(created_at, path)` order,
/// never more than once per run.
pub struct Watcher<C = DirCatalog> {
    catalog: C,
    work: Arc<dyn UnitOfWork>,
    poll_interval: Duration,
    retry: RetryPolicy,
    watermark: Watermark,
}

impl Watcher<DirCatalog> {
    /// Watch the directory named by `config` with a filesystem catalog.
    pub fn new(config: WatcherConfig, work: Arc<dyn UnitOfWork>) -> Self {
        let catalog = DirCatalog::new(config.watch_dir.clone(), config.extension.clone());
        Self::with_catalog(catalog, config, work)
    }
}

impl<C: Catalog> Watcher<C> {
    /// Use a custom [`Catalog`] implementation; `config.watch_dir` and
    /// `config.extension` are ignored in favor of whatever the catalog lists.
    pub fn with_catalog(catalog: C, config: WatcherConfig, work: Arc<dyn UnitOfWork>) -> Self {
        Self {
            catalog,
            work,
            poll_interval: config.poll_interval,
            retry: config.retry,
            watermark: Watermark::new(config.start_from),
        }
    }

    /// The current watermark threshold.
    pub fn watermark(&self) -> DateTime<Utc> {
        self.watermark.timestamp()
    }

    /// One scan step, without the idle sleep.
    ///
    /// Snapshots the catalog and, if an eligible file exists, processes it to
    /// completion (including retries) before returning. The watermark is
    /// advanced only on success. Retry exhaustion and catalog failures
    /// propagate as errors; an empty scan returns [`ScanOutcome::Idle`].
    pub async fn poll_once(&mut self) -> Result<ScanOutcome, WatcherError> {
        let entries = self.catalog.snapshot().await?;
        let candidate = match self.watermark.select(&entries) {
            Some(entry) => entry.clone(),
            None => return Ok(ScanOutcome::Idle),
        };

        debug!(
            path = %candidate.path.display(),
            created_at = %candidate.created_at,
            "processing candidate"
        );

        match invoke_with_retry(self.work.as_ref(), &candidate, &self.retry).await {
            Invocation::Succeeded { attempts } => {
                info!(
                    path = %candidate.path.display(),
                    attempts,
                    "file processed"
                );
                self.watermark.advance(candidate.created_at);
                Ok(ScanOutcome::Processed(candidate))
            }
            Invocation::Exhausted {
                attempts,
                last_error,
            } => {
                error!(
                    path = %candidate.path.display(),
                    attempts,
                    error = %last_error,
                    "retries exhausted, stopping watcher"
                );
                Err(WatcherError::RetriesExhausted {
                    path: candidate.path,
                    attempts,
                    last_error,
                })
            }
        }
    }

    /// Run until a fatal condition.
    ///
    /// Scans forever, sleeping `poll_interval` between empty scans and
    /// rescanning immediately after each processed file. Returns only on a
    /// catalog failure or retry exhaustion; there is no other way to stop
    /// the loop.
    pub async fn run(mut self) -> Result<(), WatcherError> {
        info!(
            poll_interval_ms = self.poll_interval.as_millis() as u64,
            max_attempts = self.retry.max_attempts,
            retry_delay_ms = self.retry.delay.as_millis() as u64,
            start_from = %self.watermark.timestamp(),
            "intake watcher starting"
        );

        loop {
            match self.poll_once().await? {
                ScanOutcome::Processed(_) => {}
                ScanOutcome::Idle => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}
