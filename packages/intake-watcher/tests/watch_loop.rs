//! End-to-end watch-loop behavior against scripted catalogs and units of
//! work: delivery order, watermark movement, retry accounting, and the fatal
//! stop conditions.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::bail;
use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use intake_watcher::{
    Catalog, FileEntry, RetryPolicy, ScanOutcome, Watcher, WatcherConfig, WatcherError,
};

fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

fn entry(name: &str, secs: i64) -> FileEntry {
    FileEntry {
        path: PathBuf::from(format!("/watched/{name}.csv")),
        created_at: ts(secs),
    }
}

fn paths(names: &[&str]) -> Vec<PathBuf> {
    names
        .iter()
        .map(|n| PathBuf::from(format!("/watched/{n}.csv")))
        .collect()
}

/// Returns the same listing on every scan, like a directory nobody writes to
/// while the test runs. Re-delivery protection must come from the watermark.
struct ScriptedCatalog {
    files: Vec<FileEntry>,
}

#[async_trait]
impl Catalog for ScriptedCatalog {
    async fn snapshot(&self) -> Result<Vec<FileEntry>, WatcherError> {
        Ok(self.files.clone())
    }
}

/// Fails every snapshot, like an unreadable directory.
struct UnreadableCatalog;

#[async_trait]
impl Catalog for UnreadableCatalog {
    async fn snapshot(&self) -> Result<Vec<FileEntry>, WatcherError> {
        Err(WatcherError::Catalog {
            dir: PathBuf::from("/watched"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        })
    }
}

/// Records every invocation and fails a path as many times as scripted.
#[derive(Default)]
struct ScriptedWork {
    delivered: Mutex<Vec<PathBuf>>,
    failures: Mutex<HashMap<PathBuf, u32>>,
}

impl ScriptedWork {
    fn failing(path: &str, times: u32) -> Self {
        let work = Self::default();
        work.failures
            .lock()
            .unwrap()
            .insert(PathBuf::from(format!("/watched/{path}.csv")), times);
        work
    }

    fn delivered(&self) -> Vec<PathBuf> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl intake_watcher::UnitOfWork for ScriptedWork {
    async fn process(&self, path: &Path) -> anyhow::Result<()> {
        self.delivered.lock().unwrap().push(path.to_path_buf());
        let mut failures = self.failures.lock().unwrap();
        if let Some(left) = failures.get_mut(path) {
            if *left > 0 {
                *left -= 1;
                bail!("scripted failure for {}", path.display());
            }
        }
        Ok(())
    }
}

fn config() -> WatcherConfig {
    WatcherConfig::new("/watched", "csv")
}

#[tokio::test]
async fn delivers_files_in_creation_order_and_advances_watermark() {
    let catalog = ScriptedCatalog {
        files: vec![entry("b", 2), entry("c", 3), entry("a", 1)],
    };
    let work = Arc::new(ScriptedWork::default());
    let mut watcher = Watcher::with_catalog(catalog, config(), work.clone());

    for expected in ["a", "b", "c"] {
        match watcher.poll_once().await.unwrap() {
            ScanOutcome::Processed(entry) => {
                assert_eq!(entry.path, PathBuf::from(format!("/watched/{expected}.csv")));
            }
            ScanOutcome::Idle => panic!("expected {expected} to be processed"),
        }
    }

    assert_eq!(work.delivered(), paths(&["a", "b", "c"]));
    assert_eq!(watcher.watermark(), ts(3));
}

#[tokio::test]
async fn processed_files_are_never_redelivered() {
    let catalog = ScriptedCatalog {
        files: vec![entry("a", 1), entry("b", 2), entry("c", 3)],
    };
    let work = Arc::new(ScriptedWork::default());
    let mut watcher = Watcher::with_catalog(catalog, config(), work.clone());

    for _ in 0..3 {
        assert!(matches!(
            watcher.poll_once().await.unwrap(),
            ScanOutcome::Processed(_)
        ));
    }
    // Every later scan sees the same three files, all at or below the
    // watermark now.
    for _ in 0..5 {
        assert!(matches!(
            watcher.poll_once().await.unwrap(),
            ScanOutcome::Idle
        ));
    }

    assert_eq!(work.delivered(), paths(&["a", "b", "c"]));
}

#[tokio::test]
async fn seeded_watermark_skips_files_already_processed() {
    let catalog = ScriptedCatalog {
        files: vec![entry("a", 1), entry("b", 2), entry("c", 3)],
    };
    let work = Arc::new(ScriptedWork::default());
    let mut watcher =
        Watcher::with_catalog(catalog, config().starting_from(ts(2)), work.clone());

    assert!(matches!(
        watcher.poll_once().await.unwrap(),
        ScanOutcome::Processed(_)
    ));
    assert!(matches!(
        watcher.poll_once().await.unwrap(),
        ScanOutcome::Idle
    ));

    assert_eq!(work.delivered(), paths(&["c"]));
    assert_eq!(watcher.watermark(), ts(3));
}

#[tokio::test(start_paused = true)]
async fn success_within_retry_budget_still_advances_watermark() {
    let catalog = ScriptedCatalog {
        files: vec![entry("a", 1), entry("b", 2), entry("c", 3)],
    };
    let work = Arc::new(ScriptedWork::failing("b", 2));
    let retry = RetryPolicy::new(3, Duration::from_secs(900));
    let mut watcher =
        Watcher::with_catalog(catalog, config().with_retry(retry), work.clone());

    for _ in 0..3 {
        assert!(matches!(
            watcher.poll_once().await.unwrap(),
            ScanOutcome::Processed(_)
        ));
    }

    // b was attempted on delivery plus two retries before succeeding.
    assert_eq!(work.delivered(), paths(&["a", "b", "b", "b", "c"]));
    assert_eq!(watcher.watermark(), ts(3));
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_leave_watermark_before_the_failed_file() {
    let catalog = ScriptedCatalog {
        files: vec![entry("a", 1), entry("b", 2), entry("c", 3)],
    };
    let work = Arc::new(ScriptedWork::failing("b", 3));
    let retry = RetryPolicy::new(3, Duration::from_secs(900));
    let mut watcher =
        Watcher::with_catalog(catalog, config().with_retry(retry), work.clone());

    assert!(matches!(
        watcher.poll_once().await.unwrap(),
        ScanOutcome::Processed(_)
    ));
    let err = watcher.poll_once().await.unwrap_err();
    match err {
        WatcherError::RetriesExhausted { path, attempts, .. } => {
            assert_eq!(path, PathBuf::from("/watched/b.csv"));
            assert_eq!(attempts, 3);
        }
        other => panic!("expected RetriesExhausted, got {other}"),
    }

    assert_eq!(watcher.watermark(), ts(1));
    assert_eq!(work.delivered(), paths(&["a", "b", "b", "b"]));
}

#[tokio::test(start_paused = true)]
async fn run_terminates_with_exhaustion_and_never_reaches_later_files() {
    let catalog = ScriptedCatalog {
        files: vec![entry("a", 1), entry("b", 2), entry("c", 3)],
    };
    let work = Arc::new(ScriptedWork::failing("b", 3));
    let retry = RetryPolicy::new(3, Duration::from_secs(900));
    let watcher = Watcher::with_catalog(catalog, config().with_retry(retry), work.clone());

    let err = watcher.run().await.unwrap_err();
    assert!(matches!(err, WatcherError::RetriesExhausted { .. }));
    // c is behind the unprocessable b and must never be delivered.
    assert_eq!(work.delivered(), paths(&["a", "b", "b", "b"]));
}

#[tokio::test]
async fn catalog_failure_is_fatal() {
    let work = Arc::new(ScriptedWork::default());
    let mut watcher = Watcher::with_catalog(UnreadableCatalog, config(), work.clone());

    let err = watcher.poll_once().await.unwrap_err();
    assert!(matches!(err, WatcherError::Catalog { .. }));
    assert!(work.delivered().is_empty());
}
