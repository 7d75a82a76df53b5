//! # Intake Watcher
//!
//! A sequential "process-newest-unseen-file" watcher. It polls a directory
//! for files of a given extension, hands the oldest not-yet-processed file to
//! a caller-supplied [`UnitOfWork`], and advances a [`Watermark`] so the same
//! file is never delivered twice in a run.
//!
//! ## Architecture
//!
//! ```text
//! Watcher::run loop
//!     │
//!     ├─► Catalog::snapshot()        (list files + creation timestamps)
//!     ├─► Watermark::select()        (oldest entry above the threshold)
//!     │       └─► none ──► sleep poll_interval, rescan
//!     ├─► invoke_with_retry()        (bounded attempts, fixed delay)
//!     │       └─► UnitOfWork::process(path)
//!     └─► Watermark::advance()       (only after success)
//! ```
//!
//! ## Key Invariants
//!
//! 1. **One file in flight** - the next scan starts only after the current
//!    file has definitively succeeded or exhausted its retries
//! 2. **Watermark only moves forward** - advanced exactly once per success,
//!    immediately after the unit of work returns `Ok`, never before
//! 3. **Strict delivery order** - files reach the unit of work in increasing
//!    `(created_at, path)` order, at most once per run
//! 4. **No silent skips** - a file that cannot be processed stops the loop
//!    with [`WatcherError::RetriesExhausted`] instead of being passed over
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use intake_watcher::{UnitOfWork, Watcher, WatcherConfig};
//!
//! struct PrintWork;
//!
//! #[async_trait::async_trait]
//! impl UnitOfWork for PrintWork {
//!     async fn process(&self, path: &std::path::Path) -> anyhow::Result<()> {
//!         println!("{}", path.display());
//!         Ok(())
//!     }
//! }
//!
//! let config = WatcherConfig::new("/data/incoming", "csv");
//! Watcher::new(config, Arc::new(PrintWork)).run().await?;
//! ```

pub mod catalog;
pub mod config;
pub mod error;
pub mod retry;
pub mod watcher;
pub mod watermark;
pub mod work;

pub use catalog::{Catalog, DirCatalog, FileEntry};
pub use config::WatcherConfig;
pub use error::WatcherError;
pub use retry::{invoke_with_retry, Invocation, RetryPolicy};
pub use watcher::{ScanOutcome, Watcher};
pub use watermark::Watermark;
pub use work::UnitOfWork;
