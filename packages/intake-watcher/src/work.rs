//! The unit-of-work boundary.

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

/// The caller-supplied operation executed against each selected file.
///
/// The watcher treats implementations as black boxes: `Ok(())` means the file
/// is processed, any error counts as one failed attempt. Extra state the
/// operation needs (clients, output paths, column names) lives in fields of
/// the implementing type, bound once at construction.
///
/// Side effects are invisible to the watcher and are not rolled back on
/// failure; a retried invocation must be idempotent-safe from the
/// implementation's perspective.
#[async_trait]
pub trait UnitOfWork: Send + Sync {
    /// Process one file.
    async fn process(&self, path: &Path) -> Result<()>;
}
