//! Directory snapshots of candidate files.
//!
//! [`DirCatalog`] lists the files in a watched directory that match a single
//! extension and stamps each with its creation time. A snapshot describes the
//! directory at the instant of the call; the watch loop re-invokes it on every
//! scan. The [`Catalog`] trait is the seam for substituting another listing
//! strategy (an OS notification backend, scripted test catalogs) without
//! touching the rest of the loop.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::WatcherError;

/// A candidate file observed in the watched directory.
///
/// Identity is the path; ordering is by `created_at` with the path as the
/// deterministic secondary key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Location of the file as returned by the directory listing.
    pub path: PathBuf,
    /// Creation timestamp, falling back to the modification timestamp on
    /// filesystems that do not record birth times.
    pub created_at: DateTime<Utc>,
}

/// Source of candidate-file snapshots.
///
/// A snapshot is a point-in-time listing with no ordering guarantee. Failure
/// to produce one is fatal to the watch loop; retry belongs to the loop's
/// idle-wait behavior, not to this layer.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// List every matching file with its creation timestamp.
    async fn snapshot(&self) -> Result<Vec<FileEntry>, WatcherError>;
}

/// Filesystem-backed [`Catalog`] over one directory and one extension.
#[derive(Debug, Clone)]
pub struct DirCatalog {
    dir: PathBuf,
    extension: String,
}

impl DirCatalog {
    /// Create a catalog for `dir`, matching `extension` (without the leading
    /// dot, e.g. `"csv"`).
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            extension: extension.into(),
        }
    }

    /// The watched directory.
    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    fn access_failed(&self, source: std::io::Error) -> WatcherError {
        WatcherError::Catalog {
            dir: self.dir.clone(),
            source,
        }
    }
}

#[async_trait]
impl Catalog for DirCatalog {
    async fn snapshot(&self) -> Result<Vec<FileEntry>, WatcherError> {
        let mut reader = tokio::fs::read_dir(&self.dir)
            .await
            .map_err(|e| self.access_failed(e))?;

        let mut entries = Vec::new();
        while let Some(dirent) = reader
            .next_entry()
            .await
            .map_err(|e| self.access_failed(e))?
        {
            let path = dirent.path();
            let matches = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext == self.extension);
            if !matches {
                continue;
            }

            // A file that vanishes or cannot be stat'ed mid-scan fails the
            // whole snapshot: either the listing is faithful or it errors.
            let meta = dirent.metadata().await.map_err(|e| self.access_failed(e))?;
            if !meta.is_file() {
                continue;
            }
            let created = meta
                .created()
                .or_else(|_| meta.modified())
                .map_err(|e| self.access_failed(e))?;

            entries.push(FileEntry {
                path,
                created_at: created.into(),
            });
        }

        Ok(entries)
    }
}
