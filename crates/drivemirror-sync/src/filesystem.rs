//! Local tree access
//!
//! The local tree is never persisted; it is read live from disk through
//! `tokio::fs` every time a plan or status check runs. All paths handed in
//! are [`RelativePath`]s resolved under the configured base directory.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use drivemirror_core::domain::RelativePath;
use tracing::{debug, instrument, warn};

use crate::SyncError;

/// What a local path points at
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalKind {
    File,
    Directory,
}

/// Metadata of one local entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LocalMetadata {
    pub kind: LocalKind,
    /// Size in bytes (0 for directories)
    pub size: u64,
    /// Last modification time, milliseconds since the Unix epoch
    pub modified_millis: i64,
}

impl LocalMetadata {
    pub fn is_dir(&self) -> bool {
        self.kind == LocalKind::Directory
    }
}

/// Read-only view of the local tree rooted at the base directory
#[derive(Debug, Clone)]
pub struct LocalTree {
    base_dir: PathBuf,
}

impl LocalTree {
    /// Create a view over `base_dir`
    #[must_use]
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Absolute location of `path` on disk
    pub fn absolute(&self, path: &RelativePath) -> PathBuf {
        path.to_local(&self.base_dir)
    }

    /// Stat `path`; `None` if it does not exist
    #[instrument(skip(self), fields(path = %path))]
    pub async fn stat(&self, path: &RelativePath) -> Result<Option<LocalMetadata>, SyncError> {
        let metadata = match tokio::fs::metadata(self.absolute(path)).await {
            Ok(m) => m,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!("path not found");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let kind = if metadata.is_dir() {
            LocalKind::Directory
        } else {
            LocalKind::File
        };
        let modified: DateTime<Utc> = metadata.modified()?.into();

        Ok(Some(LocalMetadata {
            kind,
            size: if metadata.is_dir() { 0 } else { metadata.len() },
            modified_millis: modified.timestamp_millis(),
        }))
    }

    /// Stat `path`, failing with [`SyncError::LocalFileMissing`] if absent
    pub async fn require(&self, path: &RelativePath) -> Result<LocalMetadata, SyncError> {
        self.stat(path)
            .await?
            .ok_or_else(|| SyncError::LocalFileMissing(self.absolute(path)))
    }

    /// Names of the direct children of the directory `path`, sorted
    ///
    /// Entries whose names are not valid UTF-8 cannot be mirrored and are
    /// skipped with a warning.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn list_children(&self, path: &RelativePath) -> Result<Vec<String>, SyncError> {
        let mut entries = tokio::fs::read_dir(self.absolute(path)).await?;
        let mut names = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            match entry.file_name().into_string() {
                Ok(name) => names.push(name),
                Err(raw) => warn!(name = ?raw, "Skipping entry with non UTF-8 name"),
            }
        }

        names.sort();
        debug!(count = names.len(), "listed local children");
        Ok(names)
    }

    /// Read the whole content of the file `path`
    #[instrument(skip(self), fields(path = %path))]
    pub async fn read(&self, path: &RelativePath) -> Result<Vec<u8>, SyncError> {
        match tokio::fs::read(self.absolute(path)).await {
            Ok(data) => {
                debug!(bytes = data.len(), "file read complete");
                Ok(data)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(SyncError::LocalFileMissing(self.absolute(path)))
            }
            Err(e) => Err(e.into()),
        }
    }
}
