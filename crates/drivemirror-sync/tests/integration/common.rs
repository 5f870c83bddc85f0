//! Shared helpers for engine integration tests
//!
//! A [`Harness`] owns a temporary local base directory, an in-memory remote
//! store and a `SyncEngine` wired to both, with the backup folder `Backup`.

use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use chrono::{DateTime, TimeZone, Utc};
use tempfile::TempDir;

use drivemirror_core::domain::{RelativePath, RemoteId};
use drivemirror_sync::memory::InMemoryRemoteStore;
use drivemirror_sync::{SyncEngine, SyncSettings};

pub const BACKUP: &str = "Backup";

/// Local modification time used for files written by [`Harness::write_at`]
pub const LOCAL_MILLIS: u64 = 1_700_000_000_000;

pub fn rel(path: &str) -> RelativePath {
    RelativePath::new(path).expect("valid relative path")
}

/// Remote timestamp relative to [`LOCAL_MILLIS`]
pub fn remote_time(offset_millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(LOCAL_MILLIS as i64 + offset_millis)
        .single()
        .expect("valid timestamp")
}

pub struct Harness {
    pub dir: TempDir,
    pub store: Arc<InMemoryRemoteStore>,
    pub engine: SyncEngine,
}

impl Harness {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("create temp dir");
        let store = Arc::new(InMemoryRemoteStore::new());
        let engine = SyncEngine::new(store.clone(), &SyncSettings::new(dir.path(), BACKUP))
            .expect("create engine");
        Self { dir, store, engine }
    }

    pub fn base(&self) -> &Path {
        self.dir.path()
    }

    pub fn mkdir(&self, path: &str) {
        std::fs::create_dir_all(self.base().join(path)).expect("create dir");
    }

    /// Write a file with the modification time [`LOCAL_MILLIS`]
    pub fn write_at(&self, path: &str, content: &[u8]) {
        let full = self.base().join(path);
        if let Some(parent) = full.parent() {
            std::fs::create_dir_all(parent).expect("create parent dir");
        }
        std::fs::write(&full, content).expect("write file");
        std::fs::File::options()
            .write(true)
            .open(&full)
            .expect("open file")
            .set_modified(SystemTime::UNIX_EPOCH + Duration::from_millis(LOCAL_MILLIS))
            .expect("set mtime");
    }

    /// Seed the remote backup folder
    pub fn remote_backup(&self) -> RemoteId {
        self.store.insert_folder(BACKUP, None)
    }

    /// Id of the unique top-level backup folder
    pub fn backup_id(&self) -> RemoteId {
        let found = self.store.find(BACKUP, None);
        assert_eq!(found.len(), 1, "expected exactly one backup folder");
        found[0].id.clone()
    }

    /// Id of the unique entry `name` inside `parent`
    pub fn child_id(&self, parent: &RemoteId, name: &str) -> RemoteId {
        let found = self.store.find(name, Some(parent));
        assert_eq!(found.len(), 1, "expected exactly one '{name}'");
        found[0].id.clone()
    }
}
