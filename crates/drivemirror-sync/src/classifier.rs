//! Single-file status classification
//!
//! A local file is compared against the remote entry of the same name in
//! its mirrored parent folder:
//!
//! - no remote entry: `NotPresent`
//! - remote modified strictly before local (millisecond precision): `OutOfSync`
//! - otherwise: `Synced`
//! - two or more remote entries: consistency error

use std::sync::Arc;

use drivemirror_core::domain::{RelativePath, RemoteId, SyncStatus};
use drivemirror_core::ports::{
    EntryField, EntryQuery, FieldSet, IRemoteStore, ParentFilter, RemoteEntry,
};
use tracing::{debug, instrument};

use crate::filesystem::LocalTree;
use crate::mapper::PathMapper;
use crate::SyncError;

/// Classifies local files against their remote counterparts
#[derive(Clone)]
pub struct StatusClassifier {
    mapper: PathMapper,
    local: LocalTree,
}

impl StatusClassifier {
    pub fn new(
        store: Arc<dyn IRemoteStore>,
        backup_folder: &str,
        local: LocalTree,
    ) -> Result<Self, SyncError> {
        Ok(Self {
            mapper: PathMapper::new(store, backup_folder)?,
            local,
        })
    }

    pub(crate) fn from_parts(mapper: PathMapper, local: LocalTree) -> Self {
        Self { mapper, local }
    }

    /// Classify the local file `path` against entries named `filename`
    /// inside the remote folder `parent`
    #[instrument(skip(self), fields(path = %path, parent = %parent))]
    pub async fn classify_file(
        &self,
        path: &RelativePath,
        filename: &str,
        parent: &RemoteId,
    ) -> Result<SyncStatus, SyncError> {
        let local = self.local.require(path).await?;

        let query = EntryQuery::file_named_in(filename, ParentFilter::Folder(parent.clone()));
        let fields = FieldSet::minimal().with(EntryField::ModifiedTime);
        let remote = self.mapper.find_unique(&query, &fields).await?;

        let status = compare(remote.as_ref(), local.modified_millis);
        debug!(status = %status, "classified file");
        Ok(status)
    }
}

/// Status of a local file last modified at `local_millis` given its unique
/// remote counterpart, if any
///
/// A remote entry without a modification time cannot be shown to be current
/// and counts as stale.
pub fn compare(remote: Option<&RemoteEntry>, local_millis: i64) -> SyncStatus {
    match remote {
        None => SyncStatus::NotPresent,
        Some(entry) => match entry.modified_time {
            Some(remote_time) if remote_time.timestamp_millis() < local_millis => {
                SyncStatus::OutOfSync
            }
            Some(_) => SyncStatus::Synced,
            None => SyncStatus::OutOfSync,
        },
    }
}
