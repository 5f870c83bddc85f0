//! SyncAction: one unit of reconciliation work
//!
//! Actions are produced by planning and consumed once by execution. The
//! field requirements for each status are checked at construction, so an
//! executor holding a `SyncAction` never has to deal with a half-filled one.

use serde::{Deserialize, Serialize};

use super::errors::DomainError;
use super::newtypes::{RelativePath, RemoteId};
use super::status::SyncStatus;

/// A planned upload, replacement or deletion
///
/// The remote id carries a different meaning depending on the status:
/// the destination folder for uploads, the entry to remove for deletions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawSyncAction")]
pub struct SyncAction {
    status: SyncStatus,
    filename: String,
    local_path: Option<RelativePath>,
    remote_id: Option<RemoteId>,
}

/// Unchecked wire form; deserialized actions go through [`SyncAction::new`]
#[derive(Deserialize)]
struct RawSyncAction {
    status: SyncStatus,
    filename: String,
    local_path: Option<RelativePath>,
    remote_id: Option<RemoteId>,
}

impl TryFrom<RawSyncAction> for SyncAction {
    type Error = DomainError;

    fn try_from(raw: RawSyncAction) -> Result<Self, Self::Error> {
        SyncAction::new(raw.status, raw.filename, raw.local_path, raw.remote_id)
    }
}

impl SyncAction {
    /// Build an action, checking the fields required by `status`
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidAction`] when an upload lacks either the
    /// local path or the destination folder, or a deletion lacks the entry id
    pub fn new(
        status: SyncStatus,
        filename: impl Into<String>,
        local_path: Option<RelativePath>,
        remote_id: Option<RemoteId>,
    ) -> Result<Self, DomainError> {
        let invalid = |reason: &str| DomainError::InvalidAction {
            status: status.name().to_string(),
            reason: reason.to_string(),
        };

        match status {
            SyncStatus::NotPresent | SyncStatus::OutOfSync => {
                if local_path.is_none() {
                    return Err(invalid("missing local path"));
                }
                if remote_id.is_none() {
                    return Err(invalid("missing destination folder id"));
                }
            }
            SyncStatus::ToBeDeleted | SyncStatus::ToBeDeletedFromRoot => {
                if remote_id.is_none() {
                    return Err(invalid("missing remote entry id"));
                }
            }
            SyncStatus::Synced | SyncStatus::Unknown => {}
        }

        Ok(Self {
            status,
            filename: filename.into(),
            local_path,
            remote_id,
        })
    }

    /// Upload a file that has no remote counterpart
    pub fn upload(local_path: RelativePath, folder: RemoteId) -> Self {
        Self {
            status: SyncStatus::NotPresent,
            filename: local_path.file_name().to_string(),
            local_path: Some(local_path),
            remote_id: Some(folder),
        }
    }

    /// Replace a stale remote copy
    pub fn replace(local_path: RelativePath, folder: RemoteId) -> Self {
        Self {
            status: SyncStatus::OutOfSync,
            filename: local_path.file_name().to_string(),
            local_path: Some(local_path),
            remote_id: Some(folder),
        }
    }

    /// Delete an orphaned entry inside a mirrored folder
    pub fn delete_in_folder(filename: impl Into<String>, entry: RemoteId) -> Self {
        Self {
            status: SyncStatus::ToBeDeleted,
            filename: filename.into(),
            local_path: None,
            remote_id: Some(entry),
        }
    }

    /// Delete an orphaned entry at the top of the backup folder
    pub fn delete_from_root(filename: impl Into<String>, entry: RemoteId) -> Self {
        Self {
            status: SyncStatus::ToBeDeletedFromRoot,
            filename: filename.into(),
            local_path: None,
            remote_id: Some(entry),
        }
    }

    pub fn status(&self) -> SyncStatus {
        self.status
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn local_path(&self) -> Option<&RelativePath> {
        self.local_path.as_ref()
    }

    /// Destination folder for uploads, `None` for any other status
    pub fn destination_folder(&self) -> Option<&RemoteId> {
        if self.status.needs_upload() {
            self.remote_id.as_ref()
        } else {
            None
        }
    }

    /// Entry to remove for deletions, `None` for any other status
    pub fn entry_id(&self) -> Option<&RemoteId> {
        if self.status.is_deletion() {
            self.remote_id.as_ref()
        } else {
            None
        }
    }
}
