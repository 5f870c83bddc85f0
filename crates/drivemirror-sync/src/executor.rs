//! Action execution
//!
//! Applies a planned action list against the remote store, one action at a
//! time and in plan order. The first failure aborts the run; whatever was
//! already applied stays applied.

use std::sync::Arc;

use drivemirror_core::domain::{DomainError, RelativePath, RemoteId, SyncAction, SyncStatus};
use drivemirror_core::ports::{DeleteOutcome, EntryQuery, FieldSet, IRemoteStore, ParentFilter};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use crate::content_type::{content_type_for, ContentTypeFn};
use crate::filesystem::LocalTree;
use crate::mapper::PathMapper;
use crate::SyncError;

/// Progress notification for one completed upload
#[derive(Debug, Clone, Copy)]
pub struct ActionProgress<'a> {
    /// Local path that is now mirrored
    pub path: &'a RelativePath,
    /// Status of the path after the action (always `Synced`)
    pub status: SyncStatus,
    /// Bytes uploaded for this path
    pub bytes: u64,
}

/// Counters for one execution run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecutionSummary {
    pub uploaded: u32,
    pub replaced: u32,
    pub deleted: u32,
    /// Deletions that found the entry already gone
    pub already_gone: u32,
    pub bytes_uploaded: u64,
}

/// Applies sync actions against a remote store
#[derive(Clone)]
pub struct SyncExecutor {
    store: Arc<dyn IRemoteStore>,
    mapper: PathMapper,
    local: LocalTree,
    content_type: ContentTypeFn,
}

impl SyncExecutor {
    pub fn new(store: Arc<dyn IRemoteStore>, mapper: PathMapper, local: LocalTree) -> Self {
        Self {
            store,
            mapper,
            local,
            content_type: content_type_for,
        }
    }

    /// Replace the content-type lookup used for uploads
    #[must_use]
    pub fn with_content_type(mut self, content_type: ContentTypeFn) -> Self {
        self.content_type = content_type;
        self
    }

    /// Apply `actions` in order
    ///
    /// `cancel` is checked before each action, never during one. Uploads
    /// report through `on_progress` once done; deletions do not.
    ///
    /// # Errors
    /// The first failing action is returned as [`SyncError::ActionFailed`];
    /// cancellation as [`SyncError::Cancelled`]
    #[instrument(skip_all, fields(actions = actions.len()))]
    pub async fn apply<F>(
        &self,
        actions: &[SyncAction],
        cancel: Option<&CancellationToken>,
        mut on_progress: F,
    ) -> Result<ExecutionSummary, SyncError>
    where
        F: FnMut(ActionProgress<'_>) + Send,
    {
        let mut summary = ExecutionSummary::default();

        for (index, action) in actions.iter().enumerate() {
            if cancel.is_some_and(CancellationToken::is_cancelled) {
                info!(completed = index, remaining = actions.len() - index, "Run cancelled");
                return Err(SyncError::Cancelled);
            }

            self.apply_one(action, &mut summary, &mut on_progress)
                .await
                .map_err(|source| SyncError::ActionFailed {
                    status: action.status(),
                    filename: action.filename().to_string(),
                    local_path: action.local_path().cloned(),
                    source: Box::new(source),
                })?;
        }

        info!(
            uploaded = summary.uploaded,
            replaced = summary.replaced,
            deleted = summary.deleted,
            bytes = summary.bytes_uploaded,
            "Applied actions"
        );
        Ok(summary)
    }

    async fn apply_one<F>(
        &self,
        action: &SyncAction,
        summary: &mut ExecutionSummary,
        on_progress: &mut F,
    ) -> Result<(), SyncError>
    where
        F: FnMut(ActionProgress<'_>) + Send,
    {
        match action.status() {
            SyncStatus::NotPresent => {
                let (path, folder) = upload_target(action)?;
                let bytes = self.upload(path, action.filename(), folder).await?;
                summary.uploaded += 1;
                summary.bytes_uploaded += bytes;
                on_progress(ActionProgress {
                    path,
                    status: SyncStatus::Synced,
                    bytes,
                });
            }
            SyncStatus::OutOfSync => {
                let (path, folder) = upload_target(action)?;
                self.delete_existing(action.filename(), folder).await?;
                let bytes = self.upload(path, action.filename(), folder).await?;
                summary.replaced += 1;
                summary.bytes_uploaded += bytes;
                on_progress(ActionProgress {
                    path,
                    status: SyncStatus::Synced,
                    bytes,
                });
            }
            SyncStatus::ToBeDeleted | SyncStatus::ToBeDeletedFromRoot => {
                let id = action.entry_id().ok_or_else(|| missing_field(action))?;
                match self.delete(id).await? {
                    DeleteOutcome::Deleted => summary.deleted += 1,
                    DeleteOutcome::AlreadyGone => summary.already_gone += 1,
                }
                debug!(name = action.filename(), id = %id, "deleted remote entry");
            }
            SyncStatus::Synced | SyncStatus::Unknown => {
                debug!(name = action.filename(), status = %action.status(), "nothing to do");
            }
        }
        Ok(())
    }

    #[instrument(skip(self), fields(path = %path))]
    async fn upload(
        &self,
        path: &RelativePath,
        filename: &str,
        folder: &RemoteId,
    ) -> Result<u64, SyncError> {
        let data = self.local.read(path).await?;
        let content_type = (self.content_type)(filename);

        let id = self
            .store
            .create_file(filename, folder, &content_type, &data)
            .await
            .map_err(|e| SyncError::remote("create_file", e))?;

        debug!(id = %id, bytes = data.len(), content_type = %content_type, "uploaded");
        Ok(data.len() as u64)
    }

    /// Remove the stale copy named `filename` from `folder`
    async fn delete_existing(&self, filename: &str, folder: &RemoteId) -> Result<(), SyncError> {
        let query = EntryQuery::file_named_in(filename, ParentFilter::Folder(folder.clone()));
        match self.mapper.find_unique(&query, &FieldSet::minimal()).await? {
            Some(entry) => {
                self.delete(&entry.id).await?;
            }
            None => warn!(name = filename, "Stale remote copy already gone, uploading anyway"),
        }
        Ok(())
    }

    async fn delete(&self, id: &RemoteId) -> Result<DeleteOutcome, SyncError> {
        let outcome = self
            .store
            .delete_entry(id)
            .await
            .map_err(|e| SyncError::remote("delete_entry", e))?;
        if outcome == DeleteOutcome::AlreadyGone {
            warn!(id = %id, "Remote entry already deleted");
        }
        Ok(outcome)
    }
}

fn upload_target(action: &SyncAction) -> Result<(&RelativePath, &RemoteId), SyncError> {
    match (action.local_path(), action.destination_folder()) {
        (Some(path), Some(folder)) => Ok((path, folder)),
        _ => Err(missing_field(action)),
    }
}

fn missing_field(action: &SyncAction) -> SyncError {
    SyncError::Domain(DomainError::InvalidAction {
        status: action.status().name().to_string(),
        reason: "missing required field".to_string(),
    })
}
