//! Tree reconciliation
//!
//! Walks the tracked local paths and compares them against the mirror under
//! the backup folder. Two read paths share the walk:
//!
//! - [`TreeReconciler::plan_actions`] produces the ordered action list.
//!   Missing remote folders along the way are created, since uploads need
//!   a destination id.
//! - [`TreeReconciler::check_status`] reports one status per tracked path
//!   without creating anything.
//!
//! ## Planning order
//!
//! ```text
//!   for each tracked path:
//!     file -> upload/replace action if needed
//!     dir  -> children (sorted, depth first), then deletions for remote
//!             entries in that folder with no local counterpart
//!   finally: deletions for top-level backup entries matching no tracked path
//!
//! Remote entries whose kind differs from the local entry of the same name
//! (a remote folder where a file now lives, or the reverse) count as orphans.
//! ```

use std::collections::{BTreeMap, HashSet};
use std::future::Future;
use std::pin::Pin;

use drivemirror_core::domain::{fold_statuses, RelativePath, SyncAction, SyncStatus};
use tracing::{debug, info, instrument};

use crate::classifier::StatusClassifier;
use crate::filesystem::LocalTree;
use crate::mapper::PathMapper;
use crate::SyncError;

type WalkFuture<'a> = Pin<Box<dyn Future<Output = Result<(), SyncError>> + Send + 'a>>;
type StatusFuture<'a> = Pin<Box<dyn Future<Output = Result<SyncStatus, SyncError>> + Send + 'a>>;

/// Recursive local/remote tree diff
#[derive(Clone)]
pub struct TreeReconciler {
    mapper: PathMapper,
    classifier: StatusClassifier,
    local: LocalTree,
}

impl TreeReconciler {
    pub fn new(mapper: PathMapper, local: LocalTree) -> Self {
        let classifier = StatusClassifier::from_parts(mapper.clone(), local.clone());
        Self {
            mapper,
            classifier,
            local,
        }
    }

    // ========================================================================
    // Planning
    // ========================================================================

    /// Compute the actions that make the remote mirror match `tracked`
    ///
    /// Files that are already synced produce no action.
    pub async fn plan_actions(
        &self,
        tracked: &[RelativePath],
    ) -> Result<Vec<SyncAction>, SyncError> {
        self.plan_selected(tracked, tracked).await
    }

    /// Plan only `selected`, each of which must be a tracked path or lie
    /// below one
    ///
    /// Top-level deletions are still computed against the whole `tracked`
    /// list, so tracked paths outside the selection are never removed.
    #[instrument(skip(self, tracked, selected), fields(tracked = tracked.len(), selected = selected.len()))]
    pub async fn plan_selected(
        &self,
        tracked: &[RelativePath],
        selected: &[RelativePath],
    ) -> Result<Vec<SyncAction>, SyncError> {
        if let Some(path) = selected
            .iter()
            .find(|s| !tracked.iter().any(|t| s.as_path().starts_with(t.as_path())))
        {
            return Err(SyncError::NotTracked(path.clone()));
        }

        let mut actions = Vec::new();

        for path in selected {
            self.plan_path(path, &mut actions).await?;
        }

        let root_id = self
            .mapper
            .resolve_or_create_folder(self.mapper.backup_root())
            .await?;
        let tracked_names: HashSet<&str> = tracked.iter().map(|p| p.first_component()).collect();
        let mut orphans: Vec<_> = self
            .mapper
            .list_children(&root_id)
            .await?
            .into_iter()
            .filter(|entry| !tracked_names.contains(entry.name.as_str()))
            .collect();
        orphans.sort_by(|a, b| a.name.cmp(&b.name));

        for entry in orphans {
            debug!(name = %entry.name, "top-level entry no longer tracked");
            actions.push(SyncAction::delete_from_root(entry.name, entry.id));
        }

        info!(count = actions.len(), "Planned actions");
        Ok(actions)
    }

    fn plan_path<'a>(
        &'a self,
        path: &'a RelativePath,
        actions: &'a mut Vec<SyncAction>,
    ) -> WalkFuture<'a> {
        Box::pin(async move {
            let metadata = self.local.require(path).await?;

            if !metadata.is_dir() {
                let folder_path = self.mapper.remote_parent_for(path)?;
                let folder = self.mapper.resolve_or_create_folder(&folder_path).await?;
                let status = self
                    .classifier
                    .classify_file(path, path.file_name(), &folder)
                    .await?;

                match status {
                    SyncStatus::NotPresent => {
                        actions.push(SyncAction::upload(path.clone(), folder))
                    }
                    SyncStatus::OutOfSync => {
                        actions.push(SyncAction::replace(path.clone(), folder))
                    }
                    _ => debug!(path = %path, status = %status, "no action needed"),
                }
                return Ok(());
            }

            let folder_path = self.mapper.remote_path_for(path)?;
            let folder = self.mapper.resolve_or_create_folder(&folder_path).await?;
            let children = self.local.list_children(path).await?;
            let mut local_entries = HashSet::with_capacity(children.len());

            for name in &children {
                let child = path.join(name)?;
                let is_dir = self.local.require(&child).await?.is_dir();
                self.plan_path(&child, actions).await?;
                local_entries.insert((name.as_str(), is_dir));
            }

            // A remote entry of the other kind (folder vs. file) is an orphan too
            let mut orphans: Vec<_> = self
                .mapper
                .list_children(&folder)
                .await?
                .into_iter()
                .filter(|entry| !local_entries.contains(&(entry.name.as_str(), entry.is_folder)))
                .collect();
            orphans.sort_by(|a, b| a.name.cmp(&b.name));

            for entry in orphans {
                debug!(dir = %path, name = %entry.name, "remote entry has no local counterpart");
                actions.push(SyncAction::delete_in_folder(entry.name, entry.id));
            }

            Ok(())
        })
    }

    // ========================================================================
    // Status aggregation
    // ========================================================================

    /// Report one status per tracked path, calling `on_progress` as each
    /// one resolves
    ///
    /// A directory folds the statuses of its direct children, each child
    /// directory contributing its own folded status. An empty directory is
    /// `Unknown`, which dominates every directory above it.
    #[instrument(skip(self, tracked, on_progress), fields(tracked = tracked.len()))]
    pub async fn check_status<F>(
        &self,
        tracked: &[RelativePath],
        mut on_progress: F,
    ) -> Result<BTreeMap<RelativePath, SyncStatus>, SyncError>
    where
        F: FnMut(&RelativePath, SyncStatus) + Send,
    {
        let mut statuses = BTreeMap::new();

        for path in tracked {
            let metadata = self.local.require(path).await?;
            let status = if metadata.is_dir() {
                self.directory_status(path).await?
            } else {
                self.file_status(path).await?
            };

            on_progress(path, status);
            statuses.insert(path.clone(), status);
        }

        Ok(statuses)
    }

    async fn file_status(&self, path: &RelativePath) -> Result<SyncStatus, SyncError> {
        let folder_path = self.mapper.remote_parent_for(path)?;
        match self.mapper.resolve_folder(&folder_path).await? {
            Some(folder) => {
                self.classifier
                    .classify_file(path, path.file_name(), &folder)
                    .await
            }
            None => {
                debug!(path = %path, "remote parent folder missing");
                Ok(SyncStatus::NotPresent)
            }
        }
    }

    fn directory_status<'a>(&'a self, dir: &'a RelativePath) -> StatusFuture<'a> {
        Box::pin(async move {
            let mut statuses = Vec::new();
            for name in self.local.list_children(dir).await? {
                let child = dir.join(&name)?;
                let status = if self.local.require(&child).await?.is_dir() {
                    self.directory_status(&child).await?
                } else {
                    self.file_status(&child).await?
                };
                statuses.push(status);
            }
            let status = fold_statuses(statuses);
            debug!(dir = %dir, status = %status, "folded directory status");
            Ok(status)
        })
    }
}
