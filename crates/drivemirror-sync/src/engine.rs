//! One-way mirror engine
//!
//! The [`SyncEngine`] is the surface used by the CLI (and any other caller):
//! it wires the path mapper, classifier, reconciler and executor around one
//! remote store and one local base directory.
//!
//! ## Sync Flow
//!
//! 1. **Plan**: walk the tracked paths, diff against the remote mirror
//! 2. **Apply**: upload, replace and delete in plan order, reporting progress
//! 3. **Report**: return counters and wall-clock duration
//!
//! Nothing is retried. A failed run leaves what was applied in place; the
//! next run re-plans from the current state.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use drivemirror_core::config::Config;
use drivemirror_core::domain::{RelativePath, SyncAction, SyncStatus};
use drivemirror_core::ports::IRemoteStore;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::executor::{ActionProgress, ExecutionSummary, SyncExecutor};
use crate::filesystem::LocalTree;
use crate::mapper::PathMapper;
use crate::reconciler::TreeReconciler;
use crate::SyncError;

// ============================================================================
// SyncSettings
// ============================================================================

/// Where the engine reads from and writes to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Local directory tracked paths are relative to
    pub base_dir: PathBuf,
    /// Top-level remote folder everything is mirrored under
    pub backup_folder: String,
}

impl SyncSettings {
    pub fn new(base_dir: impl Into<PathBuf>, backup_folder: impl Into<String>) -> Self {
        Self {
            base_dir: base_dir.into(),
            backup_folder: backup_folder.into(),
        }
    }
}

impl From<&Config> for SyncSettings {
    fn from(config: &Config) -> Self {
        Self::new(config.base_dir(), config.sync.backup_folder.clone())
    }
}

// ============================================================================
// SyncReport
// ============================================================================

/// Summary of a completed synchronization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Number of actions the plan contained
    pub planned: usize,
    /// Files uploaded for the first time
    pub uploaded: u32,
    /// Stale files replaced
    pub replaced: u32,
    /// Remote entries deleted
    pub deleted: u32,
    /// Deletions that found the entry already gone
    pub already_gone: u32,
    /// Bytes uploaded
    pub bytes_uploaded: u64,
    /// Wall-clock duration of the run in milliseconds
    pub duration_ms: u64,
}

impl SyncReport {
    /// Report for a run that planned `planned` actions and started at `started`
    pub fn from_summary(planned: usize, summary: ExecutionSummary, started: Instant) -> Self {
        Self {
            planned,
            uploaded: summary.uploaded,
            replaced: summary.replaced,
            deleted: summary.deleted,
            already_gone: summary.already_gone,
            bytes_uploaded: summary.bytes_uploaded,
            duration_ms: started.elapsed().as_millis() as u64,
        }
    }
}

// ============================================================================
// SyncEngine
// ============================================================================

/// Planning, status and execution over one remote store
#[derive(Clone)]
pub struct SyncEngine {
    reconciler: TreeReconciler,
    executor: SyncExecutor,
    local: LocalTree,
}

impl SyncEngine {
    /// Creates a new `SyncEngine`
    ///
    /// # Arguments
    /// * `store` - Already authenticated remote store
    /// * `settings` - Local base directory and remote backup folder name
    ///
    /// # Errors
    /// Returns error if the backup folder name is not a valid folder name
    pub fn new(store: Arc<dyn IRemoteStore>, settings: &SyncSettings) -> Result<Self, SyncError> {
        let local = LocalTree::new(settings.base_dir.clone());
        let mapper = PathMapper::new(store.clone(), &settings.backup_folder)?;
        Ok(Self {
            reconciler: TreeReconciler::new(mapper.clone(), local.clone()),
            executor: SyncExecutor::new(store, mapper, local.clone()),
            local,
        })
    }

    /// Replace the executor, e.g. to override the content-type lookup
    #[must_use]
    pub fn with_executor(mut self, f: impl FnOnce(SyncExecutor) -> SyncExecutor) -> Self {
        self.executor = f(self.executor);
        self
    }

    /// Compute the actions needed to mirror `tracked`
    ///
    /// Resolving destination folders creates missing remote folders.
    pub async fn plan_actions(
        &self,
        tracked: &[RelativePath],
    ) -> Result<Vec<SyncAction>, SyncError> {
        self.reconciler.plan_actions(tracked).await
    }

    /// Plan a subset of the tracked paths
    ///
    /// Every selected path must be tracked or lie below a tracked path.
    /// Top-level entries belonging to unselected tracked paths are left alone.
    pub async fn plan_selected(
        &self,
        tracked: &[RelativePath],
        selected: &[RelativePath],
    ) -> Result<Vec<SyncAction>, SyncError> {
        self.reconciler.plan_selected(tracked, selected).await
    }

    /// Apply a planned action list
    pub async fn apply_actions<F>(
        &self,
        actions: &[SyncAction],
        on_progress: F,
    ) -> Result<ExecutionSummary, SyncError>
    where
        F: FnMut(ActionProgress<'_>) + Send,
    {
        self.executor.apply(actions, None, on_progress).await
    }

    /// Apply a planned action list, stopping between actions once `cancel`
    /// fires
    pub async fn apply_actions_with_cancel<F>(
        &self,
        actions: &[SyncAction],
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<ExecutionSummary, SyncError>
    where
        F: FnMut(ActionProgress<'_>) + Send,
    {
        self.executor.apply(actions, Some(cancel), on_progress).await
    }

    /// Plan and apply in one go
    #[tracing::instrument(skip(self, tracked, on_progress), fields(tracked = tracked.len()))]
    pub async fn synchronize<F>(
        &self,
        tracked: &[RelativePath],
        on_progress: F,
    ) -> Result<SyncReport, SyncError>
    where
        F: FnMut(ActionProgress<'_>) + Send,
    {
        self.run(tracked, None, on_progress).await
    }

    /// [`Self::synchronize`] with cooperative cancellation between actions
    #[tracing::instrument(skip(self, tracked, cancel, on_progress), fields(tracked = tracked.len()))]
    pub async fn synchronize_with_cancel<F>(
        &self,
        tracked: &[RelativePath],
        cancel: &CancellationToken,
        on_progress: F,
    ) -> Result<SyncReport, SyncError>
    where
        F: FnMut(ActionProgress<'_>) + Send,
    {
        self.run(tracked, Some(cancel), on_progress).await
    }

    async fn run<F>(
        &self,
        tracked: &[RelativePath],
        cancel: Option<&CancellationToken>,
        on_progress: F,
    ) -> Result<SyncReport, SyncError>
    where
        F: FnMut(ActionProgress<'_>) + Send,
    {
        let started = Instant::now();
        info!("Starting synchronization run");

        let actions = self.plan_actions(tracked).await?;
        let summary = self.executor.apply(&actions, cancel, on_progress).await?;
        let report = SyncReport::from_summary(actions.len(), summary, started);

        info!(
            planned = report.planned,
            uploaded = report.uploaded,
            replaced = report.replaced,
            deleted = report.deleted,
            duration_ms = report.duration_ms,
            "Synchronization run complete"
        );
        Ok(report)
    }

    /// Status of each tracked path; never creates remote folders
    pub async fn check_status<F>(
        &self,
        tracked: &[RelativePath],
        on_progress: F,
    ) -> Result<BTreeMap<RelativePath, SyncStatus>, SyncError>
    where
        F: FnMut(&RelativePath, SyncStatus) + Send,
    {
        self.reconciler.check_status(tracked, on_progress).await
    }

    /// Sum of the local sizes of every file an action will upload
    pub async fn total_upload_bytes(&self, actions: &[SyncAction]) -> Result<u64, SyncError> {
        let mut total = 0u64;
        for action in actions.iter().filter(|a| a.status().needs_upload()) {
            if let Some(path) = action.local_path() {
                total += self.local.require(path).await?.size;
            }
        }
        Ok(total)
    }
}
