//! DriveMirror Sync - One-way mirror reconciliation engine
//!
//! Provides:
//! - Path mapping between the local base directory and the remote backup folder
//! - Per-file staleness classification
//! - Recursive tree diff producing upload/replace/delete actions
//! - Sequential execution of those actions with progress reporting
//!
//! ## Modules
//!
//! - [`engine`] - `SyncEngine` facade tying planning and execution together
//! - [`mapper`] - Local/remote path translation and folder resolution
//! - [`classifier`] - Single-file status classification
//! - [`reconciler`] - Tree walk for planning and status aggregation
//! - [`executor`] - Applies planned actions against the remote store
//! - [`filesystem`] - Read-only access to the local tree
//! - [`progress`] - Byte-based transfer progress accounting
//! - [`content_type`] - MIME type lookup for uploads
//! - `memory` - In-memory remote store (`test-util` feature)

pub mod classifier;
pub mod content_type;
pub mod engine;
pub mod executor;
pub mod filesystem;
pub mod mapper;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;
pub mod progress;
pub mod reconciler;

use std::path::PathBuf;

use drivemirror_core::domain::{DomainError, RelativePath, SyncStatus};
use thiserror::Error;

pub use engine::{SyncEngine, SyncReport, SyncSettings};
pub use executor::ActionProgress;
pub use progress::TransferProgress;

/// Boxed error source carried by remote failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur during planning, status checks and execution
#[derive(Debug, Error)]
pub enum SyncError {
    /// A tracked path does not exist locally
    #[error("Local file missing: {}", .0.display())]
    LocalFileMissing(PathBuf),

    /// The remote store returned several entries where one was expected
    #[error("Consistency error: {count} remote entries named '{name}' in {parent}")]
    Consistency {
        name: String,
        parent: String,
        count: usize,
    },

    /// A remote store operation failed
    #[error("Remote {operation} failed: {source}")]
    Remote {
        operation: &'static str,
        #[source]
        source: BoxError,
    },

    /// Executing one action failed; the rest of the run was abandoned
    #[error("Failed to apply {status} action for '{filename}': {source}")]
    ActionFailed {
        status: SyncStatus,
        filename: String,
        local_path: Option<RelativePath>,
        #[source]
        source: Box<SyncError>,
    },

    /// A domain-level error propagated from drivemirror-core
    #[error("Domain error: {0}")]
    Domain(#[from] DomainError),

    /// An I/O error occurred while reading the local tree
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A path selected for planning is not covered by any tracked path
    #[error("Path '{0}' is not under any tracked path")]
    NotTracked(RelativePath),

    /// The run was cancelled between two actions
    #[error("Synchronization cancelled")]
    Cancelled,
}

impl SyncError {
    /// Wrap an adapter error with the name of the failed operation
    pub fn remote(operation: &'static str, err: anyhow::Error) -> Self {
        SyncError::Remote {
            operation,
            source: err.into(),
        }
    }

    /// The innermost error, looking through [`SyncError::ActionFailed`]
    pub fn root_cause(&self) -> &SyncError {
        match self {
            SyncError::ActionFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }
}
