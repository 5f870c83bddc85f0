//! Sync status of a local path relative to its remote mirror
//!
//! ## Folding
//!
//! Directory statuses are derived from their descendants:
//!
//! ```text
//!   any Unknown            ──► Unknown
//!   any OutOfSync/NotPresent ──► OutOfSync
//!   all Synced             ──► Synced
//!   no descendants         ──► Unknown
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// Sync status of a file, a directory, or a planned action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SyncStatus {
    /// Remote copy exists and is at least as new as the local file
    Synced,
    /// Remote copy exists but is older than the local file
    OutOfSync,
    /// No remote counterpart
    NotPresent,
    /// Remote entry inside a mirrored folder with no local counterpart
    ToBeDeleted,
    /// Remote top-level entry with no matching tracked path
    ToBeDeletedFromRoot,
    /// Nothing to aggregate, or unresolved
    Unknown,
}

impl SyncStatus {
    /// Returns true if executing this status uploads local content
    pub fn needs_upload(&self) -> bool {
        matches!(self, SyncStatus::NotPresent | SyncStatus::OutOfSync)
    }

    /// Returns true if executing this status deletes a remote entry
    pub fn is_deletion(&self) -> bool {
        matches!(
            self,
            SyncStatus::ToBeDeleted | SyncStatus::ToBeDeletedFromRoot
        )
    }

    /// Returns the wire name (`NOT_PRESENT`, `OUT_OF_SYNC`, ...)
    pub fn name(&self) -> &'static str {
        match self {
            SyncStatus::Synced => "SYNCED",
            SyncStatus::OutOfSync => "OUT_OF_SYNC",
            SyncStatus::NotPresent => "NOT_PRESENT",
            SyncStatus::ToBeDeleted => "TO_BE_DELETED",
            SyncStatus::ToBeDeletedFromRoot => "TO_BE_DELETED_FROM_ROOT",
            SyncStatus::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for SyncStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncStatus::Synced => write!(f, "synced"),
            SyncStatus::OutOfSync => write!(f, "out of sync"),
            SyncStatus::NotPresent => write!(f, "not present"),
            SyncStatus::ToBeDeleted => write!(f, "to be deleted"),
            SyncStatus::ToBeDeletedFromRoot => write!(f, "to be deleted from root"),
            SyncStatus::Unknown => write!(f, "unknown"),
        }
    }
}

/// Fold descendant statuses into one aggregate directory status
///
/// The result does not depend on the order of `statuses`.
pub fn fold_statuses<I>(statuses: I) -> SyncStatus
where
    I: IntoIterator<Item = SyncStatus>,
{
    let mut seen_any = false;
    let mut pending = false;

    for status in statuses {
        seen_any = true;
        match status {
            SyncStatus::Unknown => return SyncStatus::Unknown,
            SyncStatus::Synced => {}
            // Deletions never come out of classification; treat them as work
            SyncStatus::OutOfSync
            | SyncStatus::NotPresent
            | SyncStatus::ToBeDeleted
            | SyncStatus::ToBeDeletedFromRoot => pending = true,
        }
    }

    match (seen_any, pending) {
        (false, _) => SyncStatus::Unknown,
        (true, true) => SyncStatus::OutOfSync,
        (true, false) => SyncStatus::Synced,
    }
}
