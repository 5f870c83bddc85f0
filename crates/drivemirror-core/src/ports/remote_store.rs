//! Remote store port (driven/secondary port)
//!
//! This module defines the primitive operations the sync engine needs from a
//! hierarchical remote file store. The primary implementation targets the
//! Google Drive v3 API, and an in-memory implementation backs the engine
//! tests.
//!
//! ## Design Notes
//!
//! - Uses `anyhow::Result` because errors at port boundaries are adapter-specific
//!   and don't need domain-level classification.
//! - Uses `#[async_trait]` for async trait methods.
//! - `RemoteEntry` is a port-level projection; only `id` and `name` are
//!   guaranteed, the rest is filled in when requested through [`FieldSet`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::newtypes::RemoteId;

// ============================================================================
// Entries and queries
// ============================================================================

/// A file or folder as reported by the remote store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteEntry {
    /// Store-specific identifier
    pub id: RemoteId,
    /// Entry name (not a path)
    pub name: String,
    /// Containing folders; empty unless [`EntryField::Parents`] was requested
    pub parent_ids: Vec<RemoteId>,
    /// Last modification time; `None` unless [`EntryField::ModifiedTime`] was requested
    pub modified_time: Option<DateTime<Utc>>,
    /// Whether the entry is a folder; only reliable if [`EntryField::MimeType`]
    /// was requested or the query was folder-only
    pub is_folder: bool,
}

/// Restriction on the containing folder of listed entries
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ParentFilter {
    /// Entries anywhere in the store
    #[default]
    Any,
    /// Entries at the top level of the store
    TopLevel,
    /// Entries directly inside the given folder
    Folder(RemoteId),
}

impl ParentFilter {
    /// Top level for `None`, the given folder otherwise
    pub fn from_parent(parent: Option<&RemoteId>) -> Self {
        match parent {
            Some(id) => ParentFilter::Folder(id.clone()),
            None => ParentFilter::TopLevel,
        }
    }
}

/// Filter for [`IRemoteStore::list_entries`]
///
/// Trashed entries never match.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct EntryQuery {
    /// Exact name match
    pub name: Option<String>,
    /// Containing folder restriction
    pub parent: ParentFilter,
    /// Only match folders
    pub folders_only: bool,
    /// Only match non-folders
    pub files_only: bool,
}

impl EntryQuery {
    /// Every entry directly inside `parent`
    pub fn children_of(parent: &RemoteId) -> Self {
        Self {
            name: None,
            parent: ParentFilter::Folder(parent.clone()),
            folders_only: false,
            files_only: false,
        }
    }

    /// Entries called `name` directly inside `parent`
    pub fn named_in(name: impl Into<String>, parent: ParentFilter) -> Self {
        Self {
            name: Some(name.into()),
            parent,
            folders_only: false,
            files_only: false,
        }
    }

    /// Non-folder entries called `name` directly inside `parent`
    pub fn file_named_in(name: impl Into<String>, parent: ParentFilter) -> Self {
        Self {
            name: Some(name.into()),
            parent,
            folders_only: false,
            files_only: true,
        }
    }

    /// Folders called `name` directly inside `parent`
    pub fn folder_named_in(name: impl Into<String>, parent: ParentFilter) -> Self {
        Self {
            name: Some(name.into()),
            parent,
            folders_only: true,
            files_only: false,
        }
    }
}

/// Optional entry field to fetch on top of `id` and `name`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum EntryField {
    ModifiedTime,
    Parents,
    MimeType,
}

/// Set of optional fields requested from a listing
///
/// `id` and `name` are always fetched and are not part of the set.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct FieldSet(BTreeSet<EntryField>);

impl FieldSet {
    /// Only `id` and `name`
    pub fn minimal() -> Self {
        Self::default()
    }

    /// Add a field
    #[must_use]
    pub fn with(mut self, field: EntryField) -> Self {
        self.0.insert(field);
        self
    }

    pub fn contains(&self, field: EntryField) -> bool {
        self.0.contains(&field)
    }

    pub fn iter(&self) -> impl Iterator<Item = EntryField> + '_ {
        self.0.iter().copied()
    }
}

/// Result of a deletion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The entry existed and was removed
    Deleted,
    /// The entry did not exist (already removed by someone else)
    AlreadyGone,
}

// ============================================================================
// IRemoteStore trait
// ============================================================================

/// Port trait for remote file store operations
///
/// ## Implementation Notes
///
/// - Listings must return every matching entry; implementations follow
///   pagination internally.
/// - No retries are expected from implementations; a failed call surfaces
///   as an error and aborts the current run.
/// - All methods assume valid credentials are available.
#[async_trait::async_trait]
pub trait IRemoteStore: Send + Sync {
    /// Lists entries matching `query`
    ///
    /// # Arguments
    /// * `query` - Name, parent and folder restrictions
    /// * `fields` - Optional fields to fill in on each entry
    async fn list_entries(
        &self,
        query: &EntryQuery,
        fields: &FieldSet,
    ) -> anyhow::Result<Vec<RemoteEntry>>;

    /// Creates a folder
    ///
    /// # Arguments
    /// * `name` - Folder name
    /// * `parent` - Containing folder, or `None` for the top level
    ///
    /// # Returns
    /// The new folder's identifier
    async fn create_folder(&self, name: &str, parent: Option<&RemoteId>)
        -> anyhow::Result<RemoteId>;

    /// Creates a file with the given content
    ///
    /// # Returns
    /// The new file's identifier
    async fn create_file(
        &self,
        name: &str,
        parent: &RemoteId,
        content_type: &str,
        data: &[u8],
    ) -> anyhow::Result<RemoteId>;

    /// Deletes an entry (and, for folders, everything inside it)
    ///
    /// An entry that no longer exists is reported as
    /// [`DeleteOutcome::AlreadyGone`], not as an error.
    async fn delete_entry(&self, id: &RemoteId) -> anyhow::Result<DeleteOutcome>;
}
