//! Path mapping and remote folder resolution
//!
//! A local path `A/b/c.txt` under the base directory mirrors to
//! `/<backup folder>/A/b/c.txt` in the remote store. Remote folders are
//! addressed by id, so every path segment has to be resolved with a
//! name + parent query. Nothing is cached between calls.
//!
//! Resolve-or-create is not transactional: two runs creating the same
//! folder at the same time can both succeed, and the duplicate then shows
//! up as [`SyncError::Consistency`] on the next lookup.

use std::sync::Arc;

use drivemirror_core::domain::{DomainError, RelativePath, RemoteId, RemotePath};
use drivemirror_core::ports::{
    EntryField, EntryQuery, FieldSet, IRemoteStore, ParentFilter, RemoteEntry,
};
use tracing::{debug, info, instrument};

use crate::SyncError;

/// Translates between local and remote paths and resolves folder ids
#[derive(Clone)]
pub struct PathMapper {
    store: Arc<dyn IRemoteStore>,
    backup_root: RemotePath,
}

impl PathMapper {
    /// Create a mapper rooted at the top-level folder `backup_folder`
    ///
    /// # Errors
    /// Returns error if `backup_folder` is not a valid single path segment
    pub fn new(store: Arc<dyn IRemoteStore>, backup_folder: &str) -> Result<Self, DomainError> {
        let backup_root = RemotePath::root().join(backup_folder)?;
        Ok(Self { store, backup_root })
    }

    /// Remote path of the backup folder itself
    pub fn backup_root(&self) -> &RemotePath {
        &self.backup_root
    }

    /// Remote path mirroring the local `path`
    pub fn remote_path_for(&self, path: &RelativePath) -> Result<RemotePath, DomainError> {
        path.components()
            .try_fold(self.backup_root.clone(), |acc, segment| acc.join(segment))
    }

    /// Remote path of the folder that holds the mirror of `path`
    pub fn remote_parent_for(&self, path: &RelativePath) -> Result<RemotePath, DomainError> {
        match path.parent() {
            Some(parent) => self.remote_path_for(&parent),
            None => Ok(self.backup_root.clone()),
        }
    }

    /// Local path mirrored by `remote`, or `None` if `remote` is not strictly
    /// inside the backup folder
    pub fn local_path_for(&self, remote: &RemotePath) -> Option<RelativePath> {
        let mut segments = remote.segments();
        let mut root = self.backup_root.segments();
        if segments.next()? != root.next()? {
            return None;
        }
        let rest: Vec<&str> = segments.collect();
        if rest.is_empty() {
            return None;
        }
        RelativePath::new(rest.join("/")).ok()
    }

    /// Look up the folder at `path` without creating anything
    ///
    /// Returns `None` as soon as one segment is missing.
    #[instrument(skip(self), fields(path = %path))]
    pub async fn resolve_folder(&self, path: &RemotePath) -> Result<Option<RemoteId>, SyncError> {
        let mut parent: Option<RemoteId> = None;

        for segment in path.segments() {
            let query =
                EntryQuery::folder_named_in(segment, ParentFilter::from_parent(parent.as_ref()));
            match self.find_unique(&query, &FieldSet::minimal()).await? {
                Some(entry) => parent = Some(entry.id),
                None => {
                    debug!(segment, "folder not found");
                    return Ok(None);
                }
            }
        }

        if parent.is_none() {
            return Err(root_has_no_id(path).into());
        }
        Ok(parent)
    }

    /// Look up the folder at `path`, creating every missing segment
    #[instrument(skip(self), fields(path = %path))]
    pub async fn resolve_or_create_folder(&self, path: &RemotePath) -> Result<RemoteId, SyncError> {
        let mut parent: Option<RemoteId> = None;

        for segment in path.segments() {
            let query =
                EntryQuery::folder_named_in(segment, ParentFilter::from_parent(parent.as_ref()));
            let id = match self.find_unique(&query, &FieldSet::minimal()).await? {
                Some(entry) => entry.id,
                None => {
                    let id = self
                        .store
                        .create_folder(segment, parent.as_ref())
                        .await
                        .map_err(|e| SyncError::remote("create_folder", e))?;
                    info!(segment, id = %id, "Created remote folder");
                    id
                }
            };
            parent = Some(id);
        }

        parent.ok_or_else(|| root_has_no_id(path).into())
    }

    /// Run `query` and expect at most one match
    ///
    /// # Errors
    /// Returns [`SyncError::Consistency`] when two or more entries match
    pub async fn find_unique(
        &self,
        query: &EntryQuery,
        fields: &FieldSet,
    ) -> Result<Option<RemoteEntry>, SyncError> {
        let mut entries = self
            .store
            .list_entries(query, fields)
            .await
            .map_err(|e| SyncError::remote("list_entries", e))?;

        match entries.len() {
            0 => Ok(None),
            1 => Ok(entries.pop()),
            count => Err(SyncError::Consistency {
                name: query.name.clone().unwrap_or_default(),
                parent: describe_parent(&query.parent),
                count,
            }),
        }
    }

    /// Every entry directly inside `folder`
    pub async fn list_children(&self, folder: &RemoteId) -> Result<Vec<RemoteEntry>, SyncError> {
        self.store
            .list_entries(
                &EntryQuery::children_of(folder),
                &FieldSet::minimal().with(EntryField::MimeType),
            )
            .await
            .map_err(|e| SyncError::remote("list_entries", e))
    }
}

fn root_has_no_id(path: &RemotePath) -> DomainError {
    DomainError::InvalidRemotePath(format!("no folder id for {path}"))
}

fn describe_parent(parent: &ParentFilter) -> String {
    match parent {
        ParentFilter::Any => "any folder".to_string(),
        ParentFilter::TopLevel => "the top level".to_string(),
        ParentFilter::Folder(id) => format!("folder {id}"),
    }
}
