//! In-memory remote store
//!
//! A complete [`IRemoteStore`] kept in process memory, compiled for tests
//! and behind the `test-util` feature. The engine tests run against it.
//! Besides the port it offers seeding helpers (to build a remote tree with
//! chosen timestamps), inspection helpers, a log of mutating calls, and
//! failure injection.

use std::sync::{Mutex, MutexGuard};

use anyhow::{anyhow, bail};
use chrono::{DateTime, Utc};
use drivemirror_core::domain::RemoteId;
use drivemirror_core::ports::{
    DeleteOutcome, EntryField, EntryQuery, FieldSet, IRemoteStore, ParentFilter, RemoteEntry,
};
use tracing::debug;

/// Store operation, used for failure injection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreOperation {
    List,
    CreateFolder,
    CreateFile,
    Delete,
}

#[derive(Debug, Clone)]
struct StoredEntry {
    id: RemoteId,
    name: String,
    parent: Option<RemoteId>,
    is_folder: bool,
    modified_time: DateTime<Utc>,
    content_type: Option<String>,
    content: Vec<u8>,
}

impl StoredEntry {
    fn project(&self, fields: &FieldSet) -> RemoteEntry {
        RemoteEntry {
            id: self.id.clone(),
            name: self.name.clone(),
            parent_ids: if fields.contains(EntryField::Parents) {
                self.parent.iter().cloned().collect()
            } else {
                Vec::new()
            },
            modified_time: fields
                .contains(EntryField::ModifiedTime)
                .then_some(self.modified_time),
            is_folder: self.is_folder,
        }
    }
}

#[derive(Debug, Default)]
struct State {
    entries: Vec<StoredEntry>,
    next_id: u64,
    calls: Vec<String>,
    failures: Vec<(StoreOperation, Option<String>)>,
}

impl State {
    fn allocate_id(&mut self) -> RemoteId {
        self.next_id += 1;
        // "mem-<n>" only contains characters RemoteId accepts
        RemoteId::new(format!("mem-{}", self.next_id)).unwrap_or_else(|_| unreachable!())
    }

    fn find(&self, id: &RemoteId) -> Option<&StoredEntry> {
        self.entries.iter().find(|e| &e.id == id)
    }

    fn check_folder(&self, id: &RemoteId) -> anyhow::Result<()> {
        match self.find(id) {
            Some(entry) if entry.is_folder => Ok(()),
            Some(_) => bail!("parent {id} is not a folder"),
            None => bail!("parent {id} not found"),
        }
    }

    fn should_fail(&self, op: StoreOperation, name: Option<&str>) -> bool {
        self.failures.iter().any(|(failing_op, failing_name)| {
            *failing_op == op
                && match failing_name {
                    None => true,
                    Some(n) => Some(n.as_str()) == name,
                }
        })
    }

    fn insert(
        &mut self,
        name: &str,
        parent: Option<&RemoteId>,
        is_folder: bool,
        modified_time: DateTime<Utc>,
        content_type: Option<String>,
        content: Vec<u8>,
    ) -> RemoteId {
        let id = self.allocate_id();
        self.entries.push(StoredEntry {
            id: id.clone(),
            name: name.to_string(),
            parent: parent.cloned(),
            is_folder,
            modified_time,
            content_type,
            content,
        });
        id
    }

    fn remove_tree(&mut self, id: &RemoteId) {
        let mut doomed = vec![id.clone()];
        let mut idx = 0;
        while idx < doomed.len() {
            let current = doomed[idx].clone();
            doomed.extend(
                self.entries
                    .iter()
                    .filter(|e| e.parent.as_ref() == Some(&current))
                    .map(|e| e.id.clone()),
            );
            idx += 1;
        }
        self.entries.retain(|e| !doomed.contains(&e.id));
    }
}

/// Remote store held entirely in memory
#[derive(Debug, Default)]
pub struct InMemoryRemoteStore {
    state: Mutex<State>,
}

impl InMemoryRemoteStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    // --- seeding ---

    /// Insert a folder without going through the port (not logged)
    pub fn insert_folder(&self, name: &str, parent: Option<&RemoteId>) -> RemoteId {
        self.lock()
            .insert(name, parent, true, Utc::now(), None, Vec::new())
    }

    /// Insert a file with a chosen modification time (not logged)
    pub fn insert_file(
        &self,
        name: &str,
        parent: &RemoteId,
        modified_time: DateTime<Utc>,
        content: &[u8],
    ) -> RemoteId {
        self.lock().insert(
            name,
            Some(parent),
            false,
            modified_time,
            None,
            content.to_vec(),
        )
    }

    /// Remove an entry and its descendants without going through the port,
    /// as if someone else deleted it
    pub fn evict(&self, id: &RemoteId) {
        self.lock().remove_tree(id);
    }

    /// Make every later call of `op` fail; with `name`, only calls that
    /// concern an entry of that name
    pub fn fail_on(&self, op: StoreOperation, name: Option<&str>) {
        self.lock().failures.push((op, name.map(str::to_string)));
    }

    // --- inspection ---

    /// Full projection of one entry
    pub fn entry(&self, id: &RemoteId) -> Option<RemoteEntry> {
        let all = FieldSet::minimal()
            .with(EntryField::ModifiedTime)
            .with(EntryField::Parents)
            .with(EntryField::MimeType);
        self.lock().find(id).map(|e| e.project(&all))
    }

    /// Entries named `name` directly under `parent` (`None` for top level)
    pub fn find(&self, name: &str, parent: Option<&RemoteId>) -> Vec<RemoteEntry> {
        let all = FieldSet::minimal().with(EntryField::ModifiedTime);
        self.lock()
            .entries
            .iter()
            .filter(|e| e.name == name && e.parent.as_ref() == parent)
            .map(|e| e.project(&all))
            .collect()
    }

    /// Sorted names of the entries directly inside `parent`
    pub fn child_names(&self, parent: &RemoteId) -> Vec<String> {
        let mut names: Vec<String> = self
            .lock()
            .entries
            .iter()
            .filter(|e| e.parent.as_ref() == Some(parent))
            .map(|e| e.name.clone())
            .collect();
        names.sort();
        names
    }

    pub fn content(&self, id: &RemoteId) -> Option<Vec<u8>> {
        self.lock().find(id).map(|e| e.content.clone())
    }

    pub fn content_type(&self, id: &RemoteId) -> Option<String> {
        self.lock().find(id).and_then(|e| e.content_type.clone())
    }

    pub fn folder_count(&self) -> usize {
        self.lock().entries.iter().filter(|e| e.is_folder).count()
    }

    pub fn file_count(&self) -> usize {
        self.lock().entries.iter().filter(|e| !e.is_folder).count()
    }

    /// Mutating calls made through the port, e.g. `create_file x.txt`
    pub fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }
}

#[async_trait::async_trait]
impl IRemoteStore for InMemoryRemoteStore {
    async fn list_entries(
        &self,
        query: &EntryQuery,
        fields: &FieldSet,
    ) -> anyhow::Result<Vec<RemoteEntry>> {
        let state = self.lock();
        if state.should_fail(StoreOperation::List, query.name.as_deref()) {
            bail!("injected list failure");
        }

        let entries: Vec<RemoteEntry> = state
            .entries
            .iter()
            .filter(|e| query.name.as_deref().map_or(true, |n| e.name == n))
            .filter(|e| match &query.parent {
                ParentFilter::Any => true,
                ParentFilter::TopLevel => e.parent.is_none(),
                ParentFilter::Folder(id) => e.parent.as_ref() == Some(id),
            })
            .filter(|e| !query.folders_only || e.is_folder)
            .filter(|e| !query.files_only || !e.is_folder)
            .map(|e| e.project(fields))
            .collect();

        debug!(count = entries.len(), "in-memory listing");
        Ok(entries)
    }

    async fn create_folder(
        &self,
        name: &str,
        parent: Option<&RemoteId>,
    ) -> anyhow::Result<RemoteId> {
        let mut state = self.lock();
        if state.should_fail(StoreOperation::CreateFolder, Some(name)) {
            bail!("injected create_folder failure for {name}");
        }
        if let Some(parent) = parent {
            state.check_folder(parent)?;
        }
        state.calls.push(format!("create_folder {name}"));
        Ok(state.insert(name, parent, true, Utc::now(), None, Vec::new()))
    }

    async fn create_file(
        &self,
        name: &str,
        parent: &RemoteId,
        content_type: &str,
        data: &[u8],
    ) -> anyhow::Result<RemoteId> {
        let mut state = self.lock();
        if state.should_fail(StoreOperation::CreateFile, Some(name)) {
            bail!("injected create_file failure for {name}");
        }
        state.check_folder(parent)?;
        state.calls.push(format!("create_file {name}"));
        Ok(state.insert(
            name,
            Some(parent),
            false,
            Utc::now(),
            Some(content_type.to_string()),
            data.to_vec(),
        ))
    }

    async fn delete_entry(&self, id: &RemoteId) -> anyhow::Result<DeleteOutcome> {
        let mut state = self.lock();
        let name = state.find(id).map(|e| e.name.clone());
        if state.should_fail(StoreOperation::Delete, name.as_deref()) {
            return Err(anyhow!("injected delete failure for {id}"));
        }
        match name {
            Some(name) => {
                state.calls.push(format!("delete {name}"));
                state.remove_tree(id);
                Ok(DeleteOutcome::Deleted)
            }
            None => Ok(DeleteOutcome::AlreadyGone),
        }
    }
}
