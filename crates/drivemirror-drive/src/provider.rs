//! DriveRemoteStore - IRemoteStore implementation for the Google Drive v3 API
//!
//! ## Endpoints
//!
//! | Operation | Request |
//! |-----------|---------|
//! | `list_entries` | `GET {api}/files?q=..&fields=..&pageSize=..&spaces=drive`, following `nextPageToken` |
//! | `create_folder` | `POST {api}/files` with folder metadata |
//! | `create_file` | `POST {upload}/files?uploadType=multipart` (`multipart/related`) |
//! | `delete_entry` | `DELETE {api}/files/{id}`; 404 means already gone |

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use drivemirror_core::config::DriveConfig;
use drivemirror_core::domain::RemoteId;
use drivemirror_core::ports::{DeleteOutcome, EntryQuery, FieldSet, IRemoteStore, RemoteEntry};

use crate::client::DriveClient;
use crate::query::{fields_mask, search_query, FOLDER_MIME_TYPE};
use crate::DriveError;

/// Default number of entries requested per listing page
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Separator between the parts of a multipart upload body
const MULTIPART_BOUNDARY: &str = "drivemirror-7c1f4e0a9b2d4f36";

// ============================================================================
// Drive API request/response types
// ============================================================================

/// One page of `files.list`
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct FileList {
    next_page_token: Option<String>,
    #[serde(default)]
    files: Vec<DriveFile>,
}

/// A file resource, restricted to the requested fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DriveFile {
    id: String,
    name: String,
    #[serde(default)]
    parents: Vec<String>,
    modified_time: Option<DateTime<Utc>>,
    mime_type: Option<String>,
}

/// Metadata sent when creating a file or folder
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct NewFile<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    mime_type: Option<&'a str>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    parents: Vec<&'a str>,
}

/// Response of a create call made with `fields=id`
#[derive(Debug, Deserialize)]
struct CreatedFile {
    id: String,
}

fn remote_id(raw: String) -> Result<RemoteId, DriveError> {
    RemoteId::new(raw).map_err(|e| DriveError::InvalidResponse(e.to_string()))
}

/// Converts a [`DriveFile`] into a port-level [`RemoteEntry`]
///
/// Without a `mimeType` field the folder flag follows the query: a
/// folders-only listing only returns folders.
fn to_entry(file: DriveFile, folders_only: bool) -> Result<RemoteEntry, DriveError> {
    let is_folder = match file.mime_type.as_deref() {
        Some(mime) => mime == FOLDER_MIME_TYPE,
        None => folders_only,
    };
    let parent_ids = file
        .parents
        .into_iter()
        .map(remote_id)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(RemoteEntry {
        id: remote_id(file.id)?,
        name: file.name,
        parent_ids,
        modified_time: file.modified_time,
        is_folder,
    })
}

/// `multipart/related` body: JSON metadata part followed by the content part
fn multipart_body(metadata: &[u8], content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(metadata.len() + data.len() + 256);
    body.extend_from_slice(format!("--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Type: application/json; charset=UTF-8\r\n\r\n");
    body.extend_from_slice(metadata);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}\r\n").as_bytes());
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{MULTIPART_BOUNDARY}--\r\n").as_bytes());
    body
}

// ============================================================================
// DriveRemoteStore
// ============================================================================

/// Remote store backed by the Google Drive v3 API
#[derive(Clone)]
pub struct DriveRemoteStore {
    client: DriveClient,
    page_size: u32,
}

impl DriveRemoteStore {
    /// Creates a new `DriveRemoteStore` wrapping the given client
    pub fn new(client: DriveClient) -> Self {
        Self {
            client,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Creates a store from the `drive` configuration section
    pub fn from_config(config: &DriveConfig, client: DriveClient) -> Self {
        Self::new(client).with_page_size(config.page_size)
    }

    /// Sets the listing page size
    #[must_use]
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    pub fn client(&self) -> &DriveClient {
        &self.client
    }

    async fn list_page(
        &self,
        q: &str,
        fields: &str,
        page_token: Option<&str>,
    ) -> Result<FileList, DriveError> {
        let page_size = self.page_size.to_string();
        let mut params = vec![
            ("q", q),
            ("fields", fields),
            ("pageSize", page_size.as_str()),
            ("spaces", "drive"),
        ];
        if let Some(token) = page_token {
            params.push(("pageToken", token));
        }

        let request = self
            .client
            .get(&self.client.api_url("/files"))
            .await?
            .query(&params);
        let response = self.client.send(request).await?;
        response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(format!("file list: {e}")))
    }

    async fn create(&self, request: reqwest::RequestBuilder) -> Result<RemoteId, DriveError> {
        let response = self.client.send(request).await?;
        let created: CreatedFile = response
            .json()
            .await
            .map_err(|e| DriveError::InvalidResponse(format!("created file: {e}")))?;
        remote_id(created.id)
    }
}

#[async_trait::async_trait]
impl IRemoteStore for DriveRemoteStore {
    #[instrument(skip(self, requested), fields(name = ?query.name, parent = ?query.parent))]
    async fn list_entries(
        &self,
        query: &EntryQuery,
        requested: &FieldSet,
    ) -> Result<Vec<RemoteEntry>> {
        let q = search_query(query);
        let mask = fields_mask(requested);
        let mut entries = Vec::new();
        let mut page_token: Option<String> = None;
        let mut pages = 0u32;

        loop {
            let page = self
                .list_page(&q, &mask, page_token.as_deref())
                .await
                .with_context(|| format!("Failed to list files matching: {q}"))?;
            pages += 1;

            for file in page.files {
                entries.push(to_entry(file, query.folders_only)?);
            }

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        debug!(count = entries.len(), pages, "Listed entries");
        Ok(entries)
    }

    #[instrument(skip(self), fields(parent = ?parent.map(RemoteId::as_str)))]
    async fn create_folder(&self, name: &str, parent: Option<&RemoteId>) -> Result<RemoteId> {
        let metadata = NewFile {
            name,
            mime_type: Some(FOLDER_MIME_TYPE),
            parents: parent.map(|p| vec![p.as_str()]).unwrap_or_default(),
        };

        let request = self
            .client
            .post(&self.client.api_url("/files"))
            .await?
            .query(&[("fields", "id")])
            .json(&metadata);
        let id = self
            .create(request)
            .await
            .with_context(|| format!("Failed to create folder '{name}'"))?;

        debug!(id = %id, "Created folder");
        Ok(id)
    }

    #[instrument(skip(self, data), fields(parent = %parent, bytes = data.len()))]
    async fn create_file(
        &self,
        name: &str,
        parent: &RemoteId,
        content_type: &str,
        data: &[u8],
    ) -> Result<RemoteId> {
        let metadata = serde_json::to_vec(&NewFile {
            name,
            mime_type: Some(content_type),
            parents: vec![parent.as_str()],
        })
        .context("Failed to serialize file metadata")?;

        let request = self
            .client
            .post(&self.client.upload_url("/files"))
            .await?
            .query(&[("uploadType", "multipart"), ("fields", "id")])
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("multipart/related; boundary={MULTIPART_BOUNDARY}"),
            )
            .body(multipart_body(&metadata, content_type, data));
        let id = self
            .create(request)
            .await
            .with_context(|| format!("Failed to upload '{name}'"))?;

        debug!(id = %id, "Uploaded file");
        Ok(id)
    }

    #[instrument(skip(self), fields(id = %id))]
    async fn delete_entry(&self, id: &RemoteId) -> Result<DeleteOutcome> {
        let url = self.client.api_url(&format!("/files/{}", id.as_str()));
        let request = self.client.delete(&url).await?;

        match self.client.send(request).await {
            Ok(_) => Ok(DeleteOutcome::Deleted),
            Err(DriveError::NotFound(_)) => {
                warn!("Entry not found, treating as already deleted");
                Ok(DeleteOutcome::AlreadyGone)
            }
            Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to delete {id}"))),
        }
    }
}
