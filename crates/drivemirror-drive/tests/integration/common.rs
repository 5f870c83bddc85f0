//! Shared test helpers for Drive API integration tests
//!
//! Each helper mounts mock endpoints on a wiremock server; [`setup_drive_mock`]
//! returns a store whose metadata and upload base URLs both point at it.

use std::sync::Arc;

use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use drivemirror_drive::{DriveClient, DriveRemoteStore, StaticCredentials};

pub const TOKEN: &str = "test-access-token";

/// Starts a mock server and returns a store pointed at it
///
/// Metadata requests go to `/drive/v3`, uploads to `/upload/drive/v3`.
pub async fn setup_drive_mock() -> (MockServer, DriveRemoteStore) {
    let server = MockServer::start().await;
    let client = DriveClient::with_base_urls(
        Arc::new(StaticCredentials::new(TOKEN)),
        format!("{}/drive/v3", server.uri()),
        format!("{}/upload/drive/v3", server.uri()),
    )
    .expect("build client");
    (server, DriveRemoteStore::new(client))
}

/// JSON for one listed file
pub fn file_json(id: &str, name: &str) -> serde_json::Value {
    serde_json::json!({ "id": id, "name": name })
}

/// Mounts `files.list` returning a single page for query `q`
pub async fn mount_list(server: &MockServer, q: &str, files: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("q", q))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": files
        })))
        .mount(server)
        .await;
}

/// Mounts a create endpoint returning `id`
pub async fn mount_create(server: &MockServer, endpoint: &str, id: &str) {
    Mock::given(method("POST"))
        .and(path(endpoint))
        .and(query_param("fields", "id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "id": id })))
        .mount(server)
        .await;
}
