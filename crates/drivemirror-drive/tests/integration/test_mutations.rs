//! Folder creation, multipart uploads and deletions

use drivemirror_core::domain::RemoteId;
use drivemirror_core::ports::{DeleteOutcome, IRemoteStore};
use wiremock::matchers::{body_json, body_string_contains, header_regex, method, path, query_param};
use wiremock::{Mock, ResponseTemplate};

use crate::common;

fn id(raw: &str) -> RemoteId {
    RemoteId::new(raw.to_string()).unwrap()
}

#[tokio::test]
async fn test_create_top_level_folder() {
    let (server, store) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .and(body_json(serde_json::json!({
            "name": "DriveMirror Backup",
            "mimeType": "application/vnd.google-apps.folder"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "new1"})))
        .expect(1)
        .mount(&server)
        .await;

    let created = store.create_folder("DriveMirror Backup", None).await.unwrap();
    assert_eq!(created, id("new1"));
}

#[tokio::test]
async fn test_create_nested_folder() {
    let (server, store) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/drive/v3/files"))
        .and(query_param("fields", "id"))
        .and(body_json(serde_json::json!({
            "name": "A",
            "mimeType": "application/vnd.google-apps.folder",
            "parents": ["backup1"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "a1"})))
        .expect(1)
        .mount(&server)
        .await;

    let created = store.create_folder("A", Some(&id("backup1"))).await.unwrap();
    assert_eq!(created, id("a1"));
}

#[tokio::test]
async fn test_upload_is_multipart_related() {
    let (server, store) = common::setup_drive_mock().await;

    Mock::given(method("POST"))
        .and(path("/upload/drive/v3/files"))
        .and(query_param("uploadType", "multipart"))
        .and(header_regex("content-type", "^multipart/related; boundary=.+$"))
        .and(body_string_contains(r#""name":"notes.txt""#))
        .and(body_string_contains(r#""parents":["a1"]"#))
        .and(body_string_contains("Content-Type: text/plain\r\n\r\nhello drive\r\n"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"id": "f9"})))
        .expect(1)
        .mount(&server)
        .await;

    let created = store
        .create_file("notes.txt", &id("a1"), "text/plain", b"hello drive")
        .await
        .unwrap();
    assert_eq!(created, id("f9"));
}

#[tokio::test]
async fn test_upload_empty_file() {
    let (server, store) = common::setup_drive_mock().await;
    common::mount_create(&server, "/upload/drive/v3/files", "empty1").await;

    let created = store
        .create_file("empty.bin", &id("a1"), "application/octet-stream", b"")
        .await
        .unwrap();
    assert_eq!(created, id("empty1"));
}

#[tokio::test]
async fn test_delete_existing_entry() {
    let (server, store) = common::setup_drive_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/f1"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    let outcome = store.delete_entry(&id("f1")).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::Deleted);
}

#[tokio::test]
async fn test_delete_missing_entry_is_already_gone() {
    let (server, store) = common::setup_drive_mock().await;

    Mock::given(method("DELETE"))
        .and(path("/drive/v3/files/gone1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": {"code": 404, "message": "File not found: gone1."}
        })))
        .mount(&server)
        .await;

    let outcome = store.delete_entry(&id("gone1")).await.unwrap();
    assert_eq!(outcome, DeleteOutcome::AlreadyGone);
}
