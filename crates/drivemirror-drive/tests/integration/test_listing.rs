//! Listing: query parameters, field masks and pagination

use drivemirror_core::domain::RemoteId;
use drivemirror_core::ports::{EntryField, EntryQuery, FieldSet, IRemoteStore, ParentFilter};
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, ResponseTemplate};

use crate::common::{self, TOKEN};

fn id(raw: &str) -> RemoteId {
    RemoteId::new(raw.to_string()).unwrap()
}

#[tokio::test]
async fn test_list_sends_query_fields_and_token() {
    let (server, store) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(header("authorization", format!("Bearer {TOKEN}").as_str()))
        .and(query_param(
            "q",
            "name = 'x.txt' and 'folder1' in parents and trashed = false",
        ))
        .and(query_param("fields", "nextPageToken, files(id, name, modifiedTime)"))
        .and(query_param("pageSize", "100"))
        .and(query_param("spaces", "drive"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [{
                "id": "file1",
                "name": "x.txt",
                "modifiedTime": "2024-05-01T08:30:00.123Z"
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let query = EntryQuery::named_in("x.txt", ParentFilter::Folder(id("folder1")));
    let fields = FieldSet::minimal().with(EntryField::ModifiedTime);
    let entries = store.list_entries(&query, &fields).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].id, id("file1"));
    assert_eq!(entries[0].name, "x.txt");
    assert_eq!(
        entries[0].modified_time.unwrap().timestamp_millis(),
        1_714_552_200_123
    );
}

#[tokio::test]
async fn test_list_top_level_folders() {
    let (server, store) = common::setup_drive_mock().await;
    common::mount_list(
        &server,
        "name = 'Backup' and 'root' in parents and \
         mimeType = 'application/vnd.google-apps.folder' and trashed = false",
        serde_json::json!([common::file_json("backup1", "Backup")]),
    )
    .await;

    let query = EntryQuery::folder_named_in("Backup", ParentFilter::TopLevel);
    let entries = store.list_entries(&query, &FieldSet::minimal()).await.unwrap();

    assert_eq!(entries.len(), 1);
    assert!(entries[0].is_folder);
}

#[tokio::test]
async fn test_list_empty_result() {
    let (server, store) = common::setup_drive_mock().await;
    common::mount_list(
        &server,
        "'folder1' in parents and trashed = false",
        serde_json::json!([]),
    )
    .await;

    let entries = store
        .list_entries(&EntryQuery::children_of(&id("folder1")), &FieldSet::minimal())
        .await
        .unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_list_follows_pagination() {
    let (server, store) = common::setup_drive_mock().await;
    let store = store.with_page_size(2);

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageSize", "2"))
        .and(query_param_is_missing("pageToken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "page-2",
            "files": [common::file_json("a", "a.txt"), common::file_json("b", "b.txt")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageToken", "page-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "nextPageToken": "page-3",
            "files": [common::file_json("c", "c.txt"), common::file_json("d", "d.txt")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("pageToken", "page-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [common::file_json("e", "e.txt")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let entries = store
        .list_entries(&EntryQuery::children_of(&id("folder1")), &FieldSet::minimal())
        .await
        .unwrap();

    let names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    assert_eq!(names, vec!["a.txt", "b.txt", "c.txt", "d.txt", "e.txt"]);
}

#[tokio::test]
async fn test_list_reports_parents_and_mime_type() {
    let (server, store) = common::setup_drive_mock().await;

    Mock::given(method("GET"))
        .and(path("/drive/v3/files"))
        .and(query_param("fields", "nextPageToken, files(id, name, parents, mimeType)"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "files": [
                {
                    "id": "d1",
                    "name": "Sub",
                    "parents": ["folder1"],
                    "mimeType": "application/vnd.google-apps.folder"
                },
                {
                    "id": "f1",
                    "name": "doc.pdf",
                    "parents": ["folder1"],
                    "mimeType": "application/pdf"
                }
            ]
        })))
        .mount(&server)
        .await;

    let fields = FieldSet::minimal()
        .with(EntryField::Parents)
        .with(EntryField::MimeType);
    let entries = store
        .list_entries(&EntryQuery::children_of(&id("folder1")), &fields)
        .await
        .unwrap();

    assert!(entries[0].is_folder);
    assert!(!entries[1].is_folder);
    assert_eq!(entries[1].parent_ids, vec![id("folder1")]);
}
