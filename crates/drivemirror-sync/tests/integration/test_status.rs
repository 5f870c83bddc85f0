//! Status aggregation: per-path statuses without side effects

use drivemirror_core::domain::SyncStatus;
use drivemirror_sync::SyncError;

use crate::common::{rel, remote_time, Harness};

#[tokio::test]
async fn status_of_single_files() {
    let h = Harness::new();
    h.write_at("A/synced.txt", b"s");
    h.write_at("A/stale.txt", b"t");
    h.write_at("A/absent.txt", b"a");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("synced.txt", &a, remote_time(0), b"s");
    h.store.insert_file("stale.txt", &a, remote_time(-1), b"t");

    let tracked = [rel("A/synced.txt"), rel("A/stale.txt"), rel("A/absent.txt")];
    let statuses = h.engine.check_status(&tracked, |_, _| {}).await.unwrap();

    assert_eq!(statuses[&rel("A/synced.txt")], SyncStatus::Synced);
    assert_eq!(statuses[&rel("A/stale.txt")], SyncStatus::OutOfSync);
    assert_eq!(statuses[&rel("A/absent.txt")], SyncStatus::NotPresent);
}

#[tokio::test]
async fn status_folds_directory_contents() {
    let h = Harness::new();
    h.write_at("Clean/a.txt", b"a");
    h.write_at("Clean/sub/b.txt", b"b");
    h.write_at("Dirty/a.txt", b"a");
    h.write_at("Dirty/sub/new.txt", b"n");
    let backup = h.remote_backup();

    let clean = h.store.insert_folder("Clean", Some(&backup));
    h.store.insert_file("a.txt", &clean, remote_time(0), b"a");
    let clean_sub = h.store.insert_folder("sub", Some(&clean));
    h.store.insert_file("b.txt", &clean_sub, remote_time(10), b"b");

    let dirty = h.store.insert_folder("Dirty", Some(&backup));
    h.store.insert_file("a.txt", &dirty, remote_time(0), b"a");

    let statuses = h
        .engine
        .check_status(&[rel("Clean"), rel("Dirty")], |_, _| {})
        .await
        .unwrap();

    assert_eq!(statuses[&rel("Clean")], SyncStatus::Synced);
    assert_eq!(statuses[&rel("Dirty")], SyncStatus::OutOfSync);
}

#[tokio::test]
async fn status_of_directory_without_files_is_unknown() {
    let h = Harness::new();
    h.mkdir("Hollow/inner");

    let statuses = h
        .engine
        .check_status(&[rel("Hollow")], |_, _| {})
        .await
        .unwrap();
    assert_eq!(statuses[&rel("Hollow")], SyncStatus::Unknown);
}

#[tokio::test]
async fn empty_subdirectory_makes_parent_unknown() {
    let h = Harness::new();
    h.write_at("D/a.txt", b"a");
    h.mkdir("D/empty");
    h.engine.synchronize(&[rel("D/a.txt")], |_| {}).await.unwrap();

    let statuses = h
        .engine
        .check_status(&[rel("D"), rel("D/a.txt")], |_, _| {})
        .await
        .unwrap();

    assert_eq!(statuses[&rel("D/a.txt")], SyncStatus::Synced);
    assert_eq!(statuses[&rel("D")], SyncStatus::Unknown);
}

#[tokio::test]
async fn nested_directory_contributes_its_folded_status() {
    let h = Harness::new();
    h.write_at("D/a.txt", b"a");
    h.write_at("D/sub/b.txt", b"b");
    h.engine.synchronize(&[rel("D/a.txt")], |_| {}).await.unwrap();

    let statuses = h
        .engine
        .check_status(&[rel("D")], |_, _| {})
        .await
        .unwrap();
    assert_eq!(statuses[&rel("D")], SyncStatus::OutOfSync);
}

#[tokio::test]
async fn status_reports_progress_in_order() {
    let h = Harness::new();
    h.write_at("b.txt", b"b");
    h.write_at("a.txt", b"a");

    let mut seen = Vec::new();
    h.engine
        .check_status(&[rel("b.txt"), rel("a.txt")], |path, status| {
            seen.push((path.to_string(), status))
        })
        .await
        .unwrap();

    assert_eq!(
        seen,
        vec![
            ("b.txt".to_string(), SyncStatus::NotPresent),
            ("a.txt".to_string(), SyncStatus::NotPresent),
        ]
    );
}

#[tokio::test]
async fn status_never_writes_to_the_remote() {
    let h = Harness::new();
    h.write_at("A/B/deep.txt", b"d");

    h.engine
        .check_status(&[rel("A"), rel("A/B/deep.txt")], |_, _| {})
        .await
        .unwrap();

    assert!(h.store.calls().is_empty());
    assert_eq!(h.store.folder_count(), 0);
}

#[tokio::test]
async fn status_fails_for_missing_tracked_path() {
    let h = Harness::new();
    let result = h.engine.check_status(&[rel("ghost")], |_, _| {}).await;
    assert!(matches!(result, Err(SyncError::LocalFileMissing(_))));
}
