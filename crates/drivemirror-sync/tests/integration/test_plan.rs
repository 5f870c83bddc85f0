//! Planning: action lists for uploads, replacements and deletions

use drivemirror_core::domain::{SyncAction, SyncStatus};
use drivemirror_sync::SyncError;

use crate::common::{rel, remote_time, Harness};

#[tokio::test]
async fn plan_stale_and_missing_files() {
    let h = Harness::new();
    h.write_at("A/x.txt", b"new x");
    h.write_at("A/y.txt", b"new y");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("x.txt", &a, remote_time(-5_000), b"old x");

    let actions = h
        .engine
        .plan_actions(&[rel("A/x.txt"), rel("A/y.txt")])
        .await
        .unwrap();

    assert_eq!(
        actions,
        vec![
            SyncAction::replace(rel("A/x.txt"), a.clone()),
            SyncAction::upload(rel("A/y.txt"), a),
        ]
    );
}

#[tokio::test]
async fn plan_deletes_orphan_in_tracked_directory() {
    let h = Harness::new();
    h.write_at("A/p.txt", b"p");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("p.txt", &a, remote_time(0), b"p");
    let stale = h.store.insert_file("stale.txt", &a, remote_time(0), b"s");

    let actions = h.engine.plan_actions(&[rel("A")]).await.unwrap();

    assert_eq!(actions, vec![SyncAction::delete_in_folder("stale.txt", stale)]);
    assert_eq!(actions[0].status(), SyncStatus::ToBeDeleted);
}

#[tokio::test]
async fn plan_deletes_untracked_top_level_entries() {
    let h = Harness::new();
    h.write_at("Docs/a.txt", b"a");
    let backup = h.remote_backup();
    let docs = h.store.insert_folder("Docs", Some(&backup));
    h.store.insert_file("a.txt", &docs, remote_time(1_000), b"a");
    let music = h.store.insert_folder("Music", Some(&backup));
    let loose = h.store.insert_file("loose.txt", &backup, remote_time(0), b"l");

    let actions = h.engine.plan_actions(&[rel("Docs")]).await.unwrap();

    assert_eq!(
        actions,
        vec![
            SyncAction::delete_from_root("Music", music),
            SyncAction::delete_from_root("loose.txt", loose),
        ]
    );
}

#[tokio::test]
async fn plan_keeps_top_level_folder_of_tracked_file() {
    let h = Harness::new();
    h.write_at("A/x.txt", b"x");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("x.txt", &a, remote_time(0), b"x");
    // not tracked, but lives under a tracked top-level name
    h.store.insert_file("other.txt", &a, remote_time(0), b"o");

    let actions = h.engine.plan_actions(&[rel("A/x.txt")]).await.unwrap();
    assert!(actions.is_empty());
}

#[tokio::test]
async fn plan_directory_replaces_by_timestamp() {
    let h = Harness::new();
    h.write_at("A/same.txt", b"s");
    h.write_at("A/newer_remote.txt", b"n");
    h.write_at("A/older_remote.txt", b"o");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("same.txt", &a, remote_time(0), b"s");
    h.store.insert_file("newer_remote.txt", &a, remote_time(1), b"n");
    h.store.insert_file("older_remote.txt", &a, remote_time(-1), b"o");

    let actions = h.engine.plan_actions(&[rel("A")]).await.unwrap();
    assert_eq!(actions, vec![SyncAction::replace(rel("A/older_remote.txt"), a)]);
}

#[tokio::test]
async fn plan_empty_directory_creates_only_its_folder() {
    let h = Harness::new();
    h.mkdir("Empty");

    let actions = h.engine.plan_actions(&[rel("Empty")]).await.unwrap();

    assert!(actions.is_empty());
    let backup = h.backup_id();
    let empty = h.child_id(&backup, "Empty");
    assert!(h.store.child_names(&empty).is_empty());
    assert_eq!(h.store.folder_count(), 2);
    assert_eq!(h.store.file_count(), 0);
}

#[tokio::test]
async fn plan_fails_for_missing_tracked_path() {
    let h = Harness::new();
    h.write_at("present.txt", b"p");

    let result = h
        .engine
        .plan_actions(&[rel("present.txt"), rel("missing.txt")])
        .await;

    match result {
        Err(SyncError::LocalFileMissing(path)) => {
            assert_eq!(path, h.base().join("missing.txt"));
        }
        other => panic!("expected LocalFileMissing, got {other:?}"),
    }
}

#[tokio::test]
async fn plan_surfaces_duplicate_remote_files() {
    let h = Harness::new();
    h.write_at("dup.txt", b"d");
    let backup = h.remote_backup();
    h.store.insert_file("dup.txt", &backup, remote_time(0), b"1");
    h.store.insert_file("dup.txt", &backup, remote_time(0), b"2");

    let result = h.engine.plan_actions(&[rel("dup.txt")]).await;
    assert!(matches!(
        result,
        Err(SyncError::Consistency { ref name, count: 2, .. }) if name == "dup.txt"
    ));
}

#[tokio::test]
async fn plan_surfaces_duplicate_remote_folders() {
    let h = Harness::new();
    h.write_at("A/x.txt", b"x");
    let backup = h.remote_backup();
    h.store.insert_folder("A", Some(&backup));
    h.store.insert_folder("A", Some(&backup));

    let result = h.engine.plan_actions(&[rel("A/x.txt")]).await;
    assert!(matches!(result, Err(SyncError::Consistency { count: 2, .. })));
}

#[tokio::test]
async fn plan_twice_without_changes_is_stable() {
    let h = Harness::new();
    h.write_at("A/x.txt", b"x");

    let first = h.engine.plan_actions(&[rel("A")]).await.unwrap();
    let second = h.engine.plan_actions(&[rel("A")]).await.unwrap();

    assert_eq!(first, second);
    assert_eq!(h.store.folder_count(), 2);
}

#[tokio::test]
async fn plan_selected_leaves_other_tracked_paths_alone() {
    let h = Harness::new();
    h.write_at("A/a.txt", b"new a");
    h.write_at("B/b.txt", b"b");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("a.txt", &a, remote_time(-5_000), b"old a");
    let b = h.store.insert_folder("B", Some(&backup));
    h.store.insert_file("b.txt", &b, remote_time(-5_000), b"old b");

    let actions = h
        .engine
        .plan_selected(&[rel("A"), rel("B")], &[rel("A")])
        .await
        .unwrap();

    assert_eq!(actions, vec![SyncAction::replace(rel("A/a.txt"), a)]);
}

#[tokio::test]
async fn plan_selected_still_drops_untracked_top_level_entries() {
    let h = Harness::new();
    h.write_at("A/a.txt", b"a");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("a.txt", &a, remote_time(1_000), b"a");
    h.store.insert_folder("B", Some(&backup));
    let old = h.store.insert_folder("Old", Some(&backup));

    let actions = h
        .engine
        .plan_selected(&[rel("A"), rel("B")], &[rel("A/a.txt")])
        .await
        .unwrap();

    assert_eq!(actions, vec![SyncAction::delete_from_root("Old", old)]);
}

#[tokio::test]
async fn plan_selected_rejects_untracked_path() {
    let h = Harness::new();
    h.write_at("A/a.txt", b"a");
    h.write_at("Other/o.txt", b"o");

    let result = h
        .engine
        .plan_selected(&[rel("A")], &[rel("Other/o.txt")])
        .await;

    assert!(matches!(result, Err(SyncError::NotTracked(ref p)) if *p == rel("Other/o.txt")));
    assert_eq!(h.store.folder_count(), 0);
}

#[tokio::test]
async fn plan_uploads_file_shadowed_by_remote_folder() {
    let h = Harness::new();
    h.write_at("A/x", b"now a file");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    let shadow = h.store.insert_folder("x", Some(&a));
    h.store.insert_file("inside.txt", &shadow, remote_time(1_000), b"i");

    let actions = h.engine.plan_actions(&[rel("A")]).await.unwrap();

    assert_eq!(
        actions,
        vec![
            SyncAction::upload(rel("A/x"), a.clone()),
            SyncAction::delete_in_folder("x", shadow),
        ]
    );
}

#[tokio::test]
async fn plan_replaces_remote_file_with_folder() {
    let h = Harness::new();
    h.write_at("A/d/f.txt", b"f");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    let old_file = h.store.insert_file("d", &a, remote_time(1_000), b"was a file");

    let actions = h.engine.plan_actions(&[rel("A")]).await.unwrap();

    assert_eq!(actions.len(), 2);
    assert_eq!(actions[0].status(), SyncStatus::NotPresent);
    assert_eq!(actions[0].local_path(), Some(&rel("A/d/f.txt")));
    assert_eq!(actions[1], SyncAction::delete_in_folder("d", old_file));
}
