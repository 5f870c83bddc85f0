//! Plan-then-apply runs against the in-memory store

use drivemirror_core::domain::{SyncAction, SyncStatus};
use drivemirror_sync::memory::StoreOperation;
use drivemirror_sync::{SyncError, TransferProgress};
use tokio_util::sync::CancellationToken;

use crate::common::{rel, remote_time, Harness};

#[tokio::test]
async fn replace_stale_and_upload_missing() {
    let h = Harness::new();
    h.write_at("A/x.txt", b"new x");
    h.write_at("A/y.txt", b"new y");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("x.txt", &a, remote_time(-5_000), b"old x");

    let tracked = [rel("A/x.txt"), rel("A/y.txt")];
    let actions = h.engine.plan_actions(&tracked).await.unwrap();
    let mut reported = Vec::new();
    let summary = h
        .engine
        .apply_actions(&actions, |p| reported.push((p.path.to_string(), p.status, p.bytes)))
        .await
        .unwrap();

    assert_eq!(summary.replaced, 1);
    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.bytes_uploaded, 10);
    assert_eq!(
        reported,
        vec![
            ("A/x.txt".to_string(), SyncStatus::Synced, 5),
            ("A/y.txt".to_string(), SyncStatus::Synced, 5),
        ]
    );

    assert_eq!(h.store.child_names(&a), vec!["x.txt", "y.txt"]);
    let x = h.child_id(&a, "x.txt");
    assert_eq!(h.store.content(&x).unwrap(), b"new x");
    assert_eq!(
        h.store.calls(),
        vec!["delete x.txt", "create_file x.txt", "create_file y.txt"]
    );
}

#[tokio::test]
async fn delete_orphans_inside_tracked_directory() {
    let h = Harness::new();
    h.write_at("A/p.txt", b"p");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("p.txt", &a, remote_time(1_000), b"p");
    h.store.insert_file("stale.txt", &a, remote_time(0), b"s");

    let report = h.engine.synchronize(&[rel("A")], |_| {}).await.unwrap();

    assert_eq!(report.planned, 1);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.uploaded, 0);
    assert_eq!(h.store.child_names(&a), vec!["p.txt"]);
}

#[tokio::test]
async fn fresh_mirror_then_second_run_is_empty() {
    let h = Harness::new();
    h.write_at("Docs/a.txt", b"aaa");
    h.write_at("Docs/nested/b.txt", b"bb");
    h.write_at("top.txt", b"t");
    let tracked = [rel("Docs"), rel("top.txt")];

    let first = h.engine.synchronize(&tracked, |_| {}).await.unwrap();
    assert_eq!(first.uploaded, 3);
    assert_eq!(first.bytes_uploaded, 6);

    let backup = h.backup_id();
    assert_eq!(h.store.child_names(&backup), vec!["Docs", "top.txt"]);
    let docs = h.child_id(&backup, "Docs");
    assert_eq!(h.store.child_names(&docs), vec!["a.txt", "nested"]);

    let second = h.engine.plan_actions(&tracked).await.unwrap();
    assert!(second.is_empty());

    let statuses = h.engine.check_status(&tracked, |_, _| {}).await.unwrap();
    assert!(statuses.values().all(|s| *s == SyncStatus::Synced));
}

#[tokio::test]
async fn status_round_trip_through_upload() {
    let h = Harness::new();
    h.write_at("notes/today.md", b"# today");
    let tracked = [rel("notes/today.md")];

    let before = h.engine.check_status(&tracked, |_, _| {}).await.unwrap();
    assert_eq!(before[&tracked[0]], SyncStatus::NotPresent);

    h.engine.synchronize(&tracked, |_| {}).await.unwrap();

    let after = h.engine.check_status(&tracked, |_, _| {}).await.unwrap();
    assert_eq!(after[&tracked[0]], SyncStatus::Synced);
}

#[tokio::test]
async fn untracking_removes_top_level_entry() {
    let h = Harness::new();
    h.write_at("keep/a.txt", b"a");
    h.write_at("drop/b.txt", b"b");
    h.engine
        .synchronize(&[rel("keep"), rel("drop")], |_| {})
        .await
        .unwrap();

    let report = h.engine.synchronize(&[rel("keep")], |_| {}).await.unwrap();

    assert_eq!(report.deleted, 1);
    let backup = h.backup_id();
    assert_eq!(h.store.child_names(&backup), vec!["keep"]);
    assert_eq!(h.store.file_count(), 1);
}

#[tokio::test]
async fn deletion_of_vanished_entry_counts_as_already_gone() {
    let h = Harness::new();
    h.write_at("A/p.txt", b"p");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_file("p.txt", &a, remote_time(0), b"p");
    let stale = h.store.insert_file("stale.txt", &a, remote_time(0), b"s");

    let actions = h.engine.plan_actions(&[rel("A")]).await.unwrap();
    h.store.evict(&stale);
    let summary = h.engine.apply_actions(&actions, |_| {}).await.unwrap();

    assert_eq!(summary.deleted, 0);
    assert_eq!(summary.already_gone, 1);
}

#[tokio::test]
async fn failure_aborts_run_and_next_run_recovers() {
    let h = Harness::new();
    h.write_at("a.txt", b"a");
    h.write_at("b.txt", b"b");
    h.write_at("c.txt", b"c");
    let tracked = [rel("a.txt"), rel("b.txt"), rel("c.txt")];
    h.store.fail_on(StoreOperation::CreateFile, Some("b.txt"));

    let err = h.engine.synchronize(&tracked, |_| {}).await.unwrap_err();
    match &err {
        SyncError::ActionFailed {
            status,
            filename,
            local_path,
            ..
        } => {
            assert_eq!(*status, SyncStatus::NotPresent);
            assert_eq!(filename, "b.txt");
            assert_eq!(local_path.as_ref(), Some(&rel("b.txt")));
        }
        other => panic!("expected ActionFailed, got {other:?}"),
    }
    assert!(matches!(err.root_cause(), SyncError::Remote { operation: "create_file", .. }));

    // a.txt stays uploaded, c.txt was never attempted
    let backup = h.backup_id();
    assert_eq!(h.store.child_names(&backup), vec!["a.txt"]);

    let plan = h.engine.plan_actions(&tracked).await.unwrap();
    assert_eq!(
        plan,
        vec![
            SyncAction::upload(rel("b.txt"), backup.clone()),
            SyncAction::upload(rel("c.txt"), backup),
        ]
    );
}

#[tokio::test]
async fn cancelled_run_applies_nothing() {
    let h = Harness::new();
    h.write_at("a.txt", b"a");
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = h
        .engine
        .synchronize_with_cancel(&[rel("a.txt")], &cancel, |_| {})
        .await;

    assert!(matches!(result, Err(SyncError::Cancelled)));
    assert_eq!(h.store.file_count(), 0);
}

#[tokio::test]
async fn cancel_from_progress_stops_before_next_action() {
    let h = Harness::new();
    h.write_at("a.txt", b"a");
    h.write_at("b.txt", b"b");
    let tracked = [rel("a.txt"), rel("b.txt")];
    let actions = h.engine.plan_actions(&tracked).await.unwrap();

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    let result = h
        .engine
        .apply_actions_with_cancel(&actions, &cancel, |_| trigger.cancel())
        .await;

    assert!(matches!(result, Err(SyncError::Cancelled)));
    assert_eq!(h.store.file_count(), 1);
}

#[tokio::test]
async fn content_type_override_is_used_for_uploads() {
    let h = Harness::new();
    h.write_at("photo.jpg", b"jpeg");
    let engine = h
        .engine
        .clone()
        .with_executor(|executor| executor.with_content_type(|_| "x-test/blob".to_string()));

    engine.synchronize(&[rel("photo.jpg")], |_| {}).await.unwrap();

    let backup = h.backup_id();
    let photo = h.child_id(&backup, "photo.jpg");
    assert_eq!(h.store.content_type(&photo).as_deref(), Some("x-test/blob"));
}

#[tokio::test]
async fn default_content_type_follows_extension() {
    let h = Harness::new();
    h.write_at("page.html", b"<p>");
    h.engine.synchronize(&[rel("page.html")], |_| {}).await.unwrap();

    let backup = h.backup_id();
    let page = h.child_id(&backup, "page.html");
    assert_eq!(h.store.content_type(&page).as_deref(), Some("text/html"));
}

#[tokio::test]
async fn transfer_progress_tracks_upload_bytes() {
    let h = Harness::new();
    h.write_at("big.bin", &vec![7u8; 2048]);
    h.write_at("small.bin", &vec![7u8; 1024]);
    let tracked = [rel("big.bin"), rel("small.bin")];

    let actions = h.engine.plan_actions(&tracked).await.unwrap();
    let total = h.engine.total_upload_bytes(&actions).await.unwrap();
    let mut progress = TransferProgress::new(total);
    let mut summaries = Vec::new();

    h.engine
        .apply_actions(&actions, |p| {
            progress.record(p.bytes);
            summaries.push(progress.summary());
        })
        .await
        .unwrap();

    assert_eq!(summaries, vec!["2.00 / 3.00 KB", "3.00 / 3.00 KB"]);
    assert!(progress.is_complete());
}

#[tokio::test]
async fn syncing_a_subset_keeps_other_tracked_folders() {
    let h = Harness::new();
    h.write_at("A/a.txt", b"a");
    h.write_at("B/b.txt", b"b");
    let tracked = [rel("A"), rel("B")];
    h.engine.synchronize(&tracked, |_| {}).await.unwrap();
    h.write_at("A/new.txt", b"new");

    let actions = h.engine.plan_selected(&tracked, &[rel("A")]).await.unwrap();
    let summary = h.engine.apply_actions(&actions, |_| {}).await.unwrap();

    assert_eq!(summary.uploaded, 1);
    assert_eq!(summary.deleted, 0);
    let backup = h.backup_id();
    assert_eq!(h.store.child_names(&backup), vec!["A", "B"]);
    let b = h.child_id(&backup, "B");
    assert_eq!(h.store.child_names(&b), vec!["b.txt"]);
}

#[tokio::test]
async fn file_shadowed_by_remote_folder_is_uploaded() {
    let h = Harness::new();
    h.write_at("A/x", b"file");
    let backup = h.remote_backup();
    let a = h.store.insert_folder("A", Some(&backup));
    h.store.insert_folder("x", Some(&a));

    let before = h.engine.check_status(&[rel("A/x")], |_, _| {}).await.unwrap();
    assert_eq!(before[&rel("A/x")], SyncStatus::NotPresent);

    let report = h.engine.synchronize(&[rel("A")], |_| {}).await.unwrap();
    assert_eq!(report.uploaded, 1);
    assert_eq!(report.deleted, 1);

    let x = h.child_id(&a, "x");
    assert_eq!(h.store.content(&x).unwrap(), b"file");
    assert!(h.engine.plan_actions(&[rel("A")]).await.unwrap().is_empty());
}
