//! Inbound publish_action boundary: validation, outcomes and logging

mod common;

use common::*;
use homebook_core::errors::ExErrorKind;
use homebook_core::logging_facility::test_capture::init_test_capture;
use homebook_core::notifier::{NoopViewNotifier, RecordingViewNotifier};
use homebook_engine::{publish_action, FailureOutcome, PublishAction};
use homebook_store::{db, snapshot, versions};
use std::collections::HashSet;
use tempfile::TempDir;

#[test]
fn test_publish_then_draft_through_boundary() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let notifier = RecordingViewNotifier::new();

    let published = publish_action(Some(OWNER), &tree.book_id, "publish", &notifier, &mut conn).unwrap();
    assert_eq!(published.action, PublishAction::Publish);
    assert_eq!(published.version_no, Some(1));

    let json = serde_json::to_value(&published).unwrap();
    assert_eq!(json["action"], "publish");
    assert_eq!(json["is_published"], true);
    assert_eq!(json["version_no"], 1);

    let drafted = publish_action(Some(OWNER), &tree.book_id, "draft", &notifier, &mut conn).unwrap();
    assert!(!drafted.is_published);

    let restored = publish_action(
        Some(OWNER),
        &tree.book_id,
        "restore_latest_published",
        &notifier,
        &mut conn,
    )
    .unwrap();
    assert!(restored.is_published);
    assert_eq!(restored.version_no, Some(1));
}

#[test]
fn test_failures_are_classified() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let notifier = RecordingViewNotifier::new();

    let cases = [
        (None, tree.book_id.as_str(), "publish", FailureOutcome::Unauthenticated),
        (Some(OWNER), "", "publish", FailureOutcome::Invalid),
        (Some(OWNER), tree.book_id.as_str(), "archive", FailureOutcome::Invalid),
        (Some(STRANGER), tree.book_id.as_str(), "publish", FailureOutcome::NotOwner),
        (Some(OWNER), "no-such-book", "publish", FailureOutcome::Missing),
        (
            Some(OWNER),
            tree.book_id.as_str(),
            "restore_latest_published",
            FailureOutcome::Missing,
        ),
    ];

    for (caller, book_id, action, expected) in cases {
        let err = publish_action(caller, book_id, action, &notifier, &mut conn).unwrap_err();
        assert_eq!(FailureOutcome::classify(&err), expected, "{caller:?} {book_id} {action}");
        assert!(err.request_id().is_some());
    }
    assert!(!is_published(&conn, &tree.book_id));
}

#[test]
fn test_unique_collision_is_conflict() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let notifier = RecordingViewNotifier::new();
    publish_action(Some(OWNER), &tree.book_id, "publish", &notifier, &mut conn).unwrap();

    // A concurrent writer takes number 2 between our read and our insert
    conn.execute_batch(
        "CREATE TRIGGER steal_number BEFORE INSERT ON book_versions
         WHEN NEW.version_no = 2 AND NEW.created_by <> 'other-editor'
         BEGIN
           INSERT INTO book_versions (book_id, version_no, snapshot, created_by, created_at)
           VALUES (NEW.book_id, 2, NEW.snapshot, 'other-editor', NEW.created_at);
         END;",
    )
    .unwrap();

    let err = publish_action(Some(OWNER), &tree.book_id, "publish", &notifier, &mut conn).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Concurrency);
    assert_eq!(FailureOutcome::classify(&err), FailureOutcome::Conflict);
}

#[test]
fn test_stale_writer_loses_to_committed_publish() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.db");
    let mut slow = setup_file_db(&path);
    let mut fast = db::open(&path).unwrap();
    let tree = rules_book(&mut slow);

    // The slow writer reads the tree and the next number, then stalls
    let tx = slow.transaction().unwrap();
    let captured = snapshot::capture(&tx, &tree.book_id).unwrap();
    let version_no = versions::next_version_no(&tx, &tree.book_id).unwrap();
    assert_eq!(version_no, 1);

    let won = publish_action(Some(OWNER), &tree.book_id, "publish", &NoopViewNotifier, &mut fast).unwrap();
    assert_eq!(won.version_no, Some(1));

    let err = versions::insert_version(&tx, &tree.book_id, version_no, &captured, OWNER).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Concurrency);
    assert_eq!(FailureOutcome::classify(&err), FailureOutcome::Conflict);
    drop(tx);

    let history = versions::list(&fast, &tree.book_id).unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].version_no, 1);
}

#[test]
fn test_concurrent_publishes_get_distinct_numbers() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("store.db");
    let mut conn = setup_file_db(&path);
    let tree = rules_book(&mut conn);

    let workers: Vec<_> = (0..2)
        .map(|_| {
            let path = path.clone();
            let book_id = tree.book_id.clone();
            std::thread::spawn(move || {
                let mut conn = db::open(&path).unwrap();
                (0..4)
                    .map(|_| {
                        publish_action(Some(OWNER), &book_id, "publish", &NoopViewNotifier, &mut conn)
                            .unwrap()
                            .version_no
                            .unwrap()
                    })
                    .collect::<Vec<i64>>()
            })
        })
        .collect();

    let numbers: Vec<i64> = workers
        .into_iter()
        .flat_map(|w| w.join().unwrap())
        .collect();
    let distinct: HashSet<i64> = numbers.iter().copied().collect();
    assert_eq!(distinct.len(), 8);
    assert_eq!(distinct, (1..=8).collect::<HashSet<i64>>());
}

#[test]
fn test_boundary_events_logged() {
    let capture = init_test_capture();
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);

    publish_action(Some(OWNER), &tree.book_id, "publish", &RecordingViewNotifier::new(), &mut conn)
        .unwrap();

    assert_eq!(capture.boundary_events("publish", &tree.book_id), vec!["start", "end"]);
}

#[test]
fn test_failed_restore_logs_end_error() {
    let capture = init_test_capture();
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);

    publish_action(
        Some(OWNER),
        &tree.book_id,
        "restore_latest_published",
        &RecordingViewNotifier::new(),
        &mut conn,
    )
    .unwrap_err();

    assert_eq!(
        capture.boundary_events("restore_latest_published", &tree.book_id),
        vec!["start", "end_error"]
    );
}
