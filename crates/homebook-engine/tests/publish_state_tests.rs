//! Publish state machine: publish, draft and restore of the latest version

mod common;

use common::*;
use homebook_core::errors::ExErrorKind;
use homebook_core::notifier::{RecordingViewNotifier, ViewEvent};
use homebook_engine::commands::publish::{publish, restore_latest_published, unpublish};
use homebook_engine::commands::{book, edit};
use homebook_engine::PublishAction;
use homebook_store::{versions, SqliteRepo};

#[test]
fn test_publish_appends_version_and_marks_published() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let notifier = RecordingViewNotifier::new();

    let outcome = publish(OWNER, &tree.book_id, &notifier, &mut conn).unwrap();

    assert_eq!(outcome.action, PublishAction::Publish);
    assert!(outcome.is_published);
    assert_eq!(outcome.version_no, Some(1));
    assert!(is_published(&conn, &tree.book_id));

    let latest = versions::latest(&conn, &tree.book_id).unwrap().unwrap();
    assert_eq!(latest.summary.created_by, OWNER);
    assert_eq!(latest.snapshot.sections.len(), 1);
    assert_eq!(latest.snapshot.subsections.len(), 2);
    assert_eq!(latest.snapshot.media.len(), 1);

    let events = notifier.events();
    assert_eq!(events.len(), 1);
    let ViewEvent::Invalidate { paths, .. } = &events[0] else {
        panic!("expected an invalidation");
    };
    assert!(paths.iter().any(|p| p.starts_with("/p/")));
}

#[test]
fn test_draft_keeps_versions() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let notifier = RecordingViewNotifier::new();
    publish(OWNER, &tree.book_id, &notifier, &mut conn).unwrap();

    let outcome = unpublish(OWNER, &tree.book_id, &notifier, &mut conn).unwrap();

    assert!(!outcome.is_published);
    assert_eq!(outcome.version_no, None);
    assert!(!is_published(&conn, &tree.book_id));
    assert_eq!(versions::list(&conn, &tree.book_id).unwrap().len(), 1);
}

#[test]
fn test_restore_without_versions_leaves_state_unchanged() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let before = tree_shape(&conn, &tree.book_id);

    let err = restore_latest_published(OWNER, &tree.book_id, &RecordingViewNotifier::new(), &mut conn)
        .unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::NoPublishedSnapshot);
    assert!(!is_published(&conn, &tree.book_id));
    assert_eq!(tree_shape(&conn, &tree.book_id), before);
}

#[test]
fn test_restore_latest_after_eleven_publishes() {
    let mut conn = setup_db();
    let book_id = empty_book(&mut conn, "T1");
    let notifier = RecordingViewNotifier::new();

    for n in 1..=11 {
        let update = edit::BookDetailsUpdate {
            title: Some(format!("T{n}")),
            ..Default::default()
        };
        edit::update_book_details(OWNER, &book_id, &update, &notifier, &mut conn).unwrap();
        publish(OWNER, &book_id, &notifier, &mut conn).unwrap();
    }

    let history = versions::list(&conn, &book_id).unwrap();
    let numbers: Vec<i64> = history.iter().map(|v| v.version_no).collect();
    assert_eq!(numbers, (2..=11).rev().collect::<Vec<_>>());

    let update = edit::BookDetailsUpdate {
        title: Some("Scratch".to_string()),
        ..Default::default()
    };
    edit::update_book_details(OWNER, &book_id, &update, &notifier, &mut conn).unwrap();
    assert!(!is_published(&conn, &book_id));

    let outcome = restore_latest_published(OWNER, &book_id, &notifier, &mut conn).unwrap();
    assert_eq!(outcome.version_no, Some(11));
    assert!(is_published(&conn, &book_id));
    let restored = SqliteRepo::get_book(&conn, &book_id).unwrap().unwrap();
    assert_eq!(restored.title, "T11");
}

#[test]
fn test_restore_reproduces_published_tree() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let notifier = RecordingViewNotifier::new();
    publish(OWNER, &tree.book_id, &notifier, &mut conn).unwrap();
    let published = tree_shape(&conn, &tree.book_id);

    edit::delete_section(OWNER, &tree.book_id, &tree.rules, &notifier, &mut conn).unwrap();
    assert!(tree_shape(&conn, &tree.book_id).is_empty());

    restore_latest_published(OWNER, &tree.book_id, &notifier, &mut conn).unwrap();
    assert_eq!(tree_shape(&conn, &tree.book_id), published);
}

#[test]
fn test_stranger_cannot_publish() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);

    let err = publish(STRANGER, &tree.book_id, &RecordingViewNotifier::new(), &mut conn).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::Forbidden);
    assert!(!is_published(&conn, &tree.book_id));
    assert!(versions::list(&conn, &tree.book_id).unwrap().is_empty());
}

#[test]
fn test_capture_failure_adds_no_version() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    conn.execute_batch("DROP TABLE media;").unwrap();

    let err = publish(OWNER, &tree.book_id, &RecordingViewNotifier::new(), &mut conn).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::CaptureFailed);
    assert!(!is_published(&conn, &tree.book_id));
    assert!(versions::list(&conn, &tree.book_id).unwrap().is_empty());
}

#[test]
fn test_list_versions_checks_ownership() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    publish(OWNER, &tree.book_id, &RecordingViewNotifier::new(), &mut conn).unwrap();

    assert_eq!(book::list_versions(&conn, OWNER, &tree.book_id).unwrap().len(), 1);
    let err = book::list_versions(&conn, STRANGER, &tree.book_id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);
}
