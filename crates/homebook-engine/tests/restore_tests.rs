//! Snapshot restore: identity remapping, skipped orphans, stage failures

mod common;

use common::*;
use homebook_core::errors::{ExErrorKind, RestoreStage};
use homebook_core::model::{MediaKind, MediaParent};
use homebook_core::notifier::NoopViewNotifier;
use homebook_core::snapshot::{MediaRecord, SubsectionRecord};
use homebook_engine::commands::edit;
use homebook_engine::commands::restore::restore;
use homebook_store::{snapshot, SqliteRepo};
use proptest::prelude::*;

#[test]
fn test_restore_assigns_new_ids_and_relinks_media() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let captured = snapshot::capture(&conn, &tree.book_id).unwrap();

    let outcome = restore(&mut conn, &tree.book_id, &captured).unwrap();

    let new_rules = outcome.sections.resolve(&tree.rules).unwrap().to_string();
    let new_smoking = outcome.subsections.resolve(&tree.smoking).unwrap().to_string();
    assert_ne!(new_rules, tree.rules);
    assert_ne!(new_smoking, tree.smoking);
    assert!(outcome.subsections.resolve(&tree.quiet_hours).is_some());
    assert_eq!(outcome.media_restored, 1);

    assert!(SqliteRepo::get_section(&conn, &tree.rules).unwrap().is_none());
    assert!(SqliteRepo::get_media(&conn, &tree.image).unwrap().is_none());

    let titles: Vec<String> = SqliteRepo::list_subsections(&conn, &new_rules)
        .unwrap()
        .iter()
        .map(|s| s.text().title)
        .collect();
    assert_eq!(titles, vec!["Smoking", "Quiet hours"]);

    let media = SqliteRepo::list_media_for_parent(&conn, &MediaParent::Subsection(new_smoking)).unwrap();
    assert_eq!(media.len(), 1);
    assert_eq!(media[0].url, "storage://homebook-media/no-smoking.jpg");
}

#[test]
fn test_restore_overwrites_scalars() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let captured = snapshot::capture(&conn, &tree.book_id).unwrap();

    let update = edit::BookDetailsUpdate {
        title: Some("Renamed".to_string()),
        layout: Some("moderno".to_string()),
        short_description: Some("A different description".to_string()),
        ..Default::default()
    };
    edit::update_book_details(OWNER, &tree.book_id, &update, &NoopViewNotifier, &mut conn).unwrap();

    restore(&mut conn, &tree.book_id, &captured).unwrap();

    let after = snapshot::capture(&conn, &tree.book_id).unwrap();
    assert_eq!(after.book, captured.book);
    assert_eq!(after.property, captured.property);
}

#[test]
fn test_orphans_are_skipped() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let mut captured = snapshot::capture(&conn, &tree.book_id).unwrap();
    captured.subsections.push(SubsectionRecord {
        id: "ghost-sub".to_string(),
        section_id: "ghost-section".to_string(),
        content_text: "Lost\nnowhere".to_string(),
        visible: None,
        ordinal: Some(1),
        created_at: None,
    });
    captured.media.push(MediaRecord {
        id: "ghost-media".to_string(),
        section_id: None,
        subsection_id: Some("ghost-sub".to_string()),
        url: "storage://homebook-media/ghost.jpg".to_string(),
        kind: MediaKind::Image,
        ordinal: Some(9),
        description: None,
        created_at: None,
    });

    let outcome = restore(&mut conn, &tree.book_id, &captured).unwrap();

    assert_eq!(outcome.skipped_subsections, 1);
    assert_eq!(outcome.skipped_media, 1);
    assert_eq!(outcome.media_restored, 1);
    assert_eq!(SqliteRepo::list_media_for_book(&conn, &tree.book_id).unwrap().len(), 1);
}

#[test]
fn test_subsection_failure_keeps_old_tree() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let captured = snapshot::capture(&conn, &tree.book_id).unwrap();
    let before = tree_shape(&conn, &tree.book_id);
    conn.execute_batch(
        "CREATE TRIGGER fail_subsections BEFORE INSERT ON subsections
         BEGIN SELECT RAISE(ABORT, 'boom'); END;",
    )
    .unwrap();

    let err = restore(&mut conn, &tree.book_id, &captured).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::RestoreStageFailed);
    assert_eq!(err.stage(), Some(RestoreStage::Subsection));
    assert_eq!(tree_shape(&conn, &tree.book_id), before);
    assert!(SqliteRepo::get_section(&conn, &tree.rules).unwrap().is_some());
}

#[test]
fn test_media_failure_keeps_restored_sections() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let captured = snapshot::capture(&conn, &tree.book_id).unwrap();
    conn.execute_batch(
        "CREATE TRIGGER fail_media BEFORE INSERT ON media
         BEGIN SELECT RAISE(ABORT, 'boom'); END;",
    )
    .unwrap();

    let err = restore(&mut conn, &tree.book_id, &captured).unwrap_err();

    assert_eq!(err.stage(), Some(RestoreStage::Media));
    let sections = SqliteRepo::list_sections(&conn, &tree.book_id).unwrap();
    assert_eq!(sections.len(), 1);
    assert_ne!(sections[0].id, tree.rules);
    assert_eq!(SqliteRepo::list_subsections(&conn, &sections[0].id).unwrap().len(), 2);
    assert!(SqliteRepo::list_media_for_book(&conn, &tree.book_id).unwrap().is_empty());
}

#[test]
fn test_restore_missing_book() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let captured = snapshot::capture(&conn, &tree.book_id).unwrap();

    let err = restore(&mut conn, "no-such-book", &captured).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);
}

type SectionSpec = (String, bool, Vec<(String, String, usize)>);

fn section_specs() -> impl Strategy<Value = Vec<SectionSpec>> {
    let subsection = ("[A-Z][a-z]{0,8}", "[a-z ]{0,24}", 0usize..3);
    let section = ("[A-Z][a-z]{0,8}", any::<bool>(), prop::collection::vec(subsection, 0..4));
    prop::collection::vec(section, 0..5)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    /// Restoring a captured tree yields the same structure under fresh ids
    #[test]
    fn prop_restore_is_isomorphic(specs in section_specs()) {
        let mut conn = setup_db();
        let book_id = empty_book(&mut conn, "Prop");
        let mut old_ids = Vec::new();

        for (title, visible, subs) in &specs {
            let section_id = section(&mut conn, &book_id, title);
            if !visible {
                edit::set_section_visibility(OWNER, &book_id, &section_id, false, &NoopViewNotifier, &mut conn)
                    .unwrap();
            }
            for (sub_title, body, images) in subs {
                let sub_id = subsection(&mut conn, &book_id, &section_id, sub_title, body);
                for n in 0..*images {
                    image(
                        &mut conn,
                        &book_id,
                        MediaParent::Subsection(sub_id.clone()),
                        &format!("storage://homebook-media/{sub_id}-{n}.jpg"),
                    );
                }
                old_ids.push(sub_id);
            }
            old_ids.push(section_id);
        }

        let before = tree_shape(&conn, &book_id);
        let captured = snapshot::capture(&conn, &book_id).unwrap();
        let outcome = restore(&mut conn, &book_id, &captured).unwrap();

        prop_assert_eq!(tree_shape(&conn, &book_id), before);
        prop_assert_eq!(outcome.sections.len(), specs.len());
        prop_assert_eq!(outcome.skipped_subsections + outcome.skipped_media, 0);
        for old in &old_ids {
            prop_assert!(SqliteRepo::get_section(&conn, old).unwrap().is_none());
            prop_assert!(SqliteRepo::get_subsection(&conn, old).unwrap().is_none());
        }
    }
}
