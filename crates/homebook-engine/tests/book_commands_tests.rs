//! Property and book lifecycle, editor tree and checklist

mod common;

use common::*;
use homebook_core::errors::ExErrorKind;
use homebook_core::model::MediaParent;
use homebook_core::notifier::{RecordingViewNotifier, ViewEvent};
use homebook_core::snapshot::PropertyFields;
use homebook_engine::commands::book;
use homebook_engine::commands::publish::publish;
use homebook_store::{versions, SqliteRepo};

#[test]
fn test_create_book_seeds_layout_sections() {
    let mut conn = setup_db();
    let property = book::create_property(&conn, OWNER, &property_named("  Villa Rosa ")).unwrap();
    assert_eq!(property.name, "Villa Rosa");

    let classic = book::create_book(&mut conn, OWNER, &property.id, "Guide", None).unwrap();
    let rustic = book::create_book(&mut conn, OWNER, &property.id, "Guide", Some("Rustico")).unwrap();

    assert_eq!(classic.layout_type, "classico");
    assert!(!classic.is_published());
    assert_eq!(classic.public_slug.as_deref().map(str::len), Some(10));
    assert_ne!(classic.public_slug, rustic.public_slug);

    let classic_titles: Vec<String> = SqliteRepo::list_sections(&conn, &classic.id)
        .unwrap()
        .into_iter()
        .map(|s| s.title)
        .collect();
    let rustic_sections = SqliteRepo::list_sections(&conn, &rustic.id).unwrap();
    assert_eq!(classic_titles.len(), rustic_sections.len() + 1);
    assert!(classic_titles.iter().any(|t| t == "Colazione"));
    assert!(rustic_sections.iter().all(|s| s.title != "Colazione"));
}

#[test]
fn test_create_property_with_display_fields() {
    let conn = setup_db();
    let fields = PropertyFields {
        name: "Casa Mare".to_string(),
        address: Some(" Via del Porto 3, Camogli ".to_string()),
        main_image_url: Some("storage://homebook-media/cover.jpg".to_string()),
        short_description: Some("   ".to_string()),
    };

    let created = book::create_property(&conn, OWNER, &fields).unwrap();

    let stored = SqliteRepo::get_property(&conn, &created.id).unwrap().unwrap();
    assert_eq!(stored.owner_id, OWNER);
    assert_eq!(stored.address.as_deref(), Some("Via del Porto 3, Camogli"));
    assert_eq!(stored.main_image_url.as_deref(), Some("storage://homebook-media/cover.jpg"));
    assert!(stored.short_description.is_none());

    let err = book::create_property(&conn, OWNER, &property_named(" ")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidTitle);
}

#[test]
fn test_create_book_rejects_bad_input() {
    let mut conn = setup_db();
    let property = book::create_property(&conn, OWNER, &property_named("Villa Rosa")).unwrap();

    let err = book::create_book(&mut conn, OWNER, &property.id, "Guide", Some("barocco")).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidLayout);

    let err = book::create_book(&mut conn, STRANGER, &property.id, "Guide", None).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);

    let err = book::create_book(&mut conn, OWNER, "no-such-property", "Guide", None).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::NotFound);

    assert!(book::list_books(&conn, OWNER).unwrap().is_empty());
}

#[test]
fn test_book_tree_is_nested_in_order() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let cover = image(
        &mut conn,
        &tree.book_id,
        MediaParent::Section(tree.rules.clone()),
        "storage://homebook-media/rules.jpg",
    );

    let view = book::book_tree(&conn, OWNER, &tree.book_id).unwrap();

    assert_eq!(view.sections.len(), 1);
    let rules = &view.sections[0];
    assert_eq!(rules.section.id, tree.rules);
    assert_eq!(rules.media.len(), 1);
    assert_eq!(rules.media[0].id, cover);
    let titles: Vec<&str> = rules.subsections.iter().map(|s| s.title.as_str()).collect();
    assert_eq!(titles, vec!["Smoking", "Quiet hours"]);
    assert_eq!(rules.subsections[0].media[0].id, tree.image);
    assert!(rules.subsections[1].media.is_empty());

    let err = book::book_tree(&conn, STRANGER, &tree.book_id).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::Forbidden);
}

#[test]
fn test_checklist_reports_missing_core_sections() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);

    let items = book::checklist(&conn, OWNER, &tree.book_id).unwrap();
    let ids: Vec<&str> = items.iter().map(|i| i.id.as_str()).collect();

    assert!(!ids.contains(&"cover-missing"));
    assert!(ids.contains(&"description-short"));
    assert!(ids.contains(&"core-check-in-missing"));
    assert!(!ids.contains(&"global-content-missing"));
}

#[test]
fn test_delete_book_removes_everything() {
    let mut conn = setup_db();
    let tree = rules_book(&mut conn);
    let notifier = RecordingViewNotifier::new();
    publish(OWNER, &tree.book_id, &notifier, &mut conn).unwrap();
    notifier.clear();

    book::delete_book(OWNER, &tree.book_id, &notifier, &mut conn).unwrap();

    assert!(SqliteRepo::get_book(&conn, &tree.book_id).unwrap().is_none());
    assert!(SqliteRepo::get_section(&conn, &tree.rules).unwrap().is_none());
    assert!(versions::list(&conn, &tree.book_id).unwrap().is_empty());
    let events = notifier.events();
    assert!(matches!(&events[0], ViewEvent::Invalidate { paths, .. } if paths.iter().any(|p| p.starts_with("/p/"))));
}
