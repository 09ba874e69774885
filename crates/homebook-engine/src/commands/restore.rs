//! Snapshot restore
//!
//! Replaces a book's live content tree with the tree held in a snapshot,
//! giving every restored node a fresh id. Parent references are re-linked
//! through two old-id to new-id maps built while inserting.
//!
//! ## Stages
//!
//! 1. Overwrite property and book scalar fields in place
//! 2. Delete the current tree bottom-up
//! 3. Insert sections in ordinal order
//! 4. Insert subsections whose section was restored
//! 5. Insert media whose parent was restored
//!
//! Stages 1-4 commit together; a failure there leaves the live tree as it
//! was. Media is committed separately, so a media failure keeps the restored
//! sections and subsections.

#![allow(clippy::result_large_err)]

use homebook_core::errors::{ExError, ExErrorKind, RestoreStage};
use homebook_core::model::{MediaAttachment, Section, Subsection};
use homebook_core::snapshot::{
    media_in_order, resolve_media_parent, sections_in_order, subsections_in_order, IdMap, Snapshot,
};
use homebook_store::errors::from_rusqlite;
use homebook_store::{Result, SqliteRepo};
use rusqlite::Connection;
use uuid::Uuid;

use super::logged;

/// What a successful restore produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RestoreOutcome {
    /// Snapshot section id to restored section id
    pub sections: IdMap,
    /// Snapshot subsection id to restored subsection id
    pub subsections: IdMap,
    pub media_restored: usize,
    /// Subsections dropped because their section was not restored
    pub skipped_subsections: usize,
    /// Media dropped because neither parent was restored
    pub skipped_media: usize,
}

fn stage_error(stage: RestoreStage, book_id: &str, source: ExError) -> ExError {
    ExError::restore_stage(stage)
        .with_entity_id(book_id)
        .with_message(format!("{stage} restore failed"))
        .with_source(source)
}

/// Restore `snapshot` into the live tree of `book_id`
///
/// # Errors
///
/// - `NotFound` if the book does not exist
/// - `RestoreStageFailed` carrying the failed stage
pub fn restore(conn: &mut Connection, book_id: &str, snapshot: &Snapshot) -> Result<RestoreOutcome> {
    logged("restore", book_id, || restore_impl(conn, book_id, snapshot))
}

fn restore_impl(conn: &mut Connection, book_id: &str, snapshot: &Snapshot) -> Result<RestoreOutcome> {
    let book = SqliteRepo::get_book(conn, book_id)?.ok_or_else(|| {
        ExError::new(ExErrorKind::NotFound)
            .with_op("restore")
            .with_entity_id(book_id)
            .with_message("book not found")
    })?;

    let mut outcome = RestoreOutcome::default();

    let tx = conn
        .transaction()
        .map_err(|e| stage_error(RestoreStage::Property, book_id, from_rusqlite(e)))?;

    restore_scalars(&tx, book_id, &book.property_id, snapshot)?;

    SqliteRepo::delete_tree(&tx, book_id)
        .map_err(|e| stage_error(RestoreStage::Section, book_id, e))?;

    restore_sections(&tx, book_id, snapshot, &mut outcome)
        .map_err(|e| stage_error(RestoreStage::Section, book_id, e))?;
    restore_subsections(&tx, book_id, snapshot, &mut outcome)
        .map_err(|e| stage_error(RestoreStage::Subsection, book_id, e))?;

    tx.commit()
        .map_err(|e| stage_error(RestoreStage::Subsection, book_id, from_rusqlite(e)))?;

    let tx = conn
        .transaction()
        .map_err(|e| stage_error(RestoreStage::Media, book_id, from_rusqlite(e)))?;
    restore_media(&tx, book_id, snapshot, &mut outcome)
        .map_err(|e| stage_error(RestoreStage::Media, book_id, e))?;
    tx.commit()
        .map_err(|e| stage_error(RestoreStage::Media, book_id, from_rusqlite(e)))?;

    tracing::debug!(
        book_id,
        sections = outcome.sections.len(),
        subsections = outcome.subsections.len(),
        media = outcome.media_restored,
        skipped_subsections = outcome.skipped_subsections,
        skipped_media = outcome.skipped_media,
        "Restored snapshot"
    );

    Ok(outcome)
}

fn missing_row(what: &str, id: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_entity_id(id)
        .with_message(format!("{what} row disappeared during restore"))
}

fn restore_scalars(
    conn: &Connection,
    book_id: &str,
    property_id: &str,
    snapshot: &Snapshot,
) -> Result<()> {
    let changed = SqliteRepo::update_property_display(conn, property_id, &snapshot.property)
        .map_err(|e| stage_error(RestoreStage::Property, book_id, e))?;
    if changed == 0 {
        return Err(stage_error(
            RestoreStage::Property,
            book_id,
            missing_row("property", property_id),
        ));
    }

    let changed = SqliteRepo::update_book_fields(
        conn,
        book_id,
        &snapshot.book.title,
        &snapshot.book.layout_type,
    )
    .map_err(|e| stage_error(RestoreStage::Book, book_id, e))?;
    if changed == 0 {
        return Err(stage_error(
            RestoreStage::Book,
            book_id,
            missing_row("book", book_id),
        ));
    }
    Ok(())
}

fn restore_sections(
    conn: &Connection,
    book_id: &str,
    snapshot: &Snapshot,
    outcome: &mut RestoreOutcome,
) -> Result<()> {
    for record in sections_in_order(&snapshot.sections) {
        let mut section = Section::new(
            Uuid::now_v7().to_string(),
            book_id.to_string(),
            record.title.clone(),
            record.ordinal,
        );
        section.visible = record.visible;
        SqliteRepo::insert_section(conn, &section)?;
        outcome.sections.record(record.id.as_str(), section.id);
    }
    Ok(())
}

fn restore_subsections(
    conn: &Connection,
    book_id: &str,
    snapshot: &Snapshot,
    outcome: &mut RestoreOutcome,
) -> Result<()> {
    for record in subsections_in_order(&snapshot.subsections) {
        let Some(section_id) = outcome.sections.resolve(&record.section_id) else {
            tracing::warn!(
                book_id,
                subsection_id = %record.id,
                "Skipping subsection whose section was not restored"
            );
            outcome.skipped_subsections += 1;
            continue;
        };

        let sub = Subsection {
            id: Uuid::now_v7().to_string(),
            section_id: section_id.to_string(),
            content_text: record.content_text.clone(),
            ordinal: record.ordinal,
            visible: record.visible,
            created_at: record.created_at,
        };
        SqliteRepo::insert_subsection(conn, &sub)?;
        outcome.subsections.record(record.id.as_str(), sub.id);
    }
    Ok(())
}

fn restore_media(
    conn: &Connection,
    book_id: &str,
    snapshot: &Snapshot,
    outcome: &mut RestoreOutcome,
) -> Result<()> {
    for record in media_in_order(&snapshot.media) {
        let Some(parent) = resolve_media_parent(record, &outcome.sections, &outcome.subsections)
        else {
            tracing::warn!(
                book_id,
                media_id = %record.id,
                "Skipping media whose parent was not restored"
            );
            outcome.skipped_media += 1;
            continue;
        };

        let item = MediaAttachment {
            id: Uuid::now_v7().to_string(),
            parent,
            url: record.url.clone(),
            kind: record.kind,
            ordinal: record.ordinal,
            description: record.description.clone(),
            created_at: record.created_at,
        };
        SqliteRepo::insert_media(conn, &item)?;
        outcome.media_restored += 1;
    }
    Ok(())
}
