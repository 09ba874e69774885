//! Capture one book's live content tree as an immutable `Snapshot`.
//!
//! Capture is a pure read. Hidden sections and subsections are included.
//! Any missing row or failed load aborts the whole capture; a partial
//! snapshot is never returned.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::repo::SqliteRepo;
use homebook_core::errors::{ExError, ExErrorKind};
use homebook_core::snapshot::Snapshot;
use rusqlite::Connection;

const OP: &str = "capture";

fn load_failed(book_id: &str, what: &str, source: ExError) -> ExError {
    ExError::new(ExErrorKind::CaptureFailed)
        .with_op(OP)
        .with_entity_id(book_id)
        .with_message(format!("failed to load {what}"))
        .with_source(source)
}

/// Capture the book's current tree
///
/// # Errors
///
/// - `NotFound` if the book or its property does not exist
/// - `CaptureFailed` if any level of the tree cannot be loaded
pub fn capture(conn: &Connection, book_id: &str) -> Result<Snapshot> {
    let book = SqliteRepo::get_book(conn, book_id)
        .map_err(|e| load_failed(book_id, "book", e))?
        .ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op(OP)
                .with_entity_id(book_id)
                .with_message("book not found")
        })?;

    let property = SqliteRepo::get_property(conn, &book.property_id)
        .map_err(|e| load_failed(book_id, "property", e))?
        .ok_or_else(|| {
            ExError::new(ExErrorKind::NotFound)
                .with_op(OP)
                .with_entity_id(&book.property_id)
                .with_message("property not found")
        })?;

    let sections =
        SqliteRepo::list_sections(conn, book_id).map_err(|e| load_failed(book_id, "sections", e))?;
    let subsections = SqliteRepo::list_subsections_for_book(conn, book_id)
        .map_err(|e| load_failed(book_id, "subsections", e))?;
    let media = SqliteRepo::list_media_for_book(conn, book_id)
        .map_err(|e| load_failed(book_id, "media", e))?;

    tracing::debug!(
        book_id,
        sections = sections.len(),
        subsections = subsections.len(),
        media = media.len(),
        "Captured snapshot"
    );

    Ok(Snapshot::from_tree(
        &book,
        &property,
        &sections,
        &subsections,
        &media,
    ))
}
