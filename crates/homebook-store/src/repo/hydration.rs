//! Row mappers - rebuild domain models from SQLite rows
//!
//! Column lists are kept next to their mappers so the two cannot drift.

use chrono::{DateTime, Utc};
use homebook_core::model::{
    Book, MediaAttachment, MediaKind, MediaParent, Property, PublishState, Section, Subsection,
};
use rusqlite::types::Type;
use rusqlite::Row;

pub(crate) const PROPERTY_COLUMNS: &str =
    "id, owner_id, name, address, main_image_url, short_description, created_at";
pub(crate) const BOOK_COLUMNS: &str =
    "id, property_id, title, layout_type, public_slug, is_published, created_at, updated_at";
pub(crate) const SECTION_COLUMNS: &str = "id, book_id, title, ordinal, visible, created_at";
pub(crate) const SUBSECTION_COLUMNS: &str =
    "id, section_id, content_text, ordinal, visible, created_at";
pub(crate) const MEDIA_COLUMNS: &str =
    "id, section_id, subsection_id, url, kind, ordinal, description, created_at";

pub fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

/// Epoch milliseconds stored in `column`; out-of-range values fail hydration.
pub fn from_millis(column: usize, ms: i64) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| {
        conversion_error(column, Type::Integer, format!("timestamp {ms} ms out of range"))
    })
}

fn timestamp_at(row: &Row<'_>, column: usize) -> rusqlite::Result<DateTime<Utc>> {
    from_millis(column, row.get(column)?)
}

fn optional_timestamp_at(row: &Row<'_>, column: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let ms: Option<i64> = row.get(column)?;
    ms.map(|ms| from_millis(column, ms)).transpose()
}

fn conversion_error(column: usize, ty: Type, message: String) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(column, ty, message.into())
}

pub fn property_from_row(row: &Row<'_>) -> rusqlite::Result<Property> {
    Ok(Property {
        id: row.get(0)?,
        owner_id: row.get(1)?,
        name: row.get(2)?,
        address: row.get(3)?,
        main_image_url: row.get(4)?,
        short_description: row.get(5)?,
        created_at: timestamp_at(row, 6)?,
    })
}

pub fn book_from_row(row: &Row<'_>) -> rusqlite::Result<Book> {
    let is_published: bool = row.get(5)?;
    Ok(Book {
        id: row.get(0)?,
        property_id: row.get(1)?,
        title: row.get(2)?,
        layout_type: row.get(3)?,
        public_slug: row.get(4)?,
        state: PublishState::from_flag(is_published),
        created_at: timestamp_at(row, 6)?,
        updated_at: timestamp_at(row, 7)?,
    })
}

pub fn section_from_row(row: &Row<'_>) -> rusqlite::Result<Section> {
    Ok(Section {
        id: row.get(0)?,
        book_id: row.get(1)?,
        title: row.get(2)?,
        ordinal: row.get(3)?,
        visible: row.get(4)?,
        created_at: timestamp_at(row, 5)?,
    })
}

pub fn subsection_from_row(row: &Row<'_>) -> rusqlite::Result<Subsection> {
    Ok(Subsection {
        id: row.get(0)?,
        section_id: row.get(1)?,
        content_text: row.get(2)?,
        ordinal: row.get(3)?,
        visible: row.get(4)?,
        created_at: optional_timestamp_at(row, 5)?,
    })
}

pub fn media_from_row(row: &Row<'_>) -> rusqlite::Result<MediaAttachment> {
    let id: String = row.get(0)?;
    let section_id: Option<String> = row.get(1)?;
    let subsection_id: Option<String> = row.get(2)?;
    let kind: String = row.get(4)?;
    let created_at = optional_timestamp_at(row, 7)?;

    let parent = MediaParent::from_columns(&id, section_id, subsection_id)
        .map_err(|e| conversion_error(1, Type::Text, e.to_string()))?;
    let kind = MediaKind::parse(&kind).map_err(|e| conversion_error(4, Type::Text, e.to_string()))?;

    Ok(MediaAttachment {
        id,
        parent,
        url: row.get(3)?,
        kind,
        ordinal: row.get(5)?,
        description: row.get(6)?,
        created_at,
    })
}
