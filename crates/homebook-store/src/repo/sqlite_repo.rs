//! SQLite repository for the live content tree
//!
//! Every function takes `&Connection`; pass a `Transaction` (which derefs to
//! `Connection`) to group writes atomically.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, Result};
use crate::repo::hydration::{
    book_from_row, media_from_row, property_from_row, section_from_row, subsection_from_row,
    to_millis, BOOK_COLUMNS, MEDIA_COLUMNS, PROPERTY_COLUMNS, SECTION_COLUMNS,
    SUBSECTION_COLUMNS,
};
use chrono::Utc;
use homebook_core::model::{
    Book, MediaAttachment, MediaParent, Property, PublishState, Section, Subsection,
};
use homebook_core::snapshot::PropertyFields;
use rusqlite::{params, Connection, OptionalExtension};

/// Editor order: explicit ordinals first, then creation time, then insertion
const SUBSECTION_ORDER: &str =
    "ordinal IS NULL, ordinal, created_at IS NULL, created_at, rowid";
const MEDIA_ORDER: &str = "ordinal IS NULL, ordinal, created_at IS NULL, created_at, rowid";

/// SQLite repository for properties, books and their content tree
pub struct SqliteRepo;

impl SqliteRepo {
    // ---------- properties ----------

    pub fn insert_property(conn: &Connection, property: &Property) -> Result<()> {
        conn.execute(
            "INSERT INTO properties (id, owner_id, name, address, main_image_url, short_description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                property.id,
                property.owner_id,
                property.name,
                property.address,
                property.main_image_url,
                property.short_description,
                to_millis(property.created_at),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn get_property(conn: &Connection, property_id: &str) -> Result<Option<Property>> {
        conn.query_row(
            &format!("SELECT {PROPERTY_COLUMNS} FROM properties WHERE id = ?1"),
            [property_id],
            property_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Overwrite the display fields; returns the number of rows changed
    pub fn update_property_display(
        conn: &Connection,
        property_id: &str,
        fields: &PropertyFields,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE properties
             SET name = ?1, address = ?2, main_image_url = ?3, short_description = ?4
             WHERE id = ?5",
            params![
                fields.name,
                fields.address,
                fields.main_image_url,
                fields.short_description,
                property_id,
            ],
        )
        .map_err(from_rusqlite)
    }

    pub fn list_properties_for_owner(conn: &Connection, owner_id: &str) -> Result<Vec<Property>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {PROPERTY_COLUMNS} FROM properties WHERE owner_id = ?1 ORDER BY created_at, rowid"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([owner_id], property_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    // ---------- books ----------

    pub fn insert_book(conn: &Connection, book: &Book) -> Result<()> {
        conn.execute(
            "INSERT INTO books (id, property_id, title, layout_type, public_slug, is_published, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                book.id,
                book.property_id,
                book.title,
                book.layout_type,
                book.public_slug,
                book.is_published(),
                to_millis(book.created_at),
                to_millis(book.updated_at),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn get_book(conn: &Connection, book_id: &str) -> Result<Option<Book>> {
        conn.query_row(
            &format!("SELECT {BOOK_COLUMNS} FROM books WHERE id = ?1"),
            [book_id],
            book_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    pub fn list_books_for_owner(conn: &Connection, owner_id: &str) -> Result<Vec<Book>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {BOOK_COLUMNS} FROM books
                 WHERE property_id IN (SELECT id FROM properties WHERE owner_id = ?1)
                 ORDER BY created_at, rowid"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([owner_id], book_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// Overwrite title and layout; returns the number of rows changed
    pub fn update_book_fields(
        conn: &Connection,
        book_id: &str,
        title: &str,
        layout_type: &str,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE books SET title = ?1, layout_type = ?2, updated_at = ?3 WHERE id = ?4",
            params![title, layout_type, Utc::now().timestamp_millis(), book_id],
        )
        .map_err(from_rusqlite)
    }

    pub fn set_publish_state(conn: &Connection, book_id: &str, state: PublishState) -> Result<usize> {
        conn.execute(
            "UPDATE books SET is_published = ?1, updated_at = ?2 WHERE id = ?3",
            params![state.is_published(), Utc::now().timestamp_millis(), book_id],
        )
        .map_err(from_rusqlite)
    }

    /// Flip Published to Draft; returns whether this call changed the state
    pub fn demote_if_published(conn: &Connection, book_id: &str) -> Result<bool> {
        let changed = conn
            .execute(
                "UPDATE books SET is_published = 0, updated_at = ?1
                 WHERE id = ?2 AND is_published = 1",
                params![Utc::now().timestamp_millis(), book_id],
            )
            .map_err(from_rusqlite)?;
        Ok(changed == 1)
    }

    /// Delete the content tree, every version, then the book row
    pub fn delete_book(conn: &Connection, book_id: &str) -> Result<usize> {
        Self::delete_tree(conn, book_id)?;
        conn.execute("DELETE FROM book_versions WHERE book_id = ?1", [book_id])
            .map_err(from_rusqlite)?;
        conn.execute("DELETE FROM books WHERE id = ?1", [book_id])
            .map_err(from_rusqlite)
    }

    /// Delete all sections, subsections and media of a book, bottom-up
    pub fn delete_tree(conn: &Connection, book_id: &str) -> Result<()> {
        conn.execute(
            "DELETE FROM media WHERE subsection_id IN (
                SELECT ss.id FROM subsections ss
                JOIN sections s ON s.id = ss.section_id
                WHERE s.book_id = ?1)",
            [book_id],
        )
        .map_err(from_rusqlite)?;
        conn.execute(
            "DELETE FROM media WHERE section_id IN (SELECT id FROM sections WHERE book_id = ?1)",
            [book_id],
        )
        .map_err(from_rusqlite)?;
        conn.execute(
            "DELETE FROM subsections WHERE section_id IN (SELECT id FROM sections WHERE book_id = ?1)",
            [book_id],
        )
        .map_err(from_rusqlite)?;
        conn.execute("DELETE FROM sections WHERE book_id = ?1", [book_id])
            .map_err(from_rusqlite)?;
        Ok(())
    }

    // ---------- sections ----------

    pub fn insert_section(conn: &Connection, section: &Section) -> Result<()> {
        conn.execute(
            "INSERT INTO sections (id, book_id, title, ordinal, visible, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                section.id,
                section.book_id,
                section.title,
                section.ordinal,
                section.visible,
                to_millis(section.created_at),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn get_section(conn: &Connection, section_id: &str) -> Result<Option<Section>> {
        conn.query_row(
            &format!("SELECT {SECTION_COLUMNS} FROM sections WHERE id = ?1"),
            [section_id],
            section_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// All sections of a book by ordinal, hidden ones included
    pub fn list_sections(conn: &Connection, book_id: &str) -> Result<Vec<Section>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SECTION_COLUMNS} FROM sections WHERE book_id = ?1 ORDER BY ordinal, rowid"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([book_id], section_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    pub fn max_section_ordinal(conn: &Connection, book_id: &str) -> Result<Option<i64>> {
        conn.query_row(
            "SELECT MAX(ordinal) FROM sections WHERE book_id = ?1",
            [book_id],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    }

    pub fn rename_section(conn: &Connection, section_id: &str, title: &str) -> Result<usize> {
        conn.execute(
            "UPDATE sections SET title = ?1 WHERE id = ?2",
            params![title, section_id],
        )
        .map_err(from_rusqlite)
    }

    pub fn set_section_visible(conn: &Connection, section_id: &str, visible: bool) -> Result<usize> {
        conn.execute(
            "UPDATE sections SET visible = ?1 WHERE id = ?2",
            params![visible, section_id],
        )
        .map_err(from_rusqlite)
    }

    pub fn set_section_ordinal(conn: &Connection, section_id: &str, ordinal: i64) -> Result<usize> {
        conn.execute(
            "UPDATE sections SET ordinal = ?1 WHERE id = ?2",
            params![ordinal, section_id],
        )
        .map_err(from_rusqlite)
    }

    /// Delete a section with its media, its subsections' media and its subsections
    pub fn delete_section(conn: &Connection, section_id: &str) -> Result<usize> {
        conn.execute(
            "DELETE FROM media WHERE subsection_id IN (SELECT id FROM subsections WHERE section_id = ?1)",
            [section_id],
        )
        .map_err(from_rusqlite)?;
        conn.execute("DELETE FROM media WHERE section_id = ?1", [section_id])
            .map_err(from_rusqlite)?;
        conn.execute("DELETE FROM subsections WHERE section_id = ?1", [section_id])
            .map_err(from_rusqlite)?;
        conn.execute("DELETE FROM sections WHERE id = ?1", [section_id])
            .map_err(from_rusqlite)
    }

    // ---------- subsections ----------

    pub fn insert_subsection(conn: &Connection, sub: &Subsection) -> Result<()> {
        conn.execute(
            "INSERT INTO subsections (id, section_id, content_text, ordinal, visible, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                sub.id,
                sub.section_id,
                sub.content_text,
                sub.ordinal,
                sub.visible,
                sub.created_at.map(to_millis),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn get_subsection(conn: &Connection, subsection_id: &str) -> Result<Option<Subsection>> {
        conn.query_row(
            &format!("SELECT {SUBSECTION_COLUMNS} FROM subsections WHERE id = ?1"),
            [subsection_id],
            subsection_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Subsections of one section in editor order
    pub fn list_subsections(conn: &Connection, section_id: &str) -> Result<Vec<Subsection>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SUBSECTION_COLUMNS} FROM subsections WHERE section_id = ?1 ORDER BY {SUBSECTION_ORDER}"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([section_id], subsection_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// All subsections of a book by creation time (undated last)
    pub fn list_subsections_for_book(conn: &Connection, book_id: &str) -> Result<Vec<Subsection>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {SUBSECTION_COLUMNS} FROM subsections
                 WHERE section_id IN (SELECT id FROM sections WHERE book_id = ?1)
                 ORDER BY created_at IS NULL, created_at, rowid"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([book_id], subsection_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    pub fn max_subsection_ordinal(conn: &Connection, section_id: &str) -> Result<Option<i64>> {
        conn.query_row(
            "SELECT MAX(ordinal) FROM subsections WHERE section_id = ?1",
            [section_id],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    }

    pub fn update_subsection_text(
        conn: &Connection,
        subsection_id: &str,
        content_text: &str,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE subsections SET content_text = ?1 WHERE id = ?2",
            params![content_text, subsection_id],
        )
        .map_err(from_rusqlite)
    }

    pub fn set_subsection_visible(
        conn: &Connection,
        subsection_id: &str,
        visible: bool,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE subsections SET visible = ?1 WHERE id = ?2",
            params![visible, subsection_id],
        )
        .map_err(from_rusqlite)
    }

    pub fn set_subsection_ordinal(
        conn: &Connection,
        subsection_id: &str,
        ordinal: i64,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE subsections SET ordinal = ?1 WHERE id = ?2",
            params![ordinal, subsection_id],
        )
        .map_err(from_rusqlite)
    }

    /// Delete a subsection with its media
    pub fn delete_subsection(conn: &Connection, subsection_id: &str) -> Result<usize> {
        conn.execute("DELETE FROM media WHERE subsection_id = ?1", [subsection_id])
            .map_err(from_rusqlite)?;
        conn.execute("DELETE FROM subsections WHERE id = ?1", [subsection_id])
            .map_err(from_rusqlite)
    }

    // ---------- media ----------

    pub fn insert_media(conn: &Connection, item: &MediaAttachment) -> Result<()> {
        let (section_id, subsection_id) = item.parent.columns();
        conn.execute(
            "INSERT INTO media (id, section_id, subsection_id, url, kind, ordinal, description, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
            params![
                item.id,
                section_id,
                subsection_id,
                item.url,
                item.kind.as_str(),
                item.ordinal,
                item.description,
                item.created_at.map(to_millis),
            ],
        )
        .map_err(from_rusqlite)?;
        Ok(())
    }

    pub fn get_media(conn: &Connection, media_id: &str) -> Result<Option<MediaAttachment>> {
        conn.query_row(
            &format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = ?1"),
            [media_id],
            media_from_row,
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Media of one parent in display order
    pub fn list_media_for_parent(
        conn: &Connection,
        parent: &MediaParent,
    ) -> Result<Vec<MediaAttachment>> {
        let column = parent_column(parent);
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {MEDIA_COLUMNS} FROM media WHERE {column} = ?1 ORDER BY {MEDIA_ORDER}"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([parent.id()], media_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    /// All media of a book (section- and subsection-scoped) in display order
    pub fn list_media_for_book(conn: &Connection, book_id: &str) -> Result<Vec<MediaAttachment>> {
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {MEDIA_COLUMNS} FROM media
                 WHERE section_id IN (SELECT id FROM sections WHERE book_id = ?1)
                    OR subsection_id IN (
                        SELECT ss.id FROM subsections ss
                        JOIN sections s ON s.id = ss.section_id
                        WHERE s.book_id = ?1)
                 ORDER BY {MEDIA_ORDER}"
            ))
            .map_err(from_rusqlite)?;
        let rows = stmt
            .query_map([book_id], media_from_row)
            .map_err(from_rusqlite)?
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(from_rusqlite)?;
        Ok(rows)
    }

    pub fn max_media_ordinal(conn: &Connection, parent: &MediaParent) -> Result<Option<i64>> {
        conn.query_row(
            &format!(
                "SELECT MAX(ordinal) FROM media WHERE {} = ?1",
                parent_column(parent)
            ),
            [parent.id()],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)
    }

    pub fn update_media_description(
        conn: &Connection,
        media_id: &str,
        description: Option<&str>,
    ) -> Result<usize> {
        conn.execute(
            "UPDATE media SET description = ?1 WHERE id = ?2",
            params![description, media_id],
        )
        .map_err(from_rusqlite)
    }

    pub fn set_media_ordinal(conn: &Connection, media_id: &str, ordinal: i64) -> Result<usize> {
        conn.execute(
            "UPDATE media SET ordinal = ?1 WHERE id = ?2",
            params![ordinal, media_id],
        )
        .map_err(from_rusqlite)
    }

    pub fn delete_media(conn: &Connection, media_id: &str) -> Result<usize> {
        conn.execute("DELETE FROM media WHERE id = ?1", [media_id])
            .map_err(from_rusqlite)
    }

    // ---------- ownership lookups ----------

    /// Book that owns a section
    pub fn book_id_of_section(conn: &Connection, section_id: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT book_id FROM sections WHERE id = ?1",
            [section_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Book that owns a subsection (through its section)
    pub fn book_id_of_subsection(conn: &Connection, subsection_id: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT s.book_id FROM subsections ss JOIN sections s ON s.id = ss.section_id
             WHERE ss.id = ?1",
            [subsection_id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)
    }

    /// Book that owns a media row (through either parent)
    pub fn book_id_of_media(conn: &Connection, media_id: &str) -> Result<Option<String>> {
        match Self::get_media(conn, media_id)? {
            Some(item) => Self::book_id_of_parent(conn, &item.parent),
            None => Ok(None),
        }
    }

    pub fn book_id_of_parent(conn: &Connection, parent: &MediaParent) -> Result<Option<String>> {
        match parent {
            MediaParent::Section(id) => Self::book_id_of_section(conn, id),
            MediaParent::Subsection(id) => Self::book_id_of_subsection(conn, id),
        }
    }
}

fn parent_column(parent: &MediaParent) -> &'static str {
    match parent {
        MediaParent::Section(_) => "section_id",
        MediaParent::Subsection(_) => "subsection_id",
    }
}
