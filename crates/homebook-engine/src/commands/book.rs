//! Property and book lifecycle, plus read-only views over a book

#![allow(clippy::result_large_err)]

use homebook_core::checklist::{self, ChecklistItem};
use homebook_core::layouts::{default_sections, LayoutId};
use homebook_core::model::{normalize_title, Book, MediaAttachment, Property, Section, Subsection};
use homebook_core::notifier::{ViewEvent, ViewNotifier};
use homebook_core::snapshot::{subsections_in_order, PropertyFields, SubsectionRecord};
use homebook_store::errors::from_rusqlite;
use homebook_store::{snapshot, versions, Result, SqliteRepo, VersionSummary};
use rusqlite::Connection;
use serde::Serialize;
use uuid::Uuid;

use super::access::{require_owned_book, require_owned_property};
use super::{logged, logged_unscoped};

const PUBLIC_SLUG_LEN: usize = 10;

fn optional_field(raw: Option<&String>) -> Option<String> {
    raw.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

/// Create a property owned by `caller_id`
///
/// The name is required; blank optional fields are stored as absent.
pub fn create_property(
    conn: &Connection,
    caller_id: &str,
    fields: &PropertyFields,
) -> Result<Property> {
    logged_unscoped("create_property", || {
        let mut property = Property::new(
            Uuid::now_v7().to_string(),
            caller_id.to_string(),
            normalize_title(&fields.name)?,
        );
        property.address = optional_field(fields.address.as_ref());
        property.main_image_url = optional_field(fields.main_image_url.as_ref());
        property.short_description = optional_field(fields.short_description.as_ref());
        SqliteRepo::insert_property(conn, &property)?;
        tracing::debug!(property_id = %property.id, "Created property");
        Ok(property)
    })
}

/// Create a draft book seeded with the layout's default sections
///
/// `layout` defaults to the classic layout when absent.
pub fn create_book(
    conn: &mut Connection,
    caller_id: &str,
    property_id: &str,
    title: &str,
    layout: Option<&str>,
) -> Result<Book> {
    let book_id = Uuid::now_v7().to_string();
    logged("create_book", &book_id, || {
        require_owned_property(conn, caller_id, property_id)?;
        let layout = match layout {
            Some(raw) => LayoutId::parse(raw)?,
            None => LayoutId::default(),
        };

        let mut book = Book::new(
            book_id.clone(),
            property_id.to_string(),
            normalize_title(title)?,
            layout.as_str().to_string(),
        );
        let slug: String = Uuid::new_v4()
            .simple()
            .to_string()
            .chars()
            .take(PUBLIC_SLUG_LEN)
            .collect();
        book.public_slug = Some(slug);

        let tx = conn.transaction().map_err(from_rusqlite)?;
        SqliteRepo::insert_book(&tx, &book)?;
        for (title, ordinal) in default_sections(layout) {
            let section = Section::new(
                Uuid::now_v7().to_string(),
                book.id.clone(),
                title.to_string(),
                ordinal,
            );
            SqliteRepo::insert_section(&tx, &section)?;
        }
        tx.commit().map_err(from_rusqlite)?;

        Ok(book)
    })
}

/// Delete a book with its whole tree and version history
pub fn delete_book(
    caller_id: &str,
    book_id: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    logged("delete_book", book_id, || {
        let owned = require_owned_book(conn, caller_id, book_id)?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        SqliteRepo::delete_book(&tx, book_id)?;
        tx.commit().map_err(from_rusqlite)?;

        let mut paths = vec!["/dashboard".to_string()];
        if let Some(slug) = owned.book.public_slug.as_deref().filter(|s| !s.is_empty()) {
            paths.push(format!("/p/{slug}"));
        }
        notifier.notify(ViewEvent::Invalidate {
            book_id: book_id.to_string(),
            paths,
        });
        Ok(())
    })
}

pub fn list_books(conn: &Connection, caller_id: &str) -> Result<Vec<Book>> {
    SqliteRepo::list_books_for_owner(conn, caller_id)
}

/// Version history of a book, newest first
pub fn list_versions(conn: &Connection, caller_id: &str, book_id: &str) -> Result<Vec<VersionSummary>> {
    require_owned_book(conn, caller_id, book_id)?;
    versions::list(conn, book_id)
}

/// Nested editor view of a book
#[derive(Debug, Clone, Serialize)]
pub struct BookTree {
    pub book: Book,
    pub property: Property,
    pub sections: Vec<SectionNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SectionNode {
    pub section: Section,
    pub media: Vec<MediaAttachment>,
    pub subsections: Vec<SubsectionNode>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubsectionNode {
    pub subsection: Subsection,
    pub title: String,
    pub body: String,
    pub media: Vec<MediaAttachment>,
}

/// Load the live tree in editor order
pub fn book_tree(conn: &Connection, caller_id: &str, book_id: &str) -> Result<BookTree> {
    let owned = require_owned_book(conn, caller_id, book_id)?;
    let media = SqliteRepo::list_media_for_book(conn, book_id)?;
    let media_of = |parent_id: &str| -> Vec<MediaAttachment> {
        media
            .iter()
            .filter(|m| m.parent.id() == parent_id)
            .cloned()
            .collect()
    };

    let mut sections = Vec::new();
    for section in SqliteRepo::list_sections(conn, book_id)? {
        let rows = SqliteRepo::list_subsections(conn, &section.id)?;
        let records: Vec<SubsectionRecord> = rows.iter().map(SubsectionRecord::from).collect();
        let subsections = subsections_in_order(&records)
            .into_iter()
            .filter_map(|record| rows.iter().find(|s| s.id == record.id))
            .map(|sub| {
                let text = sub.text();
                SubsectionNode {
                    subsection: sub.clone(),
                    title: text.title,
                    body: text.body,
                    media: media_of(&sub.id),
                }
            })
            .collect();
        sections.push(SectionNode {
            media: media_of(&section.id),
            section,
            subsections,
        });
    }

    Ok(BookTree {
        book: owned.book,
        property: owned.property,
        sections,
    })
}

/// Advisory publish checklist; never blocks publishing
pub fn checklist(conn: &Connection, caller_id: &str, book_id: &str) -> Result<Vec<ChecklistItem>> {
    logged("checklist", book_id, || {
        require_owned_book(conn, caller_id, book_id)?;
        let captured = snapshot::capture(conn, book_id)?;
        Ok(checklist::review(&captured))
    })
}
