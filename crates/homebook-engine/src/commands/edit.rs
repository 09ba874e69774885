//! Editor mutation hooks
//!
//! Every mutation goes through [`mutate`]: ownership check, one transaction
//! holding the change plus [`ensure_draft_on_mutation`], then notifications
//! after commit. A published book is demoted to draft exactly once per
//! mutation, and never re-promoted here.

#![allow(clippy::result_large_err)]

use chrono::Utc;
use homebook_core::errors::{ExError, ExErrorKind};
use homebook_core::layouts::LayoutId;
use homebook_core::model::{
    normalize_title, MediaAttachment, MediaKind, MediaParent, PublishState, Section, Subsection,
    SubsectionText,
};
use homebook_core::notifier::{invalidation_paths, ViewEvent, ViewNotifier};
use homebook_core::ops::{next_ordinal, plan_reorder};
use homebook_core::snapshot::PropertyFields;
use homebook_store::errors::from_rusqlite;
use homebook_store::{Result, SqliteRepo};
use rusqlite::Connection;
use uuid::Uuid;

use super::access::{require_in_book, require_owned_book, OwnedBook};
use super::logged;

/// Demote a published book to draft; returns whether the state changed
///
/// Call inside the mutation's own transaction.
pub fn ensure_draft_on_mutation(conn: &Connection, book_id: &str) -> Result<bool> {
    SqliteRepo::demote_if_published(conn, book_id)
}

fn mutate<T>(
    op: &'static str,
    caller_id: &str,
    book_id: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
    f: impl FnOnce(&Connection, &OwnedBook) -> Result<T>,
) -> Result<T> {
    logged(op, book_id, || {
        let owned = require_owned_book(conn, caller_id, book_id)?;

        let tx = conn.transaction().map_err(from_rusqlite)?;
        let value = f(&*tx, &owned)?;
        let demoted = ensure_draft_on_mutation(&tx, book_id)?;
        tx.commit().map_err(from_rusqlite)?;

        let mut after = owned.book.clone();
        if demoted {
            after.state = PublishState::Draft;
            tracing::debug!(book_id, op, "Demoted to draft on edit");
            notifier.notify(ViewEvent::DemotedToDraft {
                book_id: book_id.to_string(),
            });
        }
        notifier.notify(ViewEvent::Invalidate {
            book_id: book_id.to_string(),
            paths: invalidation_paths(&after, owned.book.is_published()),
        });

        Ok(value)
    })
}

fn invalid_input(op: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::InvalidInput)
        .with_op(op)
        .with_message(message)
}

fn require_section(conn: &Connection, book_id: &str, section_id: &str) -> Result<()> {
    require_in_book(
        SqliteRepo::book_id_of_section(conn, section_id)?,
        book_id,
        section_id,
        "section",
    )
}

fn require_subsection(conn: &Connection, book_id: &str, subsection_id: &str) -> Result<()> {
    require_in_book(
        SqliteRepo::book_id_of_subsection(conn, subsection_id)?,
        book_id,
        subsection_id,
        "subsection",
    )
}

fn require_media(conn: &Connection, book_id: &str, media_id: &str) -> Result<()> {
    require_in_book(
        SqliteRepo::book_id_of_media(conn, media_id)?,
        book_id,
        media_id,
        "media",
    )
}

// ---------- sections ----------

/// Append a section after the current last one
pub fn add_section(
    caller_id: &str,
    book_id: &str,
    title: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<Section> {
    mutate("add_section", caller_id, book_id, notifier, conn, |tx, _| {
        let title = normalize_title(title)?;
        let ordinal = next_ordinal(SqliteRepo::max_section_ordinal(tx, book_id)?);
        let section = Section::new(Uuid::now_v7().to_string(), book_id.to_string(), title, ordinal);
        SqliteRepo::insert_section(tx, &section)?;
        Ok(section)
    })
}

pub fn rename_section(
    caller_id: &str,
    book_id: &str,
    section_id: &str,
    title: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("rename_section", caller_id, book_id, notifier, conn, |tx, _| {
        require_section(tx, book_id, section_id)?;
        let title = normalize_title(title)?;
        SqliteRepo::rename_section(tx, section_id, &title)?;
        Ok(())
    })
}

pub fn set_section_visibility(
    caller_id: &str,
    book_id: &str,
    section_id: &str,
    visible: bool,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("set_section_visibility", caller_id, book_id, notifier, conn, |tx, _| {
        require_section(tx, book_id, section_id)?;
        SqliteRepo::set_section_visible(tx, section_id, visible)?;
        Ok(())
    })
}

/// Reorder all sections of a book; `ordered_ids` must list each exactly once
pub fn reorder_sections(
    caller_id: &str,
    book_id: &str,
    ordered_ids: &[String],
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("reorder_sections", caller_id, book_id, notifier, conn, |tx, _| {
        let current: Vec<String> = SqliteRepo::list_sections(tx, book_id)?
            .into_iter()
            .map(|s| s.id)
            .collect();
        for (id, ordinal) in plan_reorder("sections", &current, ordered_ids)? {
            SqliteRepo::set_section_ordinal(tx, &id, ordinal)?;
        }
        Ok(())
    })
}

/// Delete a section with its subsections and all their media
pub fn delete_section(
    caller_id: &str,
    book_id: &str,
    section_id: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("delete_section", caller_id, book_id, notifier, conn, |tx, _| {
        require_section(tx, book_id, section_id)?;
        SqliteRepo::delete_section(tx, section_id)?;
        Ok(())
    })
}

// ---------- subsections ----------

pub fn add_subsection(
    caller_id: &str,
    book_id: &str,
    section_id: &str,
    text: &SubsectionText,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<Subsection> {
    mutate("add_subsection", caller_id, book_id, notifier, conn, |tx, _| {
        require_section(tx, book_id, section_id)?;
        let ordinal = next_ordinal(SqliteRepo::max_subsection_ordinal(tx, section_id)?);
        let sub = Subsection::new(
            Uuid::now_v7().to_string(),
            section_id.to_string(),
            text.pack(),
            Some(ordinal),
        );
        SqliteRepo::insert_subsection(tx, &sub)?;
        Ok(sub)
    })
}

pub fn update_subsection_text(
    caller_id: &str,
    book_id: &str,
    subsection_id: &str,
    text: &SubsectionText,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("update_subsection_text", caller_id, book_id, notifier, conn, |tx, _| {
        require_subsection(tx, book_id, subsection_id)?;
        SqliteRepo::update_subsection_text(tx, subsection_id, &text.pack())?;
        Ok(())
    })
}

pub fn set_subsection_visibility(
    caller_id: &str,
    book_id: &str,
    subsection_id: &str,
    visible: bool,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("set_subsection_visibility", caller_id, book_id, notifier, conn, |tx, _| {
        require_subsection(tx, book_id, subsection_id)?;
        SqliteRepo::set_subsection_visible(tx, subsection_id, visible)?;
        Ok(())
    })
}

/// Reorder the subsections of one section
pub fn reorder_subsections(
    caller_id: &str,
    book_id: &str,
    section_id: &str,
    ordered_ids: &[String],
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("reorder_subsections", caller_id, book_id, notifier, conn, |tx, _| {
        require_section(tx, book_id, section_id)?;
        let current: Vec<String> = SqliteRepo::list_subsections(tx, section_id)?
            .into_iter()
            .map(|s| s.id)
            .collect();
        for (id, ordinal) in plan_reorder("subsections", &current, ordered_ids)? {
            SqliteRepo::set_subsection_ordinal(tx, &id, ordinal)?;
        }
        Ok(())
    })
}

pub fn delete_subsection(
    caller_id: &str,
    book_id: &str,
    subsection_id: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("delete_subsection", caller_id, book_id, notifier, conn, |tx, _| {
        require_subsection(tx, book_id, subsection_id)?;
        SqliteRepo::delete_subsection(tx, subsection_id)?;
        Ok(())
    })
}

// ---------- media ----------

/// Media to attach; the url is an opaque storage key or fetchable url
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub parent: MediaParent,
    pub url: String,
    pub kind: MediaKind,
    pub description: Option<String>,
}

pub fn add_media(
    caller_id: &str,
    book_id: &str,
    media: NewMedia,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<MediaAttachment> {
    mutate("add_media", caller_id, book_id, notifier, conn, |tx, _| {
        match &media.parent {
            MediaParent::Section(id) => require_section(tx, book_id, id)?,
            MediaParent::Subsection(id) => require_subsection(tx, book_id, id)?,
        }
        let url = media.url.trim();
        if url.is_empty() {
            return Err(invalid_input("add_media", "media url cannot be empty"));
        }
        let ordinal = next_ordinal(SqliteRepo::max_media_ordinal(tx, &media.parent)?);

        let mut item = MediaAttachment::new(
            Uuid::now_v7().to_string(),
            media.parent.clone(),
            url.to_string(),
            media.kind,
        );
        item.ordinal = Some(ordinal);
        item.description = media.description.clone();
        item.created_at = Some(Utc::now());
        SqliteRepo::insert_media(tx, &item)?;
        Ok(item)
    })
}

pub fn update_media_description(
    caller_id: &str,
    book_id: &str,
    media_id: &str,
    description: Option<&str>,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("update_media_description", caller_id, book_id, notifier, conn, |tx, _| {
        require_media(tx, book_id, media_id)?;
        let description = description.map(str::trim).filter(|d| !d.is_empty());
        SqliteRepo::update_media_description(tx, media_id, description)?;
        Ok(())
    })
}

pub fn remove_media(
    caller_id: &str,
    book_id: &str,
    media_id: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("remove_media", caller_id, book_id, notifier, conn, |tx, _| {
        require_media(tx, book_id, media_id)?;
        SqliteRepo::delete_media(tx, media_id)?;
        Ok(())
    })
}

/// Reorder the media of one parent
pub fn reorder_media(
    caller_id: &str,
    book_id: &str,
    parent: &MediaParent,
    ordered_ids: &[String],
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("reorder_media", caller_id, book_id, notifier, conn, |tx, _| {
        match parent {
            MediaParent::Section(id) => require_section(tx, book_id, id)?,
            MediaParent::Subsection(id) => require_subsection(tx, book_id, id)?,
        }
        let current: Vec<String> = SqliteRepo::list_media_for_parent(tx, parent)?
            .into_iter()
            .map(|m| m.id)
            .collect();
        for (id, ordinal) in plan_reorder("media", &current, ordered_ids)? {
            SqliteRepo::set_media_ordinal(tx, &id, ordinal)?;
        }
        Ok(())
    })
}

// ---------- book details ----------

/// Partial update of book and property display fields
///
/// `None` leaves a field unchanged; for the optional property fields an
/// empty string clears the value.
#[derive(Debug, Clone, Default)]
pub struct BookDetailsUpdate {
    pub title: Option<String>,
    pub layout: Option<String>,
    pub property_name: Option<String>,
    pub address: Option<String>,
    pub main_image_url: Option<String>,
    pub short_description: Option<String>,
}

fn merge_optional(current: Option<String>, update: Option<&String>) -> Option<String> {
    match update {
        Some(value) if value.trim().is_empty() => None,
        Some(value) => Some(value.trim().to_string()),
        None => current,
    }
}

pub fn update_book_details(
    caller_id: &str,
    book_id: &str,
    update: &BookDetailsUpdate,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<()> {
    mutate("update_book_details", caller_id, book_id, notifier, conn, |tx, owned| {
        let title = match &update.title {
            Some(raw) => normalize_title(raw)?,
            None => owned.book.title.clone(),
        };
        let layout = match &update.layout {
            Some(raw) => LayoutId::parse(raw)?.as_str().to_string(),
            None => owned.book.layout_type.clone(),
        };
        SqliteRepo::update_book_fields(tx, book_id, &title, &layout)?;

        let property = &owned.property;
        let fields = PropertyFields {
            name: match &update.property_name {
                Some(raw) => normalize_title(raw)?,
                None => property.name.clone(),
            },
            address: merge_optional(property.address.clone(), update.address.as_ref()),
            main_image_url: merge_optional(
                property.main_image_url.clone(),
                update.main_image_url.as_ref(),
            ),
            short_description: merge_optional(
                property.short_description.clone(),
                update.short_description.as_ref(),
            ),
        };
        SqliteRepo::update_property_display(tx, &property.id, &fields)?;
        Ok(())
    })
}
