//! Ownership checks
//!
//! A missing book or property is `NotFound`; an existing one owned by
//! someone else is `Forbidden`. The two are never conflated.

#![allow(clippy::result_large_err)]

use homebook_core::errors::{ExError, ExErrorKind};
use homebook_core::model::{Book, Property};
use homebook_store::{Result, SqliteRepo};
use rusqlite::Connection;

/// A book together with the property that owns it
#[derive(Debug, Clone)]
pub struct OwnedBook {
    pub book: Book,
    pub property: Property,
}

fn not_found(op: &str, id: &str, what: &str) -> ExError {
    ExError::new(ExErrorKind::NotFound)
        .with_op(op)
        .with_entity_id(id)
        .with_message(format!("{what} not found"))
}

fn forbidden(op: &str, id: &str) -> ExError {
    ExError::new(ExErrorKind::Forbidden)
        .with_op(op)
        .with_entity_id(id)
        .with_message("caller does not own this property")
}

/// Load a property the caller owns
pub fn require_owned_property(
    conn: &Connection,
    caller_id: &str,
    property_id: &str,
) -> Result<Property> {
    let property = SqliteRepo::get_property(conn, property_id)?
        .ok_or_else(|| not_found("authorize", property_id, "property"))?;
    if !property.is_owned_by(caller_id) {
        return Err(forbidden("authorize", property_id));
    }
    Ok(property)
}

/// Load a book whose property the caller owns
pub fn require_owned_book(conn: &Connection, caller_id: &str, book_id: &str) -> Result<OwnedBook> {
    let book = SqliteRepo::get_book(conn, book_id)?
        .ok_or_else(|| not_found("authorize", book_id, "book"))?;
    let property = SqliteRepo::get_property(conn, &book.property_id)?
        .ok_or_else(|| not_found("authorize", &book.property_id, "property"))?;
    if !property.is_owned_by(caller_id) {
        return Err(forbidden("authorize", book_id));
    }
    Ok(OwnedBook { book, property })
}

/// Fail with `NotFound` unless `owner_book_id` is `book_id`
pub(crate) fn require_in_book(
    owner_book_id: Option<String>,
    book_id: &str,
    target_id: &str,
    what: &str,
) -> Result<()> {
    match owner_book_id {
        Some(owner) if owner == book_id => Ok(()),
        _ => Err(not_found("authorize", target_id, what)),
    }
}
