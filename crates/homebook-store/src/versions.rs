//! Version history of published snapshots
//!
//! Versions are numbered per book as `max + 1`, never reused. After every
//! append the history is cut back to the newest `VERSION_RETENTION` rows,
//! recomputed from scratch each time so a skipped or failed prune is healed
//! by the next append.

#![allow(clippy::result_large_err)]

use crate::errors::{from_rusqlite, is_busy, is_unique_violation, Result};
use crate::repo::hydration::from_millis;
use chrono::{DateTime, Utc};
use homebook_core::errors::{ExError, ExErrorKind};
use homebook_core::snapshot::Snapshot;
use rusqlite::{params, Connection, OptionalExtension, Row};
use serde::Serialize;

/// Number of versions kept per book
pub const VERSION_RETENTION: usize = 10;

/// Newest first; the autoincrement id breaks timestamp ties by insertion order
const RECENCY_ORDER: &str = "created_at DESC, id DESC";

/// Version row without its payload
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionSummary {
    pub id: i64,
    pub book_id: String,
    pub version_no: i64,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

/// Version row with its decoded snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct VersionRecord {
    pub summary: VersionSummary,
    pub snapshot: Snapshot,
}

fn summary_from_row(row: &Row<'_>) -> rusqlite::Result<VersionSummary> {
    Ok(VersionSummary {
        id: row.get(0)?,
        book_id: row.get(1)?,
        version_no: row.get(2)?,
        created_by: row.get(3)?,
        created_at: from_millis(4, row.get(4)?)?,
    })
}

fn append_failed(book_id: &str, message: impl Into<String>) -> ExError {
    ExError::new(ExErrorKind::VersionAppendFailed)
        .with_op("append_version")
        .with_entity_id(book_id)
        .with_message(message)
}

/// `max(version_no) + 1`, or 1 for a book without versions
pub fn next_version_no(conn: &Connection, book_id: &str) -> Result<i64> {
    let max: Option<i64> = conn
        .query_row(
            "SELECT MAX(version_no) FROM book_versions WHERE book_id = ?1",
            [book_id],
            |row| row.get(0),
        )
        .map_err(from_rusqlite)?;
    Ok(max.unwrap_or(0) + 1)
}

/// Insert one version row; returns its row id
///
/// # Errors
///
/// - `Concurrency` if `version_no` is already taken for this book, or another
///   connection committed a write after this transaction began reading
/// - `VersionAppendFailed` for any other write failure
pub fn insert_version(
    conn: &Connection,
    book_id: &str,
    version_no: i64,
    snapshot: &Snapshot,
    author_id: &str,
) -> Result<i64> {
    let payload = snapshot
        .to_json()
        .map_err(|e| append_failed(book_id, e.to_string()))?;

    conn.execute(
        "INSERT INTO book_versions (book_id, version_no, snapshot, created_by, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            book_id,
            version_no,
            payload,
            author_id,
            Utc::now().timestamp_millis()
        ],
    )
    .map_err(|e| {
        if is_unique_violation(&e) || is_busy(&e) {
            ExError::new(ExErrorKind::Concurrency)
                .with_op("append_version")
                .with_entity_id(book_id)
                .with_message(format!(
                    "version {version_no} lost to a concurrent publish: {e}"
                ))
        } else {
            append_failed(book_id, e.to_string())
        }
    })?;

    Ok(conn.last_insert_rowid())
}

/// Delete every version beyond the newest `keep`; returns how many were removed
pub fn prune(conn: &Connection, book_id: &str, keep: usize) -> Result<usize> {
    let keep = i64::try_from(keep).unwrap_or(i64::MAX);
    conn.execute(
        &format!(
            "DELETE FROM book_versions
             WHERE book_id = ?1
               AND id NOT IN (
                   SELECT id FROM book_versions WHERE book_id = ?1
                   ORDER BY {RECENCY_ORDER} LIMIT ?2)"
        ),
        params![book_id, keep],
    )
    .map_err(from_rusqlite)
}

/// Append a snapshot as the next version, then apply retention
///
/// Returns the new version number. A failed prune is logged and left for the
/// next append to converge.
///
/// # Errors
///
/// See [`insert_version`]; failing to read the current maximum is
/// `VersionAppendFailed`.
pub fn append(conn: &Connection, book_id: &str, snapshot: &Snapshot, author_id: &str) -> Result<i64> {
    let version_no = next_version_no(conn, book_id).map_err(|e| {
        append_failed(book_id, "could not read the current version number").with_source(e)
    })?;
    insert_version(conn, book_id, version_no, snapshot, author_id)?;

    match prune(conn, book_id, VERSION_RETENTION) {
        Ok(0) => {}
        Ok(removed) => tracing::debug!(book_id, removed, "Pruned old versions"),
        Err(e) => tracing::warn!(book_id, error = %e, "Version prune failed"),
    }

    Ok(version_no)
}

/// Most recently created version, decoded
pub fn latest(conn: &Connection, book_id: &str) -> Result<Option<VersionRecord>> {
    let row = conn
        .query_row(
            &format!(
                "SELECT id, book_id, version_no, created_by, created_at, snapshot
                 FROM book_versions WHERE book_id = ?1
                 ORDER BY {RECENCY_ORDER} LIMIT 1"
            ),
            [book_id],
            |row| Ok((summary_from_row(row)?, row.get::<_, String>(5)?)),
        )
        .optional()
        .map_err(from_rusqlite)?;

    match row {
        Some((summary, payload)) => {
            let snapshot = Snapshot::from_json(&payload).map_err(|e| {
                ExError::from(e)
                    .with_op("load_version")
                    .with_entity_id(summary.id.to_string())
            })?;
            Ok(Some(VersionRecord { summary, snapshot }))
        }
        None => Ok(None),
    }
}

/// All retained versions of a book, newest first
pub fn list(conn: &Connection, book_id: &str) -> Result<Vec<VersionSummary>> {
    let mut stmt = conn
        .prepare(&format!(
            "SELECT id, book_id, version_no, created_by, created_at
             FROM book_versions WHERE book_id = ?1 ORDER BY {RECENCY_ORDER}"
        ))
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([book_id], summary_from_row)
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    Ok(rows)
}
