//! Publish state machine
//!
//! `Draft` and `Published` are the only states. A book becomes `Published`
//! only through a successful publish or restore; unpublishing and editing
//! both lead back to `Draft`.

#![allow(clippy::result_large_err)]

use homebook_core::errors::{ExError, ExErrorKind};
use homebook_core::model::{Book, PublishState};
use homebook_core::notifier::{invalidation_paths, ViewEvent, ViewNotifier};
use homebook_store::errors::{from_rusqlite, is_busy};
use homebook_store::{snapshot, versions, Result, SqliteRepo};
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};

use super::access::require_owned_book;
use super::logged;
use super::restore::restore;

/// Inbound publish action
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishAction {
    Publish,
    Draft,
    RestoreLatestPublished,
}

impl PublishAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PublishAction::Publish => "publish",
            PublishAction::Draft => "draft",
            PublishAction::RestoreLatestPublished => "restore_latest_published",
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidAction` for anything but the three known actions.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw.trim() {
            "publish" => Ok(PublishAction::Publish),
            "draft" => Ok(PublishAction::Draft),
            "restore_latest_published" => Ok(PublishAction::RestoreLatestPublished),
            other => Err(ExError::new(ExErrorKind::InvalidAction)
                .with_op("publish_action")
                .with_message(format!("unknown action '{other}'"))),
        }
    }
}

impl std::fmt::Display for PublishAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of a successful transition
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishOutcome {
    pub action: PublishAction,
    pub is_published: bool,
    /// New version for `publish`, restored version for `restore_latest_published`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version_no: Option<i64>,
}

fn notify_views(notifier: &dyn ViewNotifier, before: &Book, after: PublishState) {
    let mut book = before.clone();
    book.state = after;
    notifier.notify(ViewEvent::Invalidate {
        book_id: book.id.clone(),
        paths: invalidation_paths(&book, before.is_published()),
    });
}

/// Capture the live tree, append it as a new version and mark the book published
///
/// Capture, append and the state change commit together: on any failure the
/// book keeps its previous state and no version is added. The transaction
/// takes the write lock up front so concurrent publishes of one database
/// run one after the other instead of racing on the next version number.
///
/// # Errors
///
/// `NotFound`, `Forbidden`, `CaptureFailed`, `VersionAppendFailed`,
/// `Concurrency`
pub fn publish(
    caller_id: &str,
    book_id: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<PublishOutcome> {
    logged("publish", book_id, || {
        let owned = require_owned_book(conn, caller_id, book_id)?;

        let tx = conn
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(|e| {
                if is_busy(&e) {
                    ExError::new(ExErrorKind::Concurrency)
                        .with_op("publish")
                        .with_entity_id(book_id)
                        .with_message(format!("another writer holds the database: {e}"))
                } else {
                    from_rusqlite(e)
                }
            })?;
        let captured = snapshot::capture(&tx, book_id)?;
        let version_no = versions::append(&tx, book_id, &captured, caller_id)?;
        SqliteRepo::set_publish_state(&tx, book_id, PublishState::Published)?;
        tx.commit().map_err(from_rusqlite)?;

        notify_views(notifier, &owned.book, PublishState::Published);

        Ok(PublishOutcome {
            action: PublishAction::Publish,
            is_published: true,
            version_no: Some(version_no),
        })
    })
}

/// Mark the book draft; no snapshot is involved
///
/// # Errors
///
/// `NotFound`, `Forbidden`, `Persistence`
pub fn unpublish(
    caller_id: &str,
    book_id: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<PublishOutcome> {
    logged("draft", book_id, || {
        let owned = require_owned_book(conn, caller_id, book_id)?;
        SqliteRepo::set_publish_state(conn, book_id, PublishState::Draft)?;

        notify_views(notifier, &owned.book, PublishState::Draft);

        Ok(PublishOutcome {
            action: PublishAction::Draft,
            is_published: false,
            version_no: None,
        })
    })
}

/// Restore the most recently created version and mark the book published
///
/// # Errors
///
/// - `NoPublishedSnapshot` if the book has no versions (state unchanged)
/// - `RestoreStageFailed` from the restore (state unchanged)
/// - `NotFound`, `Forbidden`
pub fn restore_latest_published(
    caller_id: &str,
    book_id: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<PublishOutcome> {
    logged("restore_latest_published", book_id, || {
        let owned = require_owned_book(conn, caller_id, book_id)?;

        let latest = versions::latest(conn, book_id)?.ok_or_else(|| {
            ExError::new(ExErrorKind::NoPublishedSnapshot)
                .with_op("restore_latest_published")
                .with_entity_id(book_id)
                .with_message("book has no published version")
        })?;

        restore(conn, book_id, &latest.snapshot)?;
        SqliteRepo::set_publish_state(conn, book_id, PublishState::Published)?;

        notify_views(notifier, &owned.book, PublishState::Published);

        Ok(PublishOutcome {
            action: PublishAction::RestoreLatestPublished,
            is_published: true,
            version_no: Some(latest.summary.version_no),
        })
    })
}
