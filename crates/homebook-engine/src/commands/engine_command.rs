//! Inbound publish commands
//!
//! `publish_action` is the boundary an editor or API layer calls. It mints a
//! request id, validates the raw request and dispatches to the publish state
//! machine; failures are classified into a small set of outcomes the caller
//! can turn into a response.

#![allow(clippy::result_large_err)]

use homebook_core::errors::{ExError, ExErrorKind};
use homebook_core::notifier::ViewNotifier;
use homebook_core_types::RequestId;
use homebook_store::Result;
use rusqlite::Connection;

use crate::commands::publish::{self, PublishAction, PublishOutcome};

/// Publish transitions requested for one book
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineCommand {
    Publish { book_id: String },
    Draft { book_id: String },
    RestoreLatestPublished { book_id: String },
}

impl EngineCommand {
    pub fn new(action: PublishAction, book_id: impl Into<String>) -> Self {
        let book_id = book_id.into();
        match action {
            PublishAction::Publish => EngineCommand::Publish { book_id },
            PublishAction::Draft => EngineCommand::Draft { book_id },
            PublishAction::RestoreLatestPublished => EngineCommand::RestoreLatestPublished { book_id },
        }
    }
}

/// Apply an engine command on behalf of an authenticated caller
pub fn apply_engine_command(
    cmd: EngineCommand,
    caller_id: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<PublishOutcome> {
    match cmd {
        EngineCommand::Publish { book_id } => publish::publish(caller_id, &book_id, notifier, conn),
        EngineCommand::Draft { book_id } => publish::unpublish(caller_id, &book_id, notifier, conn),
        EngineCommand::RestoreLatestPublished { book_id } => {
            publish::restore_latest_published(caller_id, &book_id, notifier, conn)
        }
    }
}

/// Validate and run a raw publish request
///
/// # Errors
///
/// - `Unauthorised` when there is no caller
/// - `InvalidInput` for an empty book id, `InvalidAction` for an unknown action
/// - anything the dispatched transition returns
///
/// Every error carries the request id minted here.
pub fn publish_action(
    caller_id: Option<&str>,
    book_id: &str,
    action: &str,
    notifier: &dyn ViewNotifier,
    conn: &mut Connection,
) -> Result<PublishOutcome> {
    let request_id = RequestId::new();
    let span = tracing::info_span!("publish_action", request_id = %request_id, action);
    let _guard = span.enter();

    let mut run = || -> Result<PublishOutcome> {
        let caller_id = caller_id.filter(|c| !c.trim().is_empty()).ok_or_else(|| {
            ExError::new(ExErrorKind::Unauthorised)
                .with_op("publish_action")
                .with_message("no authenticated caller")
        })?;
        let book_id = book_id.trim();
        if book_id.is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("publish_action")
                .with_message("book id is required"));
        }
        let action = PublishAction::parse(action)?;
        apply_engine_command(EngineCommand::new(action, book_id), caller_id, notifier, conn)
    };

    run().map_err(|e| {
        tracing::debug!(request_id = %request_id, code = e.code(), "Publish action rejected");
        e.with_request_id(request_id.clone())
    })
}

/// Coarse classification of a failed inbound command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    Unauthenticated,
    Invalid,
    NotOwner,
    Missing,
    Conflict,
    Failed,
}

impl FailureOutcome {
    pub fn classify(err: &ExError) -> Self {
        match err.kind() {
            ExErrorKind::Unauthorised => FailureOutcome::Unauthenticated,
            ExErrorKind::InvalidInput
            | ExErrorKind::InvalidAction
            | ExErrorKind::InvalidTitle
            | ExErrorKind::InvalidLayout
            | ExErrorKind::InvalidMediaKind => FailureOutcome::Invalid,
            ExErrorKind::Forbidden => FailureOutcome::NotOwner,
            ExErrorKind::NotFound | ExErrorKind::NoPublishedSnapshot => FailureOutcome::Missing,
            ExErrorKind::Concurrency => FailureOutcome::Conflict,
            _ => FailureOutcome::Failed,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            FailureOutcome::Unauthenticated => "unauthenticated",
            FailureOutcome::Invalid => "invalid",
            FailureOutcome::NotOwner => "not_owner",
            FailureOutcome::Missing => "missing",
            FailureOutcome::Conflict => "conflict",
            FailureOutcome::Failed => "failed",
        }
    }
}

impl std::fmt::Display for FailureOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_covers_outcomes() {
        let cases = [
            (ExErrorKind::Unauthorised, FailureOutcome::Unauthenticated),
            (ExErrorKind::InvalidAction, FailureOutcome::Invalid),
            (ExErrorKind::Forbidden, FailureOutcome::NotOwner),
            (ExErrorKind::NoPublishedSnapshot, FailureOutcome::Missing),
            (ExErrorKind::Concurrency, FailureOutcome::Conflict),
            (ExErrorKind::CaptureFailed, FailureOutcome::Failed),
            (ExErrorKind::RestoreStageFailed, FailureOutcome::Failed),
        ];
        for (kind, expected) in cases {
            assert_eq!(FailureOutcome::classify(&ExError::new(kind)), expected);
        }
    }

    #[test]
    fn test_command_from_action() {
        assert_eq!(
            EngineCommand::new(PublishAction::Draft, "b1"),
            EngineCommand::Draft {
                book_id: "b1".to_string()
            }
        );
    }
}
