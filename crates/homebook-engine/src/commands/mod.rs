//! Command orchestration layer.
//!
//! ## Logging Ownership
//!
//! The engine owns lifecycle logging: every public command emits one
//! `log_op_start!` and exactly one `log_op_end!` or `log_op_error!`.
//! Lower layers (store, core) use only `tracing::debug!()`/`warn!()`.

#![allow(clippy::result_large_err)]

pub mod access;
pub mod book;
pub mod edit;
pub mod engine_command;
pub mod publish;
pub mod restore;

use homebook_core::{log_op_end, log_op_error, log_op_start};
use homebook_store::Result;

/// Run `f` bracketed by the op boundary events of one book
pub(crate) fn logged<T>(op: &'static str, book_id: &str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    bracket(op, Some(book_id), f)
}

/// Same bracket for ops that are not about a single book
pub(crate) fn logged_unscoped<T>(op: &'static str, f: impl FnOnce() -> Result<T>) -> Result<T> {
    bracket(op, None, f)
}

fn bracket<T>(op: &'static str, book_id: Option<&str>, f: impl FnOnce() -> Result<T>) -> Result<T> {
    log_op_start!(op, book_id = book_id);
    let start = std::time::Instant::now();

    let result = f().map_err(|e| {
        log_op_error!(
            op,
            e.clone(),
            duration_ms = start.elapsed().as_millis() as u64,
            book_id = book_id
        );
        e
    })?;

    log_op_end!(
        op,
        duration_ms = start.elapsed().as_millis() as u64,
        book_id = book_id
    );
    Ok(result)
}
