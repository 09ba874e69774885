use std::collections::HashSet;

use crate::errors::{HomebookError, Result};

/// Next ordinal after the current maximum (1 for an empty parent)
pub fn next_ordinal(current_max: Option<i64>) -> i64 {
    current_max.map_or(1, |max| max + 1)
}

/// Assign ordinals `1..=n` to `requested`, which must be a permutation of
/// `current`.
///
/// # Errors
///
/// Returns `ReorderMismatch` for duplicates, unknown ids or missing ids.
pub fn plan_reorder(
    scope: &str,
    current: &[String],
    requested: &[String],
) -> Result<Vec<(String, i64)>> {
    let mismatch = |reason: String| HomebookError::ReorderMismatch {
        scope: scope.to_string(),
        reason,
    };

    let known: HashSet<&str> = current.iter().map(String::as_str).collect();
    let mut seen: HashSet<&str> = HashSet::with_capacity(requested.len());

    for id in requested {
        if !known.contains(id.as_str()) {
            return Err(mismatch(format!("unknown id {id}")));
        }
        if !seen.insert(id.as_str()) {
            return Err(mismatch(format!("duplicate id {id}")));
        }
    }
    if seen.len() != known.len() {
        return Err(mismatch(format!(
            "expected {} ids, got {}",
            known.len(),
            seen.len()
        )));
    }

    Ok(requested.iter().cloned().zip(1_i64..).collect())
}
