pub mod book;
pub mod media;
pub mod section;

pub use book::{Book, Property, PublishState};
pub use media::{MediaAttachment, MediaKind, MediaParent};
pub use section::{Section, Subsection, SubsectionText};

/// Trim a title and reject it if nothing is left
///
/// # Errors
///
/// Returns `InvalidTitle` for empty or whitespace-only input.
pub fn normalize_title(raw: &str) -> crate::errors::Result<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(crate::errors::HomebookError::InvalidTitle {
            reason: "title cannot be empty".to_string(),
        });
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_title() {
        assert_eq!(normalize_title("  Rules ").unwrap(), "Rules");
        assert!(normalize_title("   ").is_err());
    }
}
