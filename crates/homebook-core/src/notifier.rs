//! View notification seam for editor draft badges and cached page invalidation.

use std::sync::Mutex;

use crate::model::Book;

/// Event delivered to views after a committed change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// A published book went back to draft because its content was edited
    DemotedToDraft { book_id: String },
    /// Cached renderings of these paths are stale
    Invalidate { book_id: String, paths: Vec<String> },
}

impl ViewEvent {
    pub fn book_id(&self) -> &str {
        match self {
            ViewEvent::DemotedToDraft { book_id } | ViewEvent::Invalidate { book_id, .. } => {
                book_id
            }
        }
    }
}

/// Receiver of view events.
///
/// Delivery is best effort: notifications are sent only after the change is
/// committed and cannot roll it back.
pub trait ViewNotifier: Send + Sync {
    fn notify(&self, event: ViewEvent);
}

/// Notifier that drops every event.
/// Used when no view layer is attached (CLI, tests that don't care).
pub struct NoopViewNotifier;

impl ViewNotifier for NoopViewNotifier {
    fn notify(&self, _: ViewEvent) {}
}

/// Notifier that keeps every event in memory
#[derive(Default)]
pub struct RecordingViewNotifier {
    events: Mutex<Vec<ViewEvent>>,
}

impl RecordingViewNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<ViewEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn demotions(&self) -> usize {
        self.events()
            .iter()
            .filter(|e| matches!(e, ViewEvent::DemotedToDraft { .. }))
            .count()
    }

    pub fn clear(&self) {
        self.events.lock().map(|mut e| e.clear()).ok();
    }
}

impl ViewNotifier for RecordingViewNotifier {
    fn notify(&self, event: ViewEvent) {
        self.events.lock().map(|mut e| e.push(event)).ok();
    }
}

/// Paths whose cached rendering depends on this book
///
/// The public page is included only when the book has a slug and either was
/// published before the change or is published after it.
pub fn invalidation_paths(book: &Book, was_published: bool) -> Vec<String> {
    let mut paths = vec![
        "/dashboard".to_string(),
        format!("/homebooks/{}/edit", book.id),
    ];
    if was_published || book.is_published() {
        if let Some(slug) = book.public_slug.as_deref().filter(|s| !s.is_empty()) {
            paths.push(format!("/p/{slug}"));
        }
    }
    paths
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::PublishState;

    fn book(slug: Option<&str>, state: PublishState) -> Book {
        let mut book = Book::new(
            "b1".to_string(),
            "p1".to_string(),
            "Guide".to_string(),
            "classico".to_string(),
        );
        book.public_slug = slug.map(str::to_string);
        book.state = state;
        book
    }

    #[test]
    fn test_draft_book_skips_public_path() {
        let paths = invalidation_paths(&book(Some("abc123def0"), PublishState::Draft), false);
        assert_eq!(paths, vec!["/dashboard", "/homebooks/b1/edit"]);
    }

    #[test]
    fn test_previously_published_book_includes_public_path() {
        let paths = invalidation_paths(&book(Some("abc123def0"), PublishState::Draft), true);
        assert_eq!(paths.last().map(String::as_str), Some("/p/abc123def0"));
    }

    #[test]
    fn test_missing_slug_has_no_public_path() {
        let paths = invalidation_paths(&book(None, PublishState::Published), true);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn test_recording_notifier_counts_demotions() {
        let notifier = RecordingViewNotifier::new();
        notifier.notify(ViewEvent::DemotedToDraft {
            book_id: "b1".to_string(),
        });
        notifier.notify(ViewEvent::Invalidate {
            book_id: "b1".to_string(),
            paths: vec![],
        });
        assert_eq!(notifier.demotions(), 1);
        assert_eq!(notifier.events()[1].book_id(), "b1");
        notifier.clear();
        assert!(notifier.events().is_empty());
    }
}
