pub mod book;
pub mod content;
pub mod publish;

use homebook_core::notifier::{ViewEvent, ViewNotifier};
use homebook_store::{db, migrations};
use rusqlite::Connection;
use serde::Serialize;

pub type CliResult<T = ()> = Result<T, Box<dyn std::error::Error>>;

/// Open database plus the acting user
pub struct Context {
    pub conn: Connection,
    user: Option<String>,
}

impl Context {
    pub fn open(path: &str, user: Option<String>) -> CliResult<Self> {
        let mut conn = db::open(path)?;
        migrations::apply_migrations(&mut conn)?;
        Ok(Self { conn, user })
    }

    pub fn user(&self) -> Option<&str> {
        self.user.as_deref().filter(|u| !u.trim().is_empty())
    }

    pub fn caller(&self) -> CliResult<&str> {
        self.user()
            .ok_or_else(|| "No user given; pass --user or set HOMEBOOK_USER".into())
    }
}

/// Views are rendered elsewhere; the CLI only records what would be refreshed
pub struct LogViewNotifier;

impl ViewNotifier for LogViewNotifier {
    fn notify(&self, event: ViewEvent) {
        match event {
            ViewEvent::DemotedToDraft { book_id } => {
                tracing::info!(book_id = %book_id, "Book demoted to draft");
            }
            ViewEvent::Invalidate { book_id, paths } => {
                tracing::debug!(book_id = %book_id, paths = ?paths, "Views invalidated");
            }
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> CliResult {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
