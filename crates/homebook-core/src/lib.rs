//! Homebook Core - pure domain kernel for publishable homebooks
//!
//! This crate holds everything about a homebook that does not touch storage:
//! - The live content tree model (book, property, sections, subsections, media)
//! - The immutable `Snapshot` value and the ordering / identity-remapping rules
//!   used to re-materialize it
//! - Layouts and default section seeding
//! - The advisory publish checklist
//! - The error facility, the logging facility and the view-notification seam

pub mod checklist;
pub mod errors;
pub mod layouts;
pub mod logging_facility;
pub mod model;
pub mod notifier;
pub mod ops;
pub mod snapshot;

// Logging macros expand to `$crate::core_types::schema::..`
pub use homebook_core_types as core_types;

pub use errors::{ExError, ExErrorKind, HomebookError, RestoreStage, Result};
pub use model::{Book, MediaAttachment, MediaKind, MediaParent, Property, PublishState};
pub use notifier::{NoopViewNotifier, RecordingViewNotifier, ViewEvent, ViewNotifier};
pub use snapshot::Snapshot;
