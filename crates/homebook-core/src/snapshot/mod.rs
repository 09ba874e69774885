//! Snapshot value and the rules for re-materializing it
//!
//! - `model`: the serialized payload and its conversions from live rows
//! - `ordering`: deterministic child ordering used on restore
//! - `remap`: old-id to new-id maps built while restoring

pub mod model;
pub mod ordering;
pub mod remap;

pub use model::{
    BookFields, MediaRecord, PropertyFields, SectionRecord, Snapshot, SubsectionRecord,
    SNAPSHOT_SCHEMA_VERSION,
};
pub use ordering::{media_in_order, sections_in_order, subsections_in_order};
pub use remap::{resolve_media_parent, IdMap};
