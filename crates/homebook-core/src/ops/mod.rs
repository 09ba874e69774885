//! Pure planning helpers for editor operations

pub mod reorder;

pub use reorder::{next_ordinal, plan_reorder};
