//! Homebook Store - SQLite persistence for homebooks
//!
//! Provides:
//! - Connection setup and checksummed, embedded schema migrations
//! - Row repository for the live content tree
//! - Snapshot capture of one book's tree
//! - The bounded, numbered version history of published snapshots

pub mod db;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod snapshot;
pub mod versions;

pub use errors::Result;
pub use repo::SqliteRepo;
pub use versions::{VersionRecord, VersionSummary, VERSION_RETENTION};
