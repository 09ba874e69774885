//! Row repository for the live content tree

pub mod hydration;
pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;
