//! Snapshot capture from the live tables

pub mod capture;

pub use capture::capture;
