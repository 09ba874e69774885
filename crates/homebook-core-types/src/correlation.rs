//! Request correlation
//!
//! A `RequestId` is minted at the inbound command boundary and carried on
//! log events and errors so one publish/restore attempt can be followed
//! end to end.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier for a single inbound action
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(String);

impl RequestId {
    /// Mint a fresh, time-ordered id (UUIDv7)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Adopt an id supplied by an upstream caller
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RequestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
