//! Homebook Engine - Orchestration layer
//!
//! Coordinates the pure domain in `homebook-core` with persistence in
//! `homebook-store`: ownership checks, the publish state machine, snapshot
//! restore, editor mutation hooks and the inbound publish command surface.

pub mod commands;

pub use commands::engine_command::{
    apply_engine_command, publish_action, EngineCommand, FailureOutcome,
};
pub use commands::publish::{PublishAction, PublishOutcome};
pub use commands::restore::RestoreOutcome;
