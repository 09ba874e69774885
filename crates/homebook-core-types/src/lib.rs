//! Types shared by the homebook error and logging facilities
//!
//! - **Correlation**: `RequestId` stamped on every inbound action
//! - **Schema constants**: canonical field keys and event names

pub mod correlation;
pub mod schema;

pub use correlation::RequestId;
