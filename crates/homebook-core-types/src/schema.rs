//! Canonical schema constants for structured logging
//!
//! Every log line emitted through the op macros uses these keys, so log
//! consumers can rely on them across crates.

// Boundary fields
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_REQUEST_ID: &str = "request_id";

// Entity identifiers
pub const FIELD_BOOK_ID: &str = "book_id";
pub const FIELD_SECTION_ID: &str = "section_id";
pub const FIELD_SUBSECTION_ID: &str = "subsection_id";
pub const FIELD_MEDIA_ID: &str = "media_id";
pub const FIELD_VERSION_NO: &str = "version_no";

// Restore accounting
pub const FIELD_RESTORE_STAGE: &str = "restore_stage";
pub const FIELD_SKIPPED: &str = "skipped";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";

// Event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
