use homebook_core_types::RequestId;
use thiserror::Error;

/// Result type alias for pure domain operations
pub type Result<T> = std::result::Result<T, HomebookError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable `ERR_*` code that callers (the CLI, an HTTP
/// layer) can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Validation
    InvalidInput,
    /// Malformed publish action
    InvalidAction,
    InvalidTitle,
    InvalidLayout,
    InvalidMediaKind,

    // Lookup / access
    NotFound,
    Unauthorised,
    Forbidden,

    // Publish pipeline
    CaptureFailed,
    VersionAppendFailed,
    NoPublishedSnapshot,
    /// A restore stage failed; the stage is carried on the error
    RestoreStageFailed,

    // Integration
    Concurrency,
    ConstraintViolation,
    Serialization,
    Persistence,
    Io,

    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::InvalidAction => "ERR_INVALID_ACTION",
            ExErrorKind::InvalidTitle => "ERR_INVALID_TITLE",
            ExErrorKind::InvalidLayout => "ERR_INVALID_LAYOUT",
            ExErrorKind::InvalidMediaKind => "ERR_INVALID_MEDIA_KIND",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Unauthorised => "ERR_UNAUTHORISED",
            ExErrorKind::Forbidden => "ERR_FORBIDDEN",
            ExErrorKind::CaptureFailed => "ERR_CAPTURE_FAILED",
            ExErrorKind::VersionAppendFailed => "ERR_VERSION_APPEND_FAILED",
            ExErrorKind::NoPublishedSnapshot => "ERR_NO_PUBLISHED_SNAPSHOT",
            ExErrorKind::RestoreStageFailed => "ERR_RESTORE_STAGE_FAILED",
            ExErrorKind::Concurrency => "ERR_CONCURRENCY",
            ExErrorKind::ConstraintViolation => "ERR_CONSTRAINT_VIOLATION",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::Persistence => "ERR_PERSISTENCE",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Stage of the restore pipeline an error was raised in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RestoreStage {
    Property,
    Book,
    Section,
    Subsection,
    Media,
}

impl RestoreStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            RestoreStage::Property => "property",
            RestoreStage::Book => "book",
            RestoreStage::Section => "section",
            RestoreStage::Subsection => "subsection",
            RestoreStage::Media => "media",
        }
    }
}

impl std::fmt::Display for RestoreStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical structured error type
///
/// Classification fields (`kind`, `stage`) are for programmatic handling;
/// the rest is context for whoever reads the log.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entity_id: Option<String>,
    stage: Option<RestoreStage>,
    request_id: Option<RequestId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entity_id: None,
            stage: None,
            request_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Shorthand for a stage-tagged restore failure
    pub fn restore_stage(stage: RestoreStage) -> Self {
        Self::new(ExErrorKind::RestoreStageFailed)
            .with_op("restore")
            .with_stage(stage)
    }

    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    pub fn with_entity_id(mut self, id: impl Into<String>) -> Self {
        self.entity_id = Some(id.into());
        self
    }

    pub fn with_stage(mut self, stage: RestoreStage) -> Self {
        self.stage = Some(stage);
        self
    }

    pub fn with_request_id(mut self, request_id: RequestId) -> Self {
        self.request_id = Some(request_id);
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Wrap a lower-level error, keeping its message reachable
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn entity_id(&self) -> Option<&str> {
        self.entity_id.as_deref()
    }

    pub fn stage(&self) -> Option<RestoreStage> {
        self.stage
    }

    pub fn request_id(&self) -> Option<&RequestId> {
        self.request_id.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if let Some(stage) = self.stage {
            write!(f, " at stage '{}'", stage)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entity_id) = &self.entity_id {
            write!(f, " (entity_id: {})", entity_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|e| e as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain validation failures raised by pure operations in this crate
#[derive(Error, Debug, Clone, PartialEq)]
pub enum HomebookError {
    /// Title is empty after trimming
    #[error("Invalid title: {reason}")]
    InvalidTitle { reason: String },

    /// Layout identifier is not one of the known layouts
    #[error("Unknown layout: {layout}")]
    InvalidLayout { layout: String },

    /// Media kind is not image, video, link or file
    #[error("Unknown media kind: {kind}")]
    InvalidMediaKind { kind: String },

    /// Media row references both or neither parent
    #[error("Media {media_id} must reference exactly one parent")]
    AmbiguousMediaParent { media_id: String },

    /// Reorder request is not a permutation of the current children
    #[error("Reorder of {scope} does not match current children: {reason}")]
    ReorderMismatch { scope: String, reason: String },

    /// Snapshot payload could not be read or written
    #[error("Snapshot payload error: {message}")]
    SnapshotPayload { message: String },
}

impl From<HomebookError> for ExError {
    fn from(err: HomebookError) -> Self {
        let message = err.to_string();
        match err {
            HomebookError::InvalidTitle { .. } => {
                ExError::new(ExErrorKind::InvalidTitle).with_message(message)
            }
            HomebookError::InvalidLayout { layout } => ExError::new(ExErrorKind::InvalidLayout)
                .with_entity_id(layout)
                .with_message(message),
            HomebookError::InvalidMediaKind { .. } => {
                ExError::new(ExErrorKind::InvalidMediaKind).with_message(message)
            }
            HomebookError::AmbiguousMediaParent { media_id } => {
                ExError::new(ExErrorKind::ConstraintViolation)
                    .with_entity_id(media_id)
                    .with_message(message)
            }
            HomebookError::ReorderMismatch { .. } => {
                ExError::new(ExErrorKind::InvalidInput).with_message(message)
            }
            HomebookError::SnapshotPayload { .. } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}
