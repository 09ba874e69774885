use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{HomebookError, Result};

/// What a media attachment points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
    Link,
    File,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Link => "link",
            MediaKind::File => "file",
        }
    }

    /// # Errors
    ///
    /// Returns `InvalidMediaKind` for anything but the four known kinds.
    pub fn parse(raw: &str) -> Result<Self> {
        match raw {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "link" => Ok(MediaKind::Link),
            "file" => Ok(MediaKind::File),
            other => Err(HomebookError::InvalidMediaKind {
                kind: other.to_string(),
            }),
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single parent of a media attachment
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum MediaParent {
    Section(String),
    Subsection(String),
}

impl MediaParent {
    /// Build from the two nullable columns; exactly one must be set
    ///
    /// # Errors
    ///
    /// Returns `AmbiguousMediaParent` when both or neither are set.
    pub fn from_columns(
        media_id: &str,
        section_id: Option<String>,
        subsection_id: Option<String>,
    ) -> Result<Self> {
        match (section_id, subsection_id) {
            (Some(id), None) => Ok(MediaParent::Section(id)),
            (None, Some(id)) => Ok(MediaParent::Subsection(id)),
            _ => Err(HomebookError::AmbiguousMediaParent {
                media_id: media_id.to_string(),
            }),
        }
    }

    /// Split back into `(section_id, subsection_id)` columns
    pub fn columns(&self) -> (Option<&str>, Option<&str>) {
        match self {
            MediaParent::Section(id) => (Some(id.as_str()), None),
            MediaParent::Subsection(id) => (None, Some(id.as_str())),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            MediaParent::Section(id) | MediaParent::Subsection(id) => id,
        }
    }
}

/// Image, video, link or file attached to a section or subsection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaAttachment {
    pub id: String,
    pub parent: MediaParent,
    /// Storage key or url; resolving it to a fetchable url is the blob
    /// store's business
    pub url: String,
    pub kind: MediaKind,
    pub ordinal: Option<i64>,
    pub description: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl MediaAttachment {
    pub fn new(id: String, parent: MediaParent, url: String, kind: MediaKind) -> Self {
        Self {
            id,
            parent,
            url,
            kind,
            ordinal: None,
            description: None,
            created_at: Some(Utc::now()),
        }
    }
}
