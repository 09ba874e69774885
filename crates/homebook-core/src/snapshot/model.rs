//! Snapshot payload
//!
//! The payload is stored as JSON on every version row and must stay readable
//! as fields are added: every optional field defaults when absent, and the
//! legacy names `homebook`, `order_index` and `type` are accepted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{HomebookError, Result};
use crate::layouts::DEFAULT_LAYOUT_ID;
use crate::model::{Book, MediaAttachment, MediaKind, Property, Section, Subsection};

/// Current payload schema version
pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SNAPSHOT_SCHEMA_VERSION
}

fn default_layout() -> String {
    DEFAULT_LAYOUT_ID.to_string()
}

/// Immutable, self-contained copy of one book's content tree
///
/// Ids inside a snapshot are the ids the rows had at capture time. They are
/// only meaningful as internal parent/child references and are never reused
/// on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    #[serde(alias = "homebook")]
    pub book: BookFields,
    pub property: PropertyFields,
    #[serde(default)]
    pub sections: Vec<SectionRecord>,
    #[serde(default)]
    pub subsections: Vec<SubsectionRecord>,
    #[serde(default)]
    pub media: Vec<MediaRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookFields {
    pub title: String,
    #[serde(default = "default_layout")]
    pub layout_type: String,
}

/// Denormalized property display fields
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyFields {
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub main_image_url: Option<String>,
    #[serde(default)]
    pub short_description: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionRecord {
    pub id: String,
    pub title: String,
    #[serde(alias = "order_index")]
    pub ordinal: i64,
    #[serde(default)]
    pub visible: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubsectionRecord {
    pub id: String,
    pub section_id: String,
    #[serde(default)]
    pub content_text: String,
    #[serde(default)]
    pub visible: Option<bool>,
    #[serde(default, alias = "order_index")]
    pub ordinal: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaRecord {
    pub id: String,
    #[serde(default)]
    pub section_id: Option<String>,
    #[serde(default)]
    pub subsection_id: Option<String>,
    pub url: String,
    #[serde(alias = "type")]
    pub kind: MediaKind,
    #[serde(default, alias = "order_index")]
    pub ordinal: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Assemble a snapshot from already-ordered live rows
    pub fn from_tree(
        book: &Book,
        property: &Property,
        sections: &[Section],
        subsections: &[Subsection],
        media: &[MediaAttachment],
    ) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            book: BookFields {
                title: book.title.clone(),
                layout_type: book.layout_type.clone(),
            },
            property: PropertyFields {
                name: property.name.clone(),
                address: property.address.clone(),
                main_image_url: property.main_image_url.clone(),
                short_description: property.short_description.clone(),
            },
            sections: sections.iter().map(SectionRecord::from).collect(),
            subsections: subsections.iter().map(SubsectionRecord::from).collect(),
            media: media.iter().map(MediaRecord::from).collect(),
        }
    }

    /// # Errors
    ///
    /// Returns `SnapshotPayload` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| HomebookError::SnapshotPayload {
            message: e.to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns `SnapshotPayload` if the payload is not a readable snapshot.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| HomebookError::SnapshotPayload {
            message: e.to_string(),
        })
    }

    /// Subsections captured under the given (original) section id
    pub fn subsections_of<'a>(
        &'a self,
        section_id: &'a str,
    ) -> impl Iterator<Item = &'a SubsectionRecord> + 'a {
        self.subsections
            .iter()
            .filter(move |s| s.section_id == section_id)
    }

    /// Media captured under the given (original) section or subsection id
    pub fn media_of<'a>(&'a self, parent_id: &'a str) -> impl Iterator<Item = &'a MediaRecord> + 'a {
        self.media.iter().filter(move |m| {
            m.section_id.as_deref() == Some(parent_id)
                || m.subsection_id.as_deref() == Some(parent_id)
        })
    }
}

impl From<&Section> for SectionRecord {
    fn from(section: &Section) -> Self {
        Self {
            id: section.id.clone(),
            title: section.title.clone(),
            ordinal: section.ordinal,
            visible: section.visible,
        }
    }
}

impl From<&Subsection> for SubsectionRecord {
    fn from(sub: &Subsection) -> Self {
        Self {
            id: sub.id.clone(),
            section_id: sub.section_id.clone(),
            content_text: sub.content_text.clone(),
            visible: sub.visible,
            ordinal: sub.ordinal,
            created_at: sub.created_at,
        }
    }
}

impl From<&MediaAttachment> for MediaRecord {
    fn from(item: &MediaAttachment) -> Self {
        let (section_id, subsection_id) = item.parent.columns();
        Self {
            id: item.id.clone(),
            section_id: section_id.map(str::to_string),
            subsection_id: subsection_id.map(str::to_string),
            url: item.url.clone(),
            kind: item.kind,
            ordinal: item.ordinal,
            description: item.description.clone(),
            created_at: item.created_at,
        }
    }
}
