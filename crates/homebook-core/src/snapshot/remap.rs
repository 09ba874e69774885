//! Old-id to new-id maps built while a snapshot is re-materialized

use std::collections::HashMap;

use super::model::MediaRecord;
use crate::model::MediaParent;

/// Mapping from snapshot ids to freshly inserted row ids
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IdMap {
    entries: HashMap<String, String>,
}

impl IdMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, old_id: impl Into<String>, new_id: impl Into<String>) {
        self.entries.insert(old_id.into(), new_id.into());
    }

    pub fn resolve(&self, old_id: &str) -> Option<&str> {
        self.entries.get(old_id).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// New parent for a media record, or `None` when neither parent was restored
///
/// The subsection reference wins when both are present.
pub fn resolve_media_parent(
    record: &MediaRecord,
    sections: &IdMap,
    subsections: &IdMap,
) -> Option<MediaParent> {
    if let Some(new_id) = record
        .subsection_id
        .as_deref()
        .and_then(|old| subsections.resolve(old))
    {
        return Some(MediaParent::Subsection(new_id.to_string()));
    }
    record
        .section_id
        .as_deref()
        .and_then(|old| sections.resolve(old))
        .map(|new_id| MediaParent::Section(new_id.to_string()))
}
