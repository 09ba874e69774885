//! Advisory pre-publish review of a captured snapshot
//!
//! Suggestions never block publishing. Only visible sections and visible
//! subsections are considered.

use std::collections::HashMap;

use serde::Serialize;

use crate::model::SubsectionText;
use crate::snapshot::{SectionRecord, Snapshot, SubsectionRecord};

/// Core sections every guest-facing homebook is expected to cover
pub const CORE_SECTION_KEYS: [&str; 4] = [
    "check-in",
    "regole struttura",
    "funzionamento",
    "numeri utili",
];

const MEANINGFUL_MIN_CHARS: usize = 20;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChecklistItem {
    pub id: String,
    pub message: String,
}

impl ChecklistItem {
    fn new(id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
        }
    }
}

/// Lowercase, whitespace-collapsed length test
fn is_meaningful(text: &str) -> bool {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed.chars().count() >= MEANINGFUL_MIN_CHARS
}

/// Case and accent folding with collapsed whitespace; punctuation stays significant
fn fold_title(text: &str) -> String {
    text.split_whitespace()
        .map(|word| word.chars().map(fold_char).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

fn fold_char(c: char) -> String {
    if !c.is_alphanumeric() {
        return c.to_string();
    }
    match slug::slugify(c.to_string()) {
        folded if folded.is_empty() => c.to_lowercase().collect(),
        folded => folded,
    }
}

fn title_matches(title: &str, key: &str) -> bool {
    fold_title(title) == fold_title(key)
}

fn has_meaningful_body(sub: &SubsectionRecord) -> bool {
    is_meaningful(&SubsectionText::parse(&sub.content_text).body)
}

/// Review a snapshot and return suggestions in a stable order
pub fn review(snapshot: &Snapshot) -> Vec<ChecklistItem> {
    let sections: Vec<&SectionRecord> = snapshot
        .sections
        .iter()
        .filter(|s| s.visible != Some(false))
        .collect();
    let subsections: Vec<&SubsectionRecord> = snapshot
        .subsections
        .iter()
        .filter(|s| s.visible != Some(false))
        .filter(|s| sections.iter().any(|sec| sec.id == s.section_id))
        .collect();

    let mut media_per_parent: HashMap<&str, usize> = HashMap::new();
    let mut media_total = 0;
    for item in &snapshot.media {
        let parent = item.section_id.as_deref().or(item.subsection_id.as_deref());
        let Some(parent) = parent else { continue };
        let visible_parent = sections.iter().any(|s| s.id == parent)
            || subsections.iter().any(|s| s.id == parent);
        if visible_parent {
            *media_per_parent.entry(parent).or_default() += 1;
            media_total += 1;
        }
    }

    let mut items = Vec::new();

    if snapshot
        .property
        .main_image_url
        .as_deref()
        .map_or(true, |url| url.trim().is_empty())
    {
        items.push(ChecklistItem::new(
            "cover-missing",
            "Add a cover image so guests recognise the homebook at a glance.",
        ));
    }

    if !is_meaningful(snapshot.property.short_description.as_deref().unwrap_or("")) {
        items.push(ChecklistItem::new(
            "description-short",
            "Consider a short opening description of the property (one or two sentences).",
        ));
    }

    if sections.is_empty() {
        items.push(ChecklistItem::new(
            "sections-missing",
            "No visible sections found. Check the structure of the homebook.",
        ));
    }

    for key in CORE_SECTION_KEYS {
        let Some(section) = sections.iter().find(|s| title_matches(&s.title, key)) else {
            items.push(ChecklistItem::new(
                format!("core-{key}-missing"),
                format!("Consider adding a \"{key}\" section to help guests."),
            ));
            continue;
        };

        let children: Vec<&&SubsectionRecord> = subsections
            .iter()
            .filter(|s| s.section_id == section.id)
            .collect();
        let has_text = children.iter().any(|s| has_meaningful_body(s));
        let media_count = media_per_parent.get(section.id.as_str()).copied().unwrap_or(0)
            + children
                .iter()
                .map(|s| media_per_parent.get(s.id.as_str()).copied().unwrap_or(0))
                .sum::<usize>();

        if !has_text && media_count == 0 {
            items.push(ChecklistItem::new(
                format!("core-{key}-empty"),
                format!(
                    "The \"{key}\" section still looks empty. You can publish anyway or complete it later."
                ),
            ));
        }
    }

    if !subsections.iter().any(|s| has_meaningful_body(s)) && media_total == 0 {
        items.push(ChecklistItem::new(
            "global-content-missing",
            "No descriptive content or media found. The homebook may look incomplete.",
        ));
    }

    items
}
