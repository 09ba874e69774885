//! Deterministic ordering of snapshot children
//!
//! Restore inserts rows in exactly the order returned here, so the relative
//! order of siblings survives even when ordinals are missing.

use std::cmp::Ordering;
use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::model::{MediaRecord, SectionRecord, SubsectionRecord};

/// Missing timestamps sort as the earliest possible instant
fn time_key(at: Option<DateTime<Utc>>) -> i64 {
    at.map(|t| t.timestamp_micros()).unwrap_or(0)
}

/// Sections by ascending ordinal; ties keep snapshot order
pub fn sections_in_order(sections: &[SectionRecord]) -> Vec<&SectionRecord> {
    let mut ordered: Vec<&SectionRecord> = sections.iter().collect();
    ordered.sort_by_key(|s| s.ordinal);
    ordered
}

/// Subsections grouped per parent section, each group internally ordered
///
/// A group is ordered by ordinal when every sibling carries one, otherwise by
/// creation time. Groups appear in the order their section first shows up in
/// the snapshot.
pub fn subsections_in_order(subsections: &[SubsectionRecord]) -> Vec<&SubsectionRecord> {
    let mut groups: Vec<(&str, Vec<&SubsectionRecord>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for sub in subsections {
        let slot = *index.entry(sub.section_id.as_str()).or_insert_with(|| {
            groups.push((sub.section_id.as_str(), Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(sub);
    }

    let mut ordered = Vec::with_capacity(subsections.len());
    for (_, mut siblings) in groups {
        if siblings.iter().all(|s| s.ordinal.is_some()) {
            siblings.sort_by_key(|s| s.ordinal);
        } else {
            siblings.sort_by_key(|s| time_key(s.created_at));
        }
        ordered.extend(siblings);
    }
    ordered
}

/// Media by ordinal (missing last), then creation time (missing first)
pub fn media_in_order(media: &[MediaRecord]) -> Vec<&MediaRecord> {
    let mut ordered: Vec<&MediaRecord> = media.iter().collect();
    ordered.sort_by(|a, b| compare_media(a, b));
    ordered
}

fn compare_media(a: &MediaRecord, b: &MediaRecord) -> Ordering {
    let ordinal = |m: &MediaRecord| m.ordinal.unwrap_or(i64::MAX);
    ordinal(a)
        .cmp(&ordinal(b))
        .then_with(|| time_key(a.created_at).cmp(&time_key(b.created_at)))
}
