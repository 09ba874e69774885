use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publish state of a book
///
/// A book only becomes `Published` through a successful publish or restore;
/// any successful content mutation while published demotes it to `Draft`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PublishState {
    Draft,
    Published,
}

impl PublishState {
    pub fn from_flag(is_published: bool) -> Self {
        if is_published {
            PublishState::Published
        } else {
            PublishState::Draft
        }
    }

    pub fn is_published(&self) -> bool {
        matches!(self, PublishState::Published)
    }
}

/// The property a book describes; its owner is the only one allowed to
/// edit or publish the book
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub address: Option<String>,
    /// Cover image storage key or url
    pub main_image_url: Option<String>,
    pub short_description: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Property {
    pub fn new(id: String, owner_id: String, name: String) -> Self {
        Self {
            id,
            owner_id,
            name,
            address: None,
            main_image_url: None,
            short_description: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.owner_id == user_id
    }
}

/// Top-level content document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: String,
    pub property_id: String,
    pub title: String,
    pub layout_type: String,
    /// Slug of the public page, if one was assigned
    pub public_slug: Option<String>,
    pub state: PublishState,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    pub fn new(id: String, property_id: String, title: String, layout_type: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            property_id,
            title,
            layout_type,
            public_slug: None,
            state: PublishState::Draft,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_published(&self) -> bool {
        self.state.is_published()
    }
}
