use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// First level of the content hierarchy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: String,
    pub book_id: String,
    pub title: String,
    /// Render order within the book
    pub ordinal: i64,
    /// `None` means visible
    pub visible: Option<bool>,
    pub created_at: DateTime<Utc>,
}

impl Section {
    pub fn new(id: String, book_id: String, title: String, ordinal: i64) -> Self {
        Self {
            id,
            book_id,
            title,
            ordinal,
            visible: None,
            created_at: Utc::now(),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }
}

/// Second level of the content hierarchy
///
/// Legacy rows predate explicit ordinals; for those `created_at` is the
/// sort key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    pub id: String,
    pub section_id: String,
    /// Packed title + body, see [`SubsectionText`]
    pub content_text: String,
    pub ordinal: Option<i64>,
    pub visible: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

impl Subsection {
    pub fn new(id: String, section_id: String, content_text: String, ordinal: Option<i64>) -> Self {
        Self {
            id,
            section_id,
            content_text,
            ordinal,
            visible: None,
            created_at: Some(Utc::now()),
        }
    }

    pub fn is_visible(&self) -> bool {
        self.visible != Some(false)
    }

    pub fn text(&self) -> SubsectionText {
        SubsectionText::parse(&self.content_text)
    }
}

/// Title and body packed into a subsection's `content_text`
///
/// The packed form is a JSON object `{"title": .., "body": ..}`. Older rows
/// hold plain text: first non-empty line is the title, the remaining lines
/// form the body.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubsectionText {
    pub title: String,
    pub body: String,
}

impl SubsectionText {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }

    pub fn parse(raw: &str) -> Self {
        if raw.trim().is_empty() {
            return Self::default();
        }

        if let Ok(serde_json::Value::Object(map)) = serde_json::from_str::<serde_json::Value>(raw) {
            if let Some(body) = map.get("body").and_then(|v| v.as_str()) {
                let title = map
                    .get("title")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                return Self::new(title.trim(), body.trim());
            }
        }

        let mut lines = raw.lines().map(str::trim).filter(|l| !l.is_empty());
        let title = lines.next().unwrap_or_default().to_string();
        let body = lines.collect::<Vec<_>>().join(" ");
        Self { title, body }
    }

    pub fn pack(&self) -> String {
        serde_json::json!({ "title": self.title, "body": self.body }).to_string()
    }
}
