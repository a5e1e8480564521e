//! Content item data model
//!
//! Items are produced by the extractor and handed downstream by value; later
//! stages build new items rather than mutating the ones they receive.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// What kind of element an item was extracted from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentKind {
    /// Paragraph text
    Text,
    /// `h1`..`h6`, carrying the level
    Heading(u8),
    Table,
    List,
    Form,
    /// Element matched by a caller-supplied selector
    Selected,
}

impl ContentKind {
    /// Maps a default-scan tag to its kind (`p` → Text, `hN` → Heading)
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "p" => Some(Self::Text),
            _ => heading_level(tag).map(Self::Heading),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Heading(_) => "heading",
            Self::Table => "table",
            Self::List => "list",
            Self::Form => "form",
            Self::Selected => "selected",
        }
    }
}

impl fmt::Display for ContentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Heading(level) => write!(f, "h{}", level),
            other => f.write_str(other.as_str()),
        }
    }
}

/// Returns the level of an `h1`..`h6` tag name
pub fn heading_level(tag: &str) -> Option<u8> {
    let level = tag.strip_prefix('h')?.parse::<u8>().ok()?;
    (1..=6).contains(&level).then_some(level)
}

/// Item payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Content {
    Text { text: String },
    Table(TableData),
    List(ListData),
    Form(FormData),
}

impl Content {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }
}

/// Rows are accepted independently and may differ in length from `headers`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableData {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListType {
    Ordered,
    Unordered,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListData {
    pub list_type: ListType,
    pub items: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormMethod {
    Get,
    Post,
}

impl FormMethod {
    /// Parses a `method` attribute; anything but `post` submits as GET
    pub fn from_attr(value: Option<&str>) -> Self {
        match value {
            Some(m) if m.trim().eq_ignore_ascii_case("post") => Self::Post,
            _ => Self::Get,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    /// Input `type` attribute, or the tag name for `select`/`textarea`
    pub kind: String,
    pub name: String,
    pub id: String,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormData {
    pub action: String,
    pub method: FormMethod,
    pub fields: Vec<FormField>,
}

/// Per-element metadata captured at extraction time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ElementMetadata {
    pub tag: String,
    pub classes: BTreeSet<String>,
    pub id: Option<String>,
    /// All attributes except `class` and `id`
    pub attributes: BTreeMap<String, String>,
    /// Absent for the root element
    pub parent_tag: Option<String>,
    /// Relevance score assigned after extraction, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}

/// One unit of extracted page content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    pub kind: ContentKind,
    pub content: Content,
    pub metadata: ElementMetadata,
    pub source_url: String,
}

impl ContentItem {
    /// Returns the text payload of text-bodied items
    pub fn text(&self) -> Option<&str> {
        match &self.content {
            Content::Text { text } => Some(text),
            _ => None,
        }
    }

    /// Returns a copy of this item with a different payload
    pub fn with_content(&self, content: Content) -> Self {
        Self {
            content,
            ..self.clone()
        }
    }

    /// Returns a copy of this item carrying a relevance score
    pub fn with_relevance(&self, relevance: f64) -> Self {
        let mut item = self.clone();
        item.metadata.relevance = Some(relevance);
        item
    }

    /// Relevance used for ordering; unscored items rank as 0
    pub fn relevance(&self) -> f64 {
        self.metadata.relevance.unwrap_or(0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_tag() {
        assert_eq!(ContentKind::from_tag("p"), Some(ContentKind::Text));
        assert_eq!(ContentKind::from_tag("h1"), Some(ContentKind::Heading(1)));
        assert_eq!(ContentKind::from_tag("h6"), Some(ContentKind::Heading(6)));
        assert_eq!(ContentKind::from_tag("h7"), None);
        assert_eq!(ContentKind::from_tag("header"), None);
        assert_eq!(ContentKind::from_tag("div"), None);
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ContentKind::Heading(2).to_string(), "h2");
        assert_eq!(ContentKind::Selected.to_string(), "selected");
    }

    #[test]
    fn test_form_method_parsing() {
        assert_eq!(FormMethod::from_attr(Some("POST")), FormMethod::Post);
        assert_eq!(FormMethod::from_attr(Some("get")), FormMethod::Get);
        assert_eq!(FormMethod::from_attr(Some("dialog")), FormMethod::Get);
        assert_eq!(FormMethod::from_attr(None), FormMethod::Get);
    }

    #[test]
    fn test_relevance_defaults_to_zero() {
        let item = ContentItem {
            kind: ContentKind::Text,
            content: Content::text("hello"),
            metadata: ElementMetadata::default(),
            source_url: "https://example.com/".to_string(),
        };

        assert_eq!(item.relevance(), 0.0);
        let scored = item.with_relevance(2.0);
        assert_eq!(scored.relevance(), 2.0);
        assert_eq!(item.metadata.relevance, None);
    }

    #[test]
    fn test_content_serializes_with_type_tag() {
        let value = serde_json::to_value(Content::text("hi")).unwrap();
        assert_eq!(value["type"], "text");
        assert_eq!(value["text"], "hi");
    }
}
