//! Grouping and rendering of cleaned content
//!
//! Synthesis runs in three pure steps: partition items by kind, process each
//! group (relevance sort, heading hierarchy, counts), then render the
//! processed structure in the requested output format.

use crate::extract::{Content, ContentItem, ContentKind, FormData, ListData, TableData};
use crate::process::markdown::format_markdown;
use crate::SiftError;
use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Version tag carried by JSON output
pub const OUTPUT_VERSION: &str = "1.0";

/// Supported output renderings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Json,
    Csv,
    Markdown,
}

impl OutputFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Csv => "csv",
            Self::Markdown => "markdown",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutputFormat {
    type Err = SiftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            "markdown" => Ok(Self::Markdown),
            _ => Err(SiftError::UnsupportedFormat(s.to_string())),
        }
    }
}

/// Items partitioned by kind
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GroupedContent {
    /// Paragraphs, headings and selector matches with a text body
    pub text: Vec<ContentItem>,
    pub tables: Vec<ContentItem>,
    pub lists: Vec<ContentItem>,
    pub forms: Vec<ContentItem>,
    /// Items whose payload does not match their kind
    pub other: Vec<ContentItem>,
}

impl GroupedContent {
    pub fn from_items(items: &[ContentItem]) -> Self {
        let mut groups = Self::default();

        for item in items {
            let group = match (&item.kind, &item.content) {
                (
                    ContentKind::Text | ContentKind::Heading(_) | ContentKind::Selected,
                    Content::Text { .. },
                ) => &mut groups.text,
                (ContentKind::Table, Content::Table(_)) => &mut groups.tables,
                (ContentKind::List, Content::List(_)) => &mut groups.lists,
                (ContentKind::Form, Content::Form(_)) => &mut groups.forms,
                _ => &mut groups.other,
            };
            group.push(item.clone());
        }

        groups
    }

    pub fn total(&self) -> usize {
        self.text.len() + self.tables.len() + self.lists.len() + self.forms.len() + self.other.len()
    }

    /// Non-empty groups with their sizes
    pub fn counts(&self) -> BTreeMap<String, usize> {
        [
            ("text", self.text.len()),
            ("tables", self.tables.len()),
            ("lists", self.lists.len()),
            ("forms", self.forms.len()),
            ("other", self.other.len()),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .map(|(name, count)| (name.to_string(), count))
        .collect()
    }
}

/// Element tag to texts, kept in first-seen order
///
/// Built from relevance-sorted texts, so the tag holding the most relevant
/// text comes first. Serializes as a map in that order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextHierarchy {
    groups: Vec<(String, Vec<String>)>,
}

impl TextHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `text` under `tag`, opening a new group on first sight
    pub fn push(&mut self, tag: &str, text: String) {
        match self.groups.iter_mut().find(|(t, _)| t == tag) {
            Some((_, texts)) => texts.push(text),
            None => self.groups.push((tag.to_string(), vec![text])),
        }
    }

    pub fn get(&self, tag: &str) -> Option<&[String]> {
        self.groups
            .iter()
            .find(|(t, _)| t == tag)
            .map(|(_, texts)| texts.as_slice())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.groups
            .iter()
            .map(|(tag, texts)| (tag.as_str(), texts.as_slice()))
    }

}

impl Serialize for TextHierarchy {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.groups.len()))?;
        for (tag, texts) in &self.groups {
            map.serialize_entry(tag, texts)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for TextHierarchy {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct HierarchyVisitor;

        impl<'de> Visitor<'de> for HierarchyVisitor {
            type Value = TextHierarchy;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a map of tag to texts")
            }

            fn visit_map<M>(self, mut access: M) -> Result<TextHierarchy, M::Error>
            where
                M: MapAccess<'de>,
            {
                let mut hierarchy = TextHierarchy::new();
                while let Some((tag, texts)) = access.next_entry::<String, Vec<String>>()? {
                    for text in texts {
                        hierarchy.push(&tag, text);
                    }
                }
                Ok(hierarchy)
            }
        }

        deserializer.deserialize_map(HierarchyVisitor)
    }
}

/// Text group after relevance ordering
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextContent {
    /// Element tag to texts, each list in relevance order
    pub hierarchy: TextHierarchy,
    /// All texts in relevance order, separated by blank lines
    pub full_text: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentMetadata {
    pub total_items: usize,
    pub content_types: BTreeMap<String, usize>,
}

/// Per-group processing result
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProcessedContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_content: Option<TextContent>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tables: Vec<TableData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lists: Vec<ListData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub forms: Vec<FormData>,
    pub metadata: ContentMetadata,
}

impl ProcessedContent {
    pub fn from_groups(groups: &GroupedContent) -> Self {
        Self {
            text_content: (!groups.text.is_empty()).then(|| process_text(&groups.text)),
            tables: groups
                .tables
                .iter()
                .filter_map(|item| match &item.content {
                    Content::Table(table) => Some(table.clone()),
                    _ => None,
                })
                .collect(),
            lists: groups
                .lists
                .iter()
                .filter_map(|item| match &item.content {
                    Content::List(list) => Some(list.clone()),
                    _ => None,
                })
                .collect(),
            forms: groups
                .forms
                .iter()
                .filter_map(|item| match &item.content {
                    Content::Form(form) => Some(form.clone()),
                    _ => None,
                })
                .collect(),
            metadata: ContentMetadata {
                total_items: groups.total(),
                content_types: groups.counts(),
            },
        }
    }
}

fn process_text(items: &[ContentItem]) -> TextContent {
    let mut ordered: Vec<&ContentItem> = items.iter().collect();
    // Stable: equal scores keep extraction order
    ordered.sort_by(|a, b| b.relevance().total_cmp(&a.relevance()));

    let mut hierarchy = TextHierarchy::new();
    let mut texts = Vec::with_capacity(ordered.len());

    for item in ordered {
        let Some(text) = item.text() else { continue };
        let tag = if item.metadata.tag.is_empty() {
            "p"
        } else {
            item.metadata.tag.as_str()
        };
        hierarchy.push(tag, text.to_string());
        texts.push(text);
    }

    TextContent {
        hierarchy,
        full_text: texts.join("\n\n"),
    }
}

/// One flattened CSV record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub record_type: String,
    pub content: String,
}

/// Format-specific rendering of a processed document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RenderedOutput {
    Json {
        version: String,
        timestamp: String,
        content: ProcessedContent,
    },
    Csv {
        format: String,
        data: Vec<CsvRecord>,
    },
    Markdown {
        format: String,
        content: String,
    },
}

impl RenderedOutput {
    pub fn render(format: OutputFormat, processed: &ProcessedContent) -> Self {
        match format {
            OutputFormat::Json => Self::Json {
                version: OUTPUT_VERSION.to_string(),
                timestamp: chrono::Utc::now().to_rfc3339(),
                content: processed.clone(),
            },
            OutputFormat::Csv => Self::Csv {
                format: OutputFormat::Csv.to_string(),
                data: csv_records(processed),
            },
            OutputFormat::Markdown => Self::Markdown {
                format: OutputFormat::Markdown.to_string(),
                content: format_markdown(processed),
            },
        }
    }

    pub fn format(&self) -> OutputFormat {
        match self {
            Self::Json { .. } => OutputFormat::Json,
            Self::Csv { .. } => OutputFormat::Csv,
            Self::Markdown { .. } => OutputFormat::Markdown,
        }
    }

    /// Text written to a terminal or file
    ///
    /// JSON is pretty-printed, CSV becomes `type,content` lines and Markdown
    /// is returned as is.
    pub fn to_text(&self) -> Result<String, serde_json::Error> {
        match self {
            Self::Json { .. } => serde_json::to_string_pretty(self),
            Self::Csv { data, .. } => {
                let mut out = String::from("type,content\n");
                for record in data {
                    out.push_str(&csv_field(&record.record_type));
                    out.push(',');
                    out.push_str(&csv_field(&record.content));
                    out.push('\n');
                }
                Ok(out)
            }
            Self::Markdown { content, .. } => Ok(content.clone()),
        }
    }
}

fn csv_records(processed: &ProcessedContent) -> Vec<CsvRecord> {
    let mut records = Vec::new();

    if let Some(text) = &processed.text_content {
        for (_, texts) in text.hierarchy.iter() {
            records.extend(texts.iter().map(|t| CsvRecord {
                record_type: "text".to_string(),
                content: t.clone(),
            }));
        }
    }

    for table in &processed.tables {
        records.extend(table.rows.iter().map(|row| CsvRecord {
            record_type: "table_row".to_string(),
            content: serde_json::to_string(row).unwrap_or_default(),
        }));
    }

    records
}

fn csv_field(value: &str) -> String {
    if value.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

/// Result of one synthesis call
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesizedDocument {
    pub groups: GroupedContent,
    pub processed: ProcessedContent,
    pub output: RenderedOutput,
}

impl SynthesizedDocument {
    pub fn metadata(&self) -> &ContentMetadata {
        &self.processed.metadata
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ContentSynthesizer;

impl ContentSynthesizer {
    pub fn new() -> Self {
        Self
    }

    /// Groups and renders items
    ///
    /// The format is checked before any work is done, so an unsupported
    /// format yields an error and nothing else.
    pub fn synthesize(
        &self,
        items: &[ContentItem],
        format: &str,
    ) -> Result<SynthesizedDocument, SiftError> {
        let format = format.parse::<OutputFormat>()?;
        Ok(self.synthesize_as(items, format))
    }

    pub fn synthesize_as(&self, items: &[ContentItem], format: OutputFormat) -> SynthesizedDocument {
        let groups = GroupedContent::from_items(items);
        let processed = ProcessedContent::from_groups(&groups);
        let output = RenderedOutput::render(format, &processed);

        tracing::debug!(
            "Synthesized {} items as {}",
            processed.metadata.total_items,
            format
        );

        SynthesizedDocument {
            groups,
            processed,
            output,
        }
    }
}
