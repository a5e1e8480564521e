//! Post-crawl normalization and validity filtering
//!
//! Text bodies and table cells are re-cleaned: markup stripped, characters
//! outside word characters, whitespace and `-.,?!` removed, whitespace
//! collapsed. Cleaning the output again changes nothing. None of the steps
//! can fail, so an item is never dropped because cleaning went wrong; it is
//! only dropped by the validity filter.

use crate::extract::{collapse_whitespace, Content, ContentItem, TableData};
use regex::Regex;
use scraper::Html;
use std::sync::LazyLock;

#[allow(clippy::expect_used)]
static DISALLOWED_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s\-.,?!]").expect("hardcoded regex pattern is valid"));

#[allow(clippy::expect_used)]
static SPECIAL_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("hardcoded regex pattern is valid"));

/// Thresholds of the validity filter
#[derive(Debug, Clone)]
pub struct CleanerConfig {
    /// Shortest text body (in characters) that is kept
    pub min_length: usize,
    /// Items whose share of non-word, non-space characters reaches this are dropped
    pub max_special_ratio: f64,
}

impl Default for CleanerConfig {
    fn default() -> Self {
        Self {
            min_length: 3,
            max_special_ratio: 0.3,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentCleaner {
    config: CleanerConfig,
}

impl ContentCleaner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CleanerConfig) -> Self {
        Self { config }
    }

    /// Cleans every item and drops the invalid ones, preserving order
    pub fn clean(&self, items: &[ContentItem]) -> Vec<ContentItem> {
        let cleaned: Vec<ContentItem> = items
            .iter()
            .map(|item| self.clean_item(item))
            .filter(|item| self.is_valid(item))
            .collect();

        tracing::debug!(
            "Cleaned {} items, dropped {}",
            items.len(),
            items.len() - cleaned.len()
        );
        cleaned
    }

    /// Strips markup and disallowed characters, then collapses whitespace
    pub fn clean_text(&self, text: &str) -> String {
        let fragment = Html::parse_fragment(text);
        let plain: String = fragment.root_element().text().collect();
        let allowed = DISALLOWED_CHARS.replace_all(&plain, "");
        collapse_whitespace(&allowed)
    }

    /// Returns true if the item survives the validity filter
    ///
    /// Structured payloads always pass.
    pub fn is_valid(&self, item: &ContentItem) -> bool {
        match item.text() {
            Some(text) => self.is_valid_text(text),
            None => true,
        }
    }

    fn is_valid_text(&self, text: &str) -> bool {
        let length = text.chars().count();
        if length < self.config.min_length || length == 0 {
            return false;
        }

        let special = SPECIAL_CHARS.find_iter(text).count();
        (special as f64) / (length as f64) < self.config.max_special_ratio
    }

    fn clean_item(&self, item: &ContentItem) -> ContentItem {
        match &item.content {
            Content::Text { text } => item.with_content(Content::text(self.clean_text(text))),
            Content::Table(table) => item.with_content(Content::Table(TableData {
                headers: table.headers.iter().map(|h| self.clean_text(h)).collect(),
                rows: table
                    .rows
                    .iter()
                    .map(|row| row.iter().map(|cell| self.clean_text(cell)).collect())
                    .collect(),
            })),
            Content::List(_) | Content::Form(_) => item.clone(),
        }
    }
}
