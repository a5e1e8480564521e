use crate::extract::metadata::element_metadata;
use crate::extract::structured::extract_structured;
use crate::extract::text::sanitize_text;
use crate::extract::types::{Content, ContentItem, ContentKind};
use crate::extract::{compile_selector, IgnoreRules};
use scraper::{ElementRef, Html, Selector};
use tracing::debug;

/// Tags scanned when no selectors are given, in emission order
pub const DEFAULT_TAGS: [&str; 7] = ["p", "h1", "h2", "h3", "h4", "h5", "h6"];

/// Parses markup into content items
///
/// Holds no per-page state, so one extractor is shared by every task of a
/// crawl.
#[derive(Debug, Clone)]
pub struct ContentExtractor {
    structured: bool,
    ignore: IgnoreRules,
}

impl Default for ContentExtractor {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ContentExtractor {
    /// Creates an extractor; `structured` enables table/list/form extraction
    pub fn new(structured: bool) -> Self {
        Self {
            structured,
            ignore: IgnoreRules::default(),
        }
    }

    /// Excludes elements inside subtrees matching any of `patterns`
    pub fn with_ignore_patterns(mut self, patterns: &[String]) -> Self {
        self.ignore = IgnoreRules::from_patterns(patterns);
        self
    }

    /// Extracts content items from one page
    ///
    /// Without selectors the default tag set is scanned tag by tag. With
    /// selectors, each safe selector contributes `Selected` items in the
    /// order given; unsafe or unparsable selectors are skipped.
    pub fn extract(
        &self,
        html: &str,
        selectors: Option<&[String]>,
        source_url: &str,
    ) -> Vec<ContentItem> {
        let document = Html::parse_document(html);

        let mut items = match selectors {
            Some(selectors) => self.extract_selected(&document, selectors, source_url),
            None => self.extract_default(&document, source_url),
        };

        if self.structured {
            items.extend(extract_structured(&document, source_url, &self.ignore));
        }

        debug!("Extracted {} items from {}", items.len(), source_url);
        items
    }

    fn extract_default(&self, document: &Html, source_url: &str) -> Vec<ContentItem> {
        let mut items = Vec::new();

        for tag in DEFAULT_TAGS {
            let (Some(kind), Some(selector)) = (ContentKind::from_tag(tag), compile_selector(tag))
            else {
                continue;
            };
            items.extend(self.text_items(document, &selector, kind, source_url));
        }

        items
    }

    fn extract_selected(
        &self,
        document: &Html,
        selectors: &[String],
        source_url: &str,
    ) -> Vec<ContentItem> {
        selectors
            .iter()
            .filter_map(|css| compile_selector(css))
            .flat_map(|selector| {
                self.text_items(document, &selector, ContentKind::Selected, source_url)
            })
            .collect()
    }

    fn text_items(
        &self,
        document: &Html,
        selector: &Selector,
        kind: ContentKind,
        source_url: &str,
    ) -> Vec<ContentItem> {
        document
            .select(selector)
            .filter(|element| !self.ignore.covers(element))
            .filter_map(|element| text_item(&element, kind, source_url))
            .collect()
    }
}

fn text_item(element: &ElementRef<'_>, kind: ContentKind, source_url: &str) -> Option<ContentItem> {
    let text = sanitize_text(&element.text().collect::<String>());
    if text.is_empty() {
        return None;
    }

    Some(ContentItem {
        kind,
        content: Content::text(text),
        metadata: element_metadata(element),
        source_url: source_url.to_string(),
    })
}
