//! Content extraction
//!
//! Turns page markup into typed content items: text and headings from the
//! default tag scan (or caller selectors), plus structured tables, lists and
//! forms. Extraction never fails outward; a bad selector or malformed element
//! is logged and skipped.

mod content;
mod metadata;
mod structured;
mod text;
mod types;

pub use content::{ContentExtractor, DEFAULT_TAGS};
pub use metadata::element_metadata;
pub use text::{collapse_whitespace, is_safe_selector, sanitize_text};
pub use types::{
    heading_level, Content, ContentItem, ContentKind, ElementMetadata, FormData, FormField,
    FormMethod, ListData, ListType, TableData,
};

use scraper::{ElementRef, Selector};
use thiserror::Error;
use tracing::warn;

/// Recoverable extraction failures, logged and never returned to callers
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("selector '{0}' contains disallowed characters")]
    UnsafeSelector(String),

    #[error("selector '{selector}' failed to parse: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Validates and parses a CSS selector
pub fn parse_selector(css: &str) -> Result<Selector, ExtractError> {
    if !is_safe_selector(css) {
        return Err(ExtractError::UnsafeSelector(css.to_string()));
    }

    Selector::parse(css).map_err(|e| ExtractError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Parses a selector, logging and discarding failures
pub(crate) fn compile_selector(css: &str) -> Option<Selector> {
    match parse_selector(css) {
        Ok(selector) => Some(selector),
        Err(e) => {
            warn!("Skipping selector: {}", e);
            None
        }
    }
}

/// Selectors whose matching subtrees are excluded from extraction
#[derive(Debug, Clone, Default)]
pub struct IgnoreRules {
    selectors: Vec<Selector>,
}

impl IgnoreRules {
    /// Compiles ignore patterns; invalid ones are logged and dropped
    pub fn from_patterns(patterns: &[String]) -> Self {
        Self {
            selectors: patterns.iter().filter_map(|p| compile_selector(p)).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.selectors.is_empty()
    }

    /// Returns true if the element or any ancestor matches an ignore pattern
    pub fn covers(&self, element: &ElementRef<'_>) -> bool {
        if self.selectors.is_empty() {
            return false;
        }

        std::iter::once(*element)
            .chain(element.ancestors().filter_map(ElementRef::wrap))
            .any(|el| self.selectors.iter().any(|s| s.matches(&el)))
    }
}
