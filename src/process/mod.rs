//! Post-crawl processing: cleaning and synthesis
//!
//! # Components
//!
//! - `ContentCleaner`: normalizes text bodies and drops invalid items
//! - `ContentSynthesizer`: groups items and renders them as JSON, CSV records or Markdown

mod cleaner;
mod markdown;
mod synthesizer;

pub use cleaner::{CleanerConfig, ContentCleaner};
pub use markdown::{form_to_markdown, format_markdown, list_to_markdown, table_to_markdown};
pub use synthesizer::{
    ContentMetadata, ContentSynthesizer, CsvRecord, GroupedContent, OutputFormat,
    ProcessedContent, RenderedOutput, SynthesizedDocument, TextContent, TextHierarchy, OUTPUT_VERSION,
};
