//! PageSift: a polite content harvester
//!
//! This crate implements a depth-bounded, same-origin web crawler that extracts
//! typed content items from every page it visits, cleans them, and synthesizes
//! them into a grouped document rendered as JSON, CSV records, or Markdown.

pub mod agent;
pub mod config;
pub mod crawler;
pub mod extract;
pub mod pipeline;
pub mod process;
pub mod state;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for PageSift operations
///
/// Only input validation and setup failures surface here. Per-page fetch
/// failures and per-element parse failures are absorbed by the crawler and
/// extractor and never reach the caller.
#[derive(Debug, Error)]
pub enum SiftError {
    #[error("Invalid seed URL: {0}")]
    InvalidSeedUrl(String),

    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,

    #[error("URL exceeds {max} characters")]
    TooLong { max: usize },
}

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlResult, Crawler};
pub use extract::{ContentExtractor, ContentItem, ContentKind};
pub use pipeline::{ScrapeReport, Scraper};
pub use process::{ContentCleaner, ContentSynthesizer, OutputFormat, SynthesizedDocument};
pub use state::PageState;
