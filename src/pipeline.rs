//! End-to-end scrape pipeline
//!
//! `Scraper` ties the pieces together: format check, cache lookup, strategy
//! planning, crawl, cleaning, relevance scoring, synthesis and cache store.
//! Only a bad seed URL or an unsupported format fail a scrape; planner and
//! cache problems are logged and bypassed.

use crate::agent::{plan_or_default, score_items, InstructionPlanner, StrategyPlanner};
use crate::config::Config;
use crate::crawler::{CrawlRequest, Crawler};
use crate::process::{ContentCleaner, ContentSynthesizer, OutputFormat, RenderedOutput};
use crate::storage::{cache_key, open_cache, ContentCache};
use crate::url::validate_url;
use crate::SiftError;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Counters and timing of one scrape
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapeMetadata {
    pub pages_visited: usize,
    pub pages_failed: usize,
    /// Items produced by extraction, before cleaning
    pub items_extracted: usize,
    /// Items left after cleaning, by group
    pub content_types: BTreeMap<String, usize>,
    /// Wall-clock seconds with one decimal, e.g. `"1.3"`
    pub elapsed_seconds: String,
    /// RFC 3339 timestamp of completion
    pub extracted_at: String,
}

/// Result of [`Scraper::scrape`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub url: String,
    pub instructions: String,
    pub format: OutputFormat,
    pub document: RenderedOutput,
    pub metadata: ScrapeMetadata,
    /// Set when the report was served from the cache
    #[serde(skip)]
    pub from_cache: bool,
}

pub struct Scraper {
    crawler: Crawler,
    cleaner: ContentCleaner,
    synthesizer: ContentSynthesizer,
    planner: Arc<dyn StrategyPlanner>,
    cache: Option<Arc<dyn ContentCache>>,
    cache_ttl: Duration,
    selectors: Option<Vec<String>>,
}

impl Scraper {
    /// Creates a scraper with the instruction planner and no cache
    pub fn new(crawler: Crawler) -> Self {
        Self {
            crawler,
            cleaner: ContentCleaner::new(),
            synthesizer: ContentSynthesizer::new(),
            planner: Arc::new(InstructionPlanner),
            cache: None,
            cache_ttl: Duration::from_secs(3600),
            selectors: None,
        }
    }

    /// Builds an HTTP-backed scraper, opening the cache if enabled
    pub fn from_config(config: &Config) -> Result<Self, SiftError> {
        let mut scraper = Self::new(Crawler::from_config(config)?);
        scraper.cache = open_cache(&config.cache);
        scraper.cache_ttl = Duration::from_secs(config.cache.ttl_secs);
        Ok(scraper)
    }

    pub fn with_planner(mut self, planner: Arc<dyn StrategyPlanner>) -> Self {
        self.planner = planner;
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn ContentCache>, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.cache_ttl = ttl;
        self
    }

    pub fn without_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Uses these selectors instead of the default tag set or planned patterns
    pub fn with_selectors(mut self, selectors: Vec<String>) -> Self {
        self.selectors = (!selectors.is_empty()).then_some(selectors);
        self
    }

    /// Scrapes `url` and renders the result in `format`
    pub async fn scrape(
        &self,
        url: &str,
        instructions: &str,
        max_depth: u32,
        format: &str,
    ) -> Result<ScrapeReport, SiftError> {
        let format = format.parse::<OutputFormat>()?;
        if !validate_url(url) {
            return Err(SiftError::InvalidSeedUrl(url.to_string()));
        }

        let start = Instant::now();
        tracing::info!("Starting scrape for URL: {}", url);

        let key = self.cache_key(url, instructions, max_depth, format);
        if let Some(report) = self.cached_report(&key).await {
            tracing::info!("Serving {} from cache", url);
            return Ok(report);
        }

        let strategy = plan_or_default(self.planner.as_ref(), url, instructions).await;
        let request = CrawlRequest::from_strategy(self.selectors.as_deref(), &strategy);
        let crawl = self.crawler.crawl_with(url, max_depth, request).await?;

        let cleaned = self.cleaner.clean(&crawl.items);
        let scored = score_items(&cleaned, &strategy.relevance_criteria);
        let document = self.synthesizer.synthesize_as(&scored, format);

        let report = ScrapeReport {
            url: url.to_string(),
            instructions: instructions.to_string(),
            format,
            metadata: ScrapeMetadata {
                pages_visited: crawl.pages_visited,
                pages_failed: crawl.pages_failed,
                items_extracted: crawl.items.len(),
                content_types: document.metadata().content_types.clone(),
                elapsed_seconds: format!("{:.1}", start.elapsed().as_secs_f64()),
                extracted_at: Utc::now().to_rfc3339(),
            },
            document: document.output,
            from_cache: false,
        };

        self.store_report(&key, &report).await;
        Ok(report)
    }

    fn cache_key(&self, url: &str, instructions: &str, max_depth: u32, format: OutputFormat) -> String {
        match &self.selectors {
            Some(selectors) => cache_key(
                url,
                &format!("{}\n{}", instructions, selectors.join(",")),
                max_depth,
                format.as_str(),
            ),
            None => cache_key(url, instructions, max_depth, format.as_str()),
        }
    }

    async fn cached_report(&self, key: &str) -> Option<ScrapeReport> {
        let value = self.cache.as_ref()?.get(key).await?;
        match serde_json::from_value::<ScrapeReport>(value) {
            Ok(mut report) => {
                report.from_cache = true;
                Some(report)
            }
            Err(e) => {
                tracing::warn!("Ignoring undecodable cache entry: {}", e);
                None
            }
        }
    }

    async fn store_report(&self, key: &str, report: &ScrapeReport) {
        let Some(cache) = &self.cache else { return };

        match serde_json::to_value(report) {
            Ok(value) => {
                if !cache.set(key, &value, self.cache_ttl).await {
                    tracing::debug!("Scrape report for {} was not cached", report.url);
                }
            }
            Err(e) => tracing::warn!("Failed to serialize report for cache: {}", e),
        }
    }
}
