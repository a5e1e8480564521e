//! Depth-bounded recursive crawl
//!
//! Each crawl call builds a fresh session holding the visited set and the
//! token bucket, so concurrent crawls share nothing. Pages are visited as a
//! tree walk: a page at depth `d` is fetched when `d <= max_depth` and its
//! same-origin links are expanded when `d < max_depth`. Every child of a page
//! runs as its own task, and the parent joins them in link order.
//!
//! The visited set is keyed by normalized URL, but a page is always fetched
//! at the URL it was resolved to, and its links are resolved against the
//! final URL the server answered from.

use crate::agent::ExtractionStrategy;
use crate::config::Config;
use crate::crawler::fetcher::{FetchError, HttpFetcher, PageFetcher, RawPage};
use crate::crawler::rate_limiter::RateLimiter;
use crate::extract::{ContentExtractor, ContentItem};
use crate::state::{PageState, VisitedSet};
use crate::url::{extract_links, is_same_origin, normalize_url, validate_url};
use crate::SiftError;
use futures::future::{BoxFuture, FutureExt};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use url::Url;

/// Per-crawl tuning taken from `[crawler]`
#[derive(Debug, Clone)]
pub struct CrawlSettings {
    pub requests_per_second: f64,
    pub burst_size: u32,
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            requests_per_second: 2.0,
            burst_size: 5,
            max_retries: 0,
            retry_delay: Duration::from_millis(500),
        }
    }
}

impl From<&crate::config::CrawlerConfig> for CrawlSettings {
    fn from(config: &crate::config::CrawlerConfig) -> Self {
        Self {
            requests_per_second: config.requests_per_second,
            burst_size: config.burst_size,
            max_retries: config.max_retries,
            retry_delay: Duration::from_millis(config.retry_delay_ms),
        }
    }
}

/// What to extract during one crawl
#[derive(Debug, Clone, Default)]
pub struct CrawlRequest {
    /// Caller selectors; `None` scans the default tag set
    pub selectors: Option<Vec<String>>,
    /// Subtrees excluded from extraction
    pub ignore_patterns: Vec<String>,
    /// URL substrings whose links are visited first
    pub priority_pages: Vec<String>,
}

impl CrawlRequest {
    pub fn with_selectors(selectors: Option<&[String]>) -> Self {
        Self {
            selectors: selectors.map(<[String]>::to_vec),
            ..Self::default()
        }
    }

    /// Applies a planned strategy on top of caller selectors
    ///
    /// Caller selectors win; the strategy's content patterns are used only
    /// when the caller passed none.
    pub fn from_strategy(selectors: Option<&[String]>, strategy: &ExtractionStrategy) -> Self {
        let selectors = match selectors {
            Some(selectors) => Some(selectors.to_vec()),
            None if !strategy.content_patterns.is_empty() => {
                Some(strategy.content_patterns.clone())
            }
            None => None,
        };

        Self {
            selectors,
            ignore_patterns: strategy.ignore_patterns.clone(),
            priority_pages: strategy.priority_pages.clone(),
        }
    }
}

/// Outcome of one crawl call
#[derive(Debug, Clone)]
pub struct CrawlResult {
    /// Items of every successfully fetched page, in traversal order
    pub items: Vec<ContentItem>,
    /// Number of URLs claimed for fetching
    pub pages_visited: usize,
    /// Claimed URLs whose fetch failed
    pub pages_failed: usize,
    pub elapsed: Duration,
}

/// Crawls a site from a seed URL
pub struct Crawler {
    fetcher: Arc<dyn PageFetcher>,
    extractor: ContentExtractor,
    settings: CrawlSettings,
}

impl Crawler {
    pub fn new(
        fetcher: Arc<dyn PageFetcher>,
        extractor: ContentExtractor,
        settings: CrawlSettings,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            settings,
        }
    }

    /// Builds an HTTP-backed crawler from configuration
    pub fn from_config(config: &Config) -> Result<Self, SiftError> {
        let fetcher = HttpFetcher::from_config(&config.user_agent, &config.fetcher)?;
        Ok(Self::new(
            Arc::new(fetcher),
            ContentExtractor::new(config.crawler.structured),
            CrawlSettings::from(&config.crawler),
        ))
    }

    pub fn settings(&self) -> &CrawlSettings {
        &self.settings
    }

    /// Crawls `seed` up to `max_depth` link hops
    ///
    /// Fails only when the seed is not a crawlable URL. Pages that cannot be
    /// fetched contribute no items and the crawl carries on.
    pub async fn crawl(
        &self,
        seed: &str,
        max_depth: u32,
        selectors: Option<&[String]>,
    ) -> Result<CrawlResult, SiftError> {
        self.crawl_with(seed, max_depth, CrawlRequest::with_selectors(selectors))
            .await
    }

    /// Crawls with a full request (selectors, ignore patterns, priorities)
    pub async fn crawl_with(
        &self,
        seed: &str,
        max_depth: u32,
        request: CrawlRequest,
    ) -> Result<CrawlResult, SiftError> {
        if !validate_url(seed) {
            return Err(SiftError::InvalidSeedUrl(seed.to_string()));
        }
        let mut seed_url =
            Url::parse(seed).map_err(|e| SiftError::InvalidSeedUrl(format!("{}: {}", seed, e)))?;
        seed_url.set_fragment(None);
        let seed_key = normalize_url(seed_url.as_str())
            .map_err(|e| SiftError::InvalidSeedUrl(format!("{}: {}", seed, e)))?;

        tracing::info!("Starting crawl of {} (max depth {})", seed_url, max_depth);
        let start = Instant::now();

        let extractor = if request.ignore_patterns.is_empty() {
            self.extractor.clone()
        } else {
            self.extractor
                .clone()
                .with_ignore_patterns(&request.ignore_patterns)
        };

        let session = Arc::new(Session {
            fetcher: Arc::clone(&self.fetcher),
            extractor,
            selectors: request.selectors,
            priority_pages: request.priority_pages,
            origin: seed_key.clone(),
            visited: VisitedSet::new(),
            limiter: RateLimiter::new(self.settings.requests_per_second, self.settings.burst_size),
            max_depth,
            max_retries: self.settings.max_retries,
            retry_delay: self.settings.retry_delay,
            failed: AtomicUsize::new(0),
        });

        let items = visit(Arc::clone(&session), seed_key, seed_url, 0).await;

        let result = CrawlResult {
            items,
            pages_visited: session.visited.len(),
            pages_failed: session.failed.load(Ordering::Relaxed),
            elapsed: start.elapsed(),
        };

        tracing::info!(
            "Crawl complete: {} pages visited ({} failed), {} items in {:.1}s",
            result.pages_visited,
            result.pages_failed,
            result.items.len(),
            result.elapsed.as_secs_f64()
        );

        Ok(result)
    }
}

/// State shared by every task of one crawl
struct Session {
    fetcher: Arc<dyn PageFetcher>,
    extractor: ContentExtractor,
    selectors: Option<Vec<String>>,
    priority_pages: Vec<String>,
    /// Normalized seed; no link leaves its host
    origin: Url,
    visited: VisitedSet,
    limiter: RateLimiter,
    max_depth: u32,
    max_retries: u32,
    retry_delay: Duration,
    failed: AtomicUsize,
}

impl Session {
    /// Decides whether a discovered page gets fetched, claiming it if so
    fn admit(&self, key: &Url, depth: u32) -> PageState {
        if depth > self.max_depth {
            PageState::DepthExceeded
        } else if !self.visited.claim(key) {
            PageState::AlreadyVisited
        } else {
            PageState::Fetching
        }
    }

    async fn fetch_with_retry(&self, url: &Url) -> Result<RawPage, FetchError> {
        let mut attempt = 0;
        loop {
            match self.fetcher.fetch(url).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    attempt += 1;
                    tracing::warn!(
                        "Fetch of {} failed ({}), retry {}/{}",
                        url,
                        e,
                        attempt,
                        self.max_retries
                    );
                    tokio::time::sleep(self.retry_delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Extracts items and, below the depth limit, the `(key, target)` links
    /// to follow
    ///
    /// `page_url` is the URL the page was served from. Kept synchronous so
    /// parsed documents never live across an await.
    fn process_page(
        &self,
        page_url: &Url,
        body: &str,
        depth: u32,
    ) -> (Vec<ContentItem>, Vec<(Url, Url)>) {
        let items = self
            .extractor
            .extract(body, self.selectors.as_deref(), page_url.as_str());

        if depth >= self.max_depth {
            return (items, Vec::new());
        }

        let (mut links, rest): (Vec<_>, Vec<_>) = extract_links(body, page_url)
            .into_iter()
            .filter(|(key, _)| is_same_origin(key, &self.origin) && !self.visited.contains(key))
            .partition(|(_, target)| self.is_priority(target));
        links.extend(rest);

        (items, links)
    }

    fn is_priority(&self, link: &Url) -> bool {
        self.priority_pages
            .iter()
            .any(|pattern| !pattern.is_empty() && link.as_str().contains(pattern.as_str()))
    }
}

/// Visits one page and, recursively, its children
///
/// `key` is the normalized URL claimed in the visited set, `url` the one
/// fetched.
fn visit(
    session: Arc<Session>,
    key: Url,
    url: Url,
    depth: u32,
) -> BoxFuture<'static, Vec<ContentItem>> {
    async move {
        let state = session.admit(&key, depth);
        if state.is_terminal() {
            tracing::debug!("{} at depth {}: {}", url, depth, state);
            return Vec::new();
        }

        session.limiter.acquire().await;
        tracing::debug!("Fetching {} (depth {})", url, depth);

        let page = match session.fetch_with_retry(&url).await {
            Ok(page) => page,
            Err(e) => {
                session.failed.fetch_add(1, Ordering::Relaxed);
                tracing::warn!("{} {}: {}", PageState::FetchFailed, url, e);
                return Vec::new();
            }
        };

        let (mut items, links) = session.process_page(&page.url, &page.body, depth);
        tracing::debug!(
            "{} {}: {} items, {} links to follow",
            PageState::Extracted,
            url,
            items.len(),
            links.len()
        );

        let children: Vec<_> = links
            .into_iter()
            .map(|(key, target)| tokio::spawn(visit(Arc::clone(&session), key, target, depth + 1)))
            .collect();

        for child in children {
            match child.await {
                Ok(child_items) => items.extend(child_items),
                Err(e) => tracing::error!("Crawl task under {} failed: {}", url, e),
            }
        }

        items
    }
    .boxed()
}
