//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching behind the `PageFetcher` seam
//! - Token-bucket rate limiting shared by one crawl session
//! - Depth-bounded recursive traversal with at-most-once fetch per URL

mod crawl;
mod fetcher;
mod rate_limiter;

pub use crawl::{CrawlRequest, CrawlResult, CrawlSettings, Crawler};
pub use fetcher::{build_http_client, FetchError, HttpFetcher, PageFetcher, RawPage};
pub use rate_limiter::{RateLimiter, DEFAULT_BURST_SIZE, DEFAULT_REQUESTS_PER_SECOND};

use crate::config::Config;
use crate::SiftError;

/// Runs a crawl with configured settings and the default tag set
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `seed` - URL to start from
///
/// # Returns
///
/// * `Ok(CrawlResult)` - Items of every fetched page
/// * `Err(SiftError)` - The seed was invalid or the HTTP client could not be built
pub async fn crawl(config: &Config, seed: &str) -> Result<CrawlResult, SiftError> {
    Crawler::from_config(config)?
        .crawl(seed, config.crawler.max_depth, None)
        .await
}
