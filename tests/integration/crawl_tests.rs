//! Integration tests for the crawler and scrape pipeline
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use pagesift::config::{
    CacheConfig, Config, CrawlerConfig, FetcherConfig, OutputConfig, UserAgentConfig,
};
use pagesift::crawler::Crawler;
use pagesift::extract::ContentKind;
use pagesift::process::RenderedOutput;
use pagesift::storage::SqliteCache;
use pagesift::{Scraper, SiftError};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration with a fast rate limit
fn create_test_config(max_depth: u32) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_depth,
            requests_per_second: 100.0,
            burst_size: 50,
            max_retries: 0,
            retry_delay_ms: 10,
            structured: true,
        },
        user_agent: UserAgentConfig {
            crawler_name: "TestBot".to_string(),
            crawler_version: "1.0.0".to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "test@example.com".to_string(),
        },
        fetcher: FetcherConfig {
            timeout_secs: 5,
            connect_timeout_secs: 2,
        },
        cache: CacheConfig::default(),
        output: OutputConfig::default(),
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!("<html><body>{}</body></html>", body))
        .insert_header("content-type", "text/html")
}

/// Mounts a GET mock that must be hit exactly `times` times
async fn mount_page(server: &MockServer, route: &str, response: ResponseTemplate, times: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(response)
        .expect(times)
        .mount(server)
        .await;
}

/// Site layout: / -> {/a, /b}, /a -> {/c, /}, /b -> {/c}
async fn mount_site(server: &MockServer, hits: u64) {
    mount_page(
        server,
        "/",
        html(r#"<h1>Home</h1><p>Welcome home page.</p><a href="/a">A</a><a href="/b">B</a>"#),
        1,
    )
    .await;
    mount_page(
        server,
        "/a",
        html(r#"<p>Section alpha text.</p><a href="/c">C</a><a href="/">Home</a>"#),
        hits,
    )
    .await;
    mount_page(
        server,
        "/b",
        html(r#"<p>Section beta text.</p><a href="/c#top">C</a>"#),
        hits,
    )
    .await;
}

fn texts(items: &[pagesift::ContentItem]) -> Vec<String> {
    items
        .iter()
        .filter_map(|i| i.text().map(str::to_string))
        .collect()
}

#[tokio::test]
async fn test_depth_zero_visits_only_seed() {
    let server = MockServer::start().await;
    mount_site(&server, 0).await;

    let crawler = Crawler::from_config(&create_test_config(0)).unwrap();
    let result = crawler
        .crawl(&format!("{}/", server.uri()), 0, None)
        .await
        .unwrap();

    assert_eq!(result.pages_visited, 1);
    assert_eq!(texts(&result.items), vec!["Welcome home page.", "Home"]);
}

#[tokio::test]
async fn test_depth_one_follows_links_in_order() {
    let server = MockServer::start().await;
    mount_site(&server, 1).await;
    mount_page(&server, "/c", html("<p>Deep page.</p>"), 0).await;

    let crawler = Crawler::from_config(&create_test_config(1)).unwrap();
    let result = crawler
        .crawl(&format!("{}/", server.uri()), 1, None)
        .await
        .unwrap();

    assert_eq!(result.pages_visited, 3);
    assert_eq!(result.pages_failed, 0);
    assert_eq!(
        texts(&result.items),
        vec![
            "Welcome home page.",
            "Home",
            "Section alpha text.",
            "Section beta text."
        ]
    );
}

#[tokio::test]
async fn test_each_url_fetched_at_most_once() {
    let server = MockServer::start().await;
    mount_site(&server, 1).await;
    // Linked from both /a and /b (once with a fragment), fetched once
    mount_page(&server, "/c", html("<p>Deep page.</p>"), 1).await;

    let crawler = Crawler::from_config(&create_test_config(3)).unwrap();
    let result = crawler
        .crawl(&format!("{}/", server.uri()), 3, None)
        .await
        .unwrap();

    assert_eq!(result.pages_visited, 4);
    let deep = texts(&result.items)
        .into_iter()
        .filter(|t| t == "Deep page.")
        .count();
    assert_eq!(deep, 1);
}

#[tokio::test]
async fn test_directory_seed_resolves_relative_links() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/docs/",
        html(r#"<p>Documentation index.</p><a href="intro">Intro</a>"#),
        1,
    )
    .await;
    mount_page(&server, "/docs/intro", html("<p>Introduction page.</p>"), 1).await;
    mount_page(&server, "/intro", html("<p>Wrong page.</p>"), 0).await;
    mount_page(&server, "/docs", html("<p>Wrong page.</p>"), 0).await;

    let crawler = Crawler::from_config(&create_test_config(1)).unwrap();
    let result = crawler
        .crawl(&format!("{}/docs/", server.uri()), 1, None)
        .await
        .unwrap();

    assert_eq!(result.pages_visited, 2);
    assert_eq!(result.pages_failed, 0);
    assert_eq!(
        texts(&result.items),
        vec!["Documentation index.", "Introduction page."]
    );
}

#[tokio::test]
async fn test_cross_origin_links_not_followed() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    // The other server listens on localhost, a different host than 127.0.0.1
    let other_port = url::Url::parse(&other.uri()).unwrap().port().unwrap();
    mount_page(
        &server,
        "/",
        html(&format!(
            r#"<p>Root text here.</p><a href="http://localhost:{}/x">away</a>"#,
            other_port
        )),
        1,
    )
    .await;
    mount_page(&other, "/x", html("<p>Elsewhere</p>"), 0).await;

    let crawler = Crawler::from_config(&create_test_config(2)).unwrap();
    let result = crawler
        .crawl(&format!("{}/", server.uri()), 2, None)
        .await
        .unwrap();

    assert_eq!(result.pages_visited, 1);
}

#[tokio::test]
async fn test_failed_pages_are_counted_and_skipped() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html(r#"<p>Root text here.</p><a href="/missing">gone</a><a href="/broken">err</a>"#),
        1,
    )
    .await;
    mount_page(&server, "/missing", ResponseTemplate::new(404), 1).await;
    mount_page(&server, "/broken", ResponseTemplate::new(500), 1).await;

    let crawler = Crawler::from_config(&create_test_config(1)).unwrap();
    let result = crawler
        .crawl(&format!("{}/", server.uri()), 1, None)
        .await
        .unwrap();

    assert_eq!(result.pages_visited, 3);
    assert_eq!(result.pages_failed, 2);
    assert_eq!(texts(&result.items), vec!["Root text here."]);
}

#[tokio::test]
async fn test_every_page_failing_still_returns_result() {
    let server = MockServer::start().await;
    mount_page(&server, "/", ResponseTemplate::new(503), 1).await;

    let crawler = Crawler::from_config(&create_test_config(2)).unwrap();
    let result = crawler
        .crawl(&format!("{}/", server.uri()), 2, None)
        .await
        .unwrap();

    assert_eq!(result.pages_visited, 1);
    assert_eq!(result.pages_failed, 1);
    assert!(result.items.is_empty());
}

#[tokio::test]
async fn test_retry_recovers_from_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", html("<p>Second try works.</p>"), 1).await;

    let mut config = create_test_config(0);
    config.crawler.max_retries = 2;
    let crawler = Crawler::from_config(&config).unwrap();
    let result = crawler
        .crawl(&format!("{}/", server.uri()), 0, None)
        .await
        .unwrap();

    assert_eq!(result.pages_failed, 0);
    assert_eq!(texts(&result.items), vec!["Second try works."]);
}

#[tokio::test]
async fn test_invalid_seed_url() {
    let crawler = Crawler::from_config(&create_test_config(1)).unwrap();

    for seed in ["", "ftp://example.com/", "not a url", "https://"] {
        let result = crawler.crawl(seed, 1, None).await;
        assert!(
            matches!(result, Err(SiftError::InvalidSeedUrl(_))),
            "seed {:?} should be rejected",
            seed
        );
    }
}

#[tokio::test]
async fn test_selectors_and_structured_items() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html(
            r#"<div class="card"><span>Card one</span></div>
               <p>Plain paragraph</p>
               <ul><li>first</li><li>second</li></ul>
               <form action="/go" method="post"><input name="q" required></form>"#,
        ),
        1,
    )
    .await;

    let crawler = Crawler::from_config(&create_test_config(0)).unwrap();
    let selectors = vec![".card span".to_string()];
    let result = crawler
        .crawl(&format!("{}/", server.uri()), 0, Some(&selectors))
        .await
        .unwrap();

    let kinds: Vec<ContentKind> = result.items.iter().map(|i| i.kind).collect();
    assert_eq!(
        kinds,
        vec![ContentKind::Selected, ContentKind::List, ContentKind::Form]
    );
    assert_eq!(result.items[0].text(), Some("Card one"));
}

#[tokio::test]
async fn test_scrape_pipeline_json_and_markdown() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        html(
            r#"<h1>Test Page</h1><p>Sample content</p>
               <table><tr><th>Header</th></tr><tr><td>Data</td></tr></table>
               <a href="/pricing">Pricing</a>"#,
        ),
        2,
    )
    .await;
    mount_page(
        &server,
        "/pricing",
        html("<h2>Pricing</h2><p>Plans start at five dollars.</p>"),
        2,
    )
    .await;

    let scraper = Scraper::from_config(&create_test_config(1)).unwrap();
    let seed = format!("{}/", server.uri());

    let report = scraper
        .scrape(&seed, "pricing plans", 1, "json")
        .await
        .unwrap();
    assert_eq!(report.metadata.pages_visited, 2);
    assert_eq!(report.metadata.items_extracted, 5);

    let RenderedOutput::Json { content, version, .. } = &report.document else {
        panic!("expected json document");
    };
    assert_eq!(version, "1.0");
    assert_eq!(content.metadata.total_items, 5);
    assert_eq!(content.tables[0].headers, vec!["Header"]);
    let text = content.text_content.as_ref().unwrap();
    assert!(text.full_text.starts_with("Plans start at five dollars."));

    let report = scraper
        .scrape(&seed, "pricing plans", 1, "markdown")
        .await
        .unwrap();
    let RenderedOutput::Markdown { content, .. } = &report.document else {
        panic!("expected markdown document");
    };
    assert!(content.contains("# Test Page\n"));
    assert!(content.contains("## Pricing\n"));
    assert!(content.contains("| Header |\n| --- |\n| Data |"));
}

#[tokio::test]
async fn test_scrape_unsupported_format() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html("<p>Never fetched</p>"), 0).await;

    let scraper = Scraper::from_config(&create_test_config(0)).unwrap();
    let result = scraper
        .scrape(&format!("{}/", server.uri()), "", 0, "xml")
        .await;

    assert!(matches!(result, Err(SiftError::UnsupportedFormat(_))));
}

#[tokio::test]
async fn test_scrape_served_from_cache() {
    let server = MockServer::start().await;
    mount_page(&server, "/", html("<p>Cached content here.</p>"), 1).await;

    let dir = TempDir::new().unwrap();
    let cache = Arc::new(SqliteCache::open(&dir.path().join("cache.db")).unwrap());
    let scraper = Scraper::from_config(&create_test_config(0))
        .unwrap()
        .with_cache(cache, Duration::from_secs(300));
    let seed = format!("{}/", server.uri());

    let first = scraper.scrape(&seed, "content", 0, "csv").await.unwrap();
    let second = scraper.scrape(&seed, "content", 0, "csv").await.unwrap();

    assert!(!first.from_cache);
    assert!(second.from_cache);
    assert_eq!(first.document, second.document);
}
