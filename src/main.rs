//! PageSift main entry point
//!
//! This is the command-line interface for the PageSift content harvester.

use anyhow::Context;
use clap::Parser;
use pagesift::config::{load_config_with_hash, Config};
use pagesift::process::OutputFormat;
use pagesift::Scraper;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// PageSift: a polite content harvester
///
/// PageSift crawls a site from a seed URL, staying on the same host and
/// within a depth budget, extracts text, tables, lists and forms from every
/// page, and renders the cleaned result as JSON, CSV or Markdown.
#[derive(Parser, Debug)]
#[command(name = "pagesift")]
#[command(version)]
#[command(about = "A polite content harvester", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Seed URL to start crawling from
    #[arg(value_name = "URL")]
    url: String,

    /// What to look for; keywords rank matching text first
    #[arg(short = 'i', long, default_value = "")]
    instructions: String,

    /// Link hops to follow from the seed (overrides config)
    #[arg(short, long)]
    depth: Option<u32>,

    /// Output format: json, csv or markdown (overrides config)
    #[arg(short, long)]
    format: Option<String>,

    /// CSS selector to extract instead of the default tags (repeatable)
    #[arg(short, long = "selector", value_name = "CSS")]
    selectors: Vec<String>,

    /// Write the rendered output to this file instead of stdout
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Bypass the result cache even if it is enabled
    #[arg(long)]
    no_cache: bool,

    /// Validate config and show the effective settings without crawling
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("failed to load {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let depth = cli.depth.unwrap_or(config.crawler.max_depth);
    let format: OutputFormat = cli
        .format
        .as_deref()
        .unwrap_or(&config.output.format)
        .parse()?;

    if cli.dry_run {
        handle_dry_run(&config, &cli, depth, format);
        return Ok(());
    }

    handle_scrape(&config, &cli, depth, format).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("pagesift=info,warn"),
            1 => EnvFilter::new("pagesift=debug,info"),
            2 => EnvFilter::new("pagesift=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Handles the --dry-run mode: shows what a scrape would do
fn handle_dry_run(config: &Config, cli: &Cli, depth: u32, format: OutputFormat) {
    println!("=== PageSift Dry Run ===\n");

    println!("Request:");
    println!("  URL: {}", cli.url);
    println!("  Instructions: {}", cli.instructions);
    println!("  Depth: {}", depth);
    println!("  Format: {}", format);
    if cli.selectors.is_empty() {
        println!("  Selectors: default tag set");
    } else {
        println!("  Selectors: {}", cli.selectors.join(", "));
    }

    println!("\nCrawler Configuration:");
    println!(
        "  Rate limit: {} req/s (burst {})",
        config.crawler.requests_per_second, config.crawler.burst_size
    );
    println!(
        "  Retries: {} (delay {}ms)",
        config.crawler.max_retries, config.crawler.retry_delay_ms
    );
    println!("  Structured extraction: {}", config.crawler.structured);

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nCache:");
    if config.cache.enabled && !cli.no_cache {
        println!(
            "  {} (ttl {}s)",
            config.cache.database_path, config.cache.ttl_secs
        );
    } else {
        println!("  disabled");
    }

    println!("\n✓ Configuration is valid");
    if pagesift::url::validate_url(&cli.url) {
        println!("✓ Would start crawling at {}", cli.url);
    } else {
        println!("✗ {} is not a crawlable URL", cli.url);
    }
}

/// Handles the main scrape operation
async fn handle_scrape(
    config: &Config,
    cli: &Cli,
    depth: u32,
    format: OutputFormat,
) -> anyhow::Result<()> {
    let mut scraper = Scraper::from_config(config)?.with_selectors(cli.selectors.clone());
    if cli.no_cache {
        scraper = scraper.without_cache();
    }

    let report = match scraper
        .scrape(&cli.url, &cli.instructions, depth, format.as_str())
        .await
    {
        Ok(report) => report,
        Err(e) => {
            tracing::error!("Scrape failed: {}", e);
            return Err(e.into());
        }
    };

    tracing::info!(
        "Scrape finished: {} pages, {} items in {}s{}",
        report.metadata.pages_visited,
        report.metadata.items_extracted,
        report.metadata.elapsed_seconds,
        if report.from_cache { " (cached)" } else { "" }
    );

    let rendered = report.document.to_text()?;
    match &cli.output {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::info!("Output written to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}
