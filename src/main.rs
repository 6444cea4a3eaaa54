//! Bookharvest main entry point
//!
//! This is the command-line interface for the bookharvest catalog scraper.

use anyhow::Context;
use bookharvest::config::{load_config_with_hash, Config};
use bookharvest::crawler::crawl;
use bookharvest::transform::run_transform;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Bookharvest: a polite book catalog scraper
///
/// Bookharvest crawls a paginated book catalog, enriches each listing from
/// its detail page, and writes a durable, resumable raw dataset. A separate
/// transform mode cleans the raw dataset for downstream analysis.
#[derive(Parser, Debug)]
#[command(name = "bookharvest")]
#[command(version)]
#[command(about = "A polite book catalog scraper", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (built-in defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Ignore an existing checkpoint and start a fresh crawl
    #[arg(long)]
    fresh: bool,

    /// Validate config and show what would be crawled without crawling
    #[arg(long, conflicts_with = "transform")]
    dry_run: bool,

    /// Clean an existing raw dataset into CSV + SQLite, then exit
    #[arg(long, conflicts_with = "dry_run")]
    transform: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load configuration, falling back to built-in defaults when no file is given
    let config = match &cli.config {
        Some(path) => {
            tracing::info!("Loading configuration from: {}", path.display());
            let (config, hash) = load_config_with_hash(path)
                .with_context(|| format!("failed to load configuration {}", path.display()))?;
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            config
        }
        None => {
            tracing::info!("No configuration file given, using built-in defaults");
            Config::default()
        }
    };

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config);
    } else if cli.transform {
        run_transform(&config).context("transform failed")?;
    } else {
        handle_crawl(config, cli.fresh).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("bookharvest=info,warn"),
            1 => EnvFilter::new("bookharvest=debug,info"),
            2 => EnvFilter::new("bookharvest=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows what would be crawled
fn handle_dry_run(config: &Config) {
    println!("=== Bookharvest Dry Run ===\n");

    println!("Crawl:");
    println!("  Base URL: {}", config.crawler.base_url);
    println!("  Max pages: {}", config.crawler.max_pages);
    println!("  Checkpoint every: {} items", config.crawler.checkpoint_every);

    println!("\nFetch:");
    println!("  Max retries: {}", config.fetch.max_retries);
    println!("  Backoff base: {}ms", config.fetch.backoff_base_ms);
    println!("  Request timeout: {}s", config.fetch.request_timeout_secs);

    println!("\nPoliteness:");
    println!(
        "  Item delay: {}-{}ms",
        config.politeness.item_delay_min_ms, config.politeness.item_delay_max_ms
    );
    println!(
        "  Page delay: {}-{}ms",
        config.politeness.page_delay_min_ms, config.politeness.page_delay_max_ms
    );

    println!("\nUser Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Raw JSON: {}", config.output.raw_json_path);
    println!("  Raw CSV: {}", config.output.raw_csv_path);
    println!("  Clean CSV: {}", config.output.clean_csv_path);
    println!("  Database: {}", config.output.database_path);

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl up to {} listing pages from {}",
        config.crawler.max_pages, config.crawler.base_url
    );
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, fresh: bool) -> anyhow::Result<()> {
    if fresh {
        tracing::info!("Starting fresh crawl (ignoring any existing checkpoint)");
    } else {
        tracing::info!("Starting crawl (an existing checkpoint will be resumed)");
    }

    tracing::info!(
        "Catalog: {} (up to {} pages)",
        config.crawler.base_url,
        config.crawler.max_pages
    );

    crawl(config, fresh).await.context("crawl failed")?;
    tracing::info!("Crawl completed successfully");
    Ok(())
}
