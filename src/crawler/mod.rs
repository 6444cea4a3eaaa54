//! Crawler module for catalog scraping
//!
//! This module contains the core crawl logic, including:
//! - HTTP fetching with retry and backoff
//! - Tolerant HTML extraction of listing and detail records
//! - Pagination control and record merging
//! - Checkpoint cadence and interruption handling

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::Coordinator;
pub use fetcher::{build_http_client, fetch_page, FetchedPage, RetryPolicy};
pub use parser::{parse_detail, parse_listing};

use crate::config::Config;
use crate::HarvestError;
use std::sync::atomic::Ordering;

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Create the coordinator (resuming an existing checkpoint unless
///    `fresh` is set)
/// 2. Install a Ctrl-C listener that requests a clean stop
/// 3. Drive pagination until the catalog is exhausted or a stop is
///    requested
/// 4. Flush the final checkpoint and tabular export
///
/// # Arguments
///
/// * `config` - The scraper configuration
/// * `fresh` - Whether to ignore an existing checkpoint
///
/// # Returns
///
/// * `Ok(())` - Crawl finalized (including the interrupted case)
/// * `Err(HarvestError)` - Could not start the crawl
pub async fn crawl(config: Config, fresh: bool) -> Result<(), HarvestError> {
    let mut coordinator = Coordinator::new(config, fresh)?;

    let flag = coordinator.shutdown_flag();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted by user, saving partial results...");
            flag.store(true, Ordering::SeqCst);
        }
    });

    coordinator.run().await
}
