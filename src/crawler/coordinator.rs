//! Crawl coordinator - main crawl orchestration logic
//!
//! This module contains the main crawl loop that coordinates all aspects of
//! the scraping process, including:
//! - Resuming the accumulator from an existing checkpoint
//! - Driving pagination over listing pages
//! - Fetching and parsing each item's detail page
//! - Merging records and appending them to the accumulator
//! - Periodic checkpoints and the final flush
//! - Handling end-of-crawl and external interruption

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, fetch_page, FetchedPage, RetryPolicy};
use crate::crawler::parser::{parse_detail, parse_listing};
use crate::record::{BookRecord, DetailRecord, ListingRecord};
use crate::storage::{export_table, load_checkpoint, save_checkpoint};
use crate::HarvestError;
use rand::{rng, Rng};
use reqwest::Client;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Main crawl coordinator structure
///
/// The coordinator exclusively owns the accumulator: no other component
/// reads or writes it while a run is in progress. Interruption is requested
/// through the shared flag returned by [`Coordinator::shutdown_flag`] and is
/// observed at item and page boundaries.
pub struct Coordinator {
    config: Config,
    base_url: Url,
    client: Client,
    policy: RetryPolicy,
    books: Vec<BookRecord>,
    shutdown: Arc<AtomicBool>,
}

impl Coordinator {
    /// Creates a new coordinator instance
    ///
    /// Unless `fresh` is set, an existing checkpoint file is loaded as the
    /// initial accumulator so previously obtained records are kept.
    /// Pagination itself always restarts from page 1: re-fetched pages may
    /// re-derive items already present, and the downstream cleaning stage
    /// deduplicates by product page URL.
    ///
    /// # Arguments
    ///
    /// * `config` - The scraper configuration
    /// * `fresh` - Whether to ignore an existing checkpoint
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(HarvestError)` - Invalid base URL or HTTP client build failure
    pub fn new(config: Config, fresh: bool) -> Result<Self, HarvestError> {
        let base_url = Url::parse(&config.crawler.base_url)?;
        let client = build_http_client(&config)?;
        let policy = RetryPolicy::from_config(&config);

        let checkpoint_path = Path::new(&config.output.raw_json_path);
        let books = if fresh {
            Vec::new()
        } else if checkpoint_path.exists() {
            match load_checkpoint(checkpoint_path) {
                Ok(records) => {
                    tracing::info!(
                        "Loaded {} previously scraped items (resuming)",
                        records.len()
                    );
                    records
                }
                Err(e) => {
                    tracing::warn!("Failed to load existing checkpoint: {} - starting fresh", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            config,
            base_url,
            client,
            policy,
            books,
            shutdown: Arc::new(AtomicBool::new(false)),
        })
    }

    /// Shared interruption flag
    ///
    /// Setting it stops the crawl at the next item or page boundary; the
    /// coordinator then runs the same final checkpoint-and-export flush as a
    /// normal end of pagination.
    pub fn shutdown_flag(&self) -> Arc<AtomicBool> {
        self.shutdown.clone()
    }

    /// Records accumulated so far (resumed plus newly appended)
    pub fn records(&self) -> &[BookRecord] {
        &self.books
    }

    /// Runs the main crawl loop
    ///
    /// State machine over page number N starting at 1:
    /// 1. Fetch listing page N; a fetch failure ends pagination (logged, not
    ///    escalated)
    /// 2. Zero item entries also ends pagination
    /// 3. Per item: parse summary, fetch + parse the detail page with an
    ///    independent retry budget, merge, append; politeness pause; maybe
    ///    checkpoint
    /// 4. Page-level politeness pause, next page (bounded by max_pages)
    ///
    /// Finalize - the single terminal state - performs an unconditional
    /// checkpoint and tabular export, whatever brought the loop down.
    pub async fn run(&mut self) -> Result<(), HarvestError> {
        let started = chrono::Utc::now();
        tracing::info!(
            "Starting scrape loop at {} with {} resumed records",
            started.format("%Y-%m-%d %H:%M:%S"),
            self.books.len()
        );

        let mut page = 1u32;
        'pages: while page <= self.config.crawler.max_pages {
            if self.interrupted() {
                break;
            }

            let page_url = match self.base_url.join(&format!("catalogue/page-{}.html", page)) {
                Ok(url) => url,
                Err(e) => {
                    tracing::error!("Could not build URL for page {}: {}", page, e);
                    break;
                }
            };

            tracing::info!("Fetching page {}: {}", page, page_url);
            let listing = match fetch_page(&self.client, page_url.as_str(), &self.policy).await {
                Ok(fetched) => fetched,
                Err(e) => {
                    tracing::warn!("Stopping: could not fetch listing page {} ({})", page_url, e);
                    break;
                }
            };

            let items = parse_listing(&listing.body, &listing.final_url);
            if items.is_empty() {
                tracing::info!("No item entries on page {} - finishing pagination", page);
                break;
            }

            for item in items {
                if self.interrupted() {
                    break 'pages;
                }

                let detail = self.enrich(&item).await;
                self.books.push(BookRecord::merge(item, detail));

                // polite pause between detail page requests
                self.pause(
                    self.config.politeness.item_delay_min_ms,
                    self.config.politeness.item_delay_max_ms,
                )
                .await;

                // persist partial progress every N items
                if self.books.len() % self.config.crawler.checkpoint_every == 0 {
                    self.checkpoint();
                }
            }

            // polite pause between pages
            self.pause(
                self.config.politeness.page_delay_min_ms,
                self.config.politeness.page_delay_max_ms,
            )
            .await;
            page += 1;
        }

        self.finalize()
    }

    /// Fetches and parses an item's detail page
    ///
    /// Uses an independent retry budget per call. On failure the item is not
    /// discarded: the caller proceeds with the listing fields alone.
    async fn enrich(&self, item: &ListingRecord) -> Option<DetailRecord> {
        if item.product_page_url.is_empty() {
            tracing::warn!(
                "Listing item '{}' carries no detail link, keeping summary fields only",
                item.title
            );
            return None;
        }

        match fetch_page(&self.client, &item.product_page_url, &self.policy).await {
            Ok(FetchedPage { body, final_url }) => Some(parse_detail(&body, &final_url)),
            Err(e) => {
                tracing::error!("Unable to fetch detail page: {}", e);
                None
            }
        }
    }

    fn interrupted(&self) -> bool {
        self.shutdown.load(Ordering::SeqCst)
    }

    /// Sleeps a uniformly random duration within [min_ms, max_ms]
    async fn pause(&self, min_ms: u64, max_ms: u64) {
        if self.interrupted() {
            return;
        }
        let delay_ms = if max_ms > min_ms {
            rng().random_range(min_ms..=max_ms)
        } else {
            min_ms
        };
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }

    /// Writes the current accumulator snapshot
    ///
    /// A write failure is logged and the crawl continues: the atomic
    /// temp-write+rename in the store guarantees the previously committed
    /// snapshot is still intact.
    fn checkpoint(&self) {
        let path = Path::new(&self.config.output.raw_json_path);
        if let Err(e) = save_checkpoint(&self.books, path) {
            tracing::error!("Checkpoint write failed: {} (previous snapshot unaffected)", e);
        }
    }

    /// Unconditional final checkpoint and tabular export
    fn finalize(&self) -> Result<(), HarvestError> {
        self.checkpoint();

        let csv_path = Path::new(&self.config.output.raw_csv_path);
        if let Err(e) = export_table(&self.books, csv_path) {
            tracing::error!("Tabular export failed: {}", e);
        }

        tracing::info!("Scrape finished. Total items: {}", self.books.len());
        tracing::info!(
            "Files written: {} , {}",
            self.config.output.raw_json_path,
            self.config.output.raw_csv_path
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config() -> Config {
        let mut config = Config::default();
        config.politeness.item_delay_min_ms = 1;
        config.politeness.item_delay_max_ms = 2;
        config.politeness.page_delay_min_ms = 1;
        config.politeness.page_delay_max_ms = 2;
        config
    }

    #[test]
    fn test_coordinator_starts_empty_without_checkpoint() {
        let mut config = test_config();
        config.output.raw_json_path = "/nonexistent/never_written.json".to_string();
        let coordinator = Coordinator::new(config, false).unwrap();
        assert!(coordinator.records().is_empty());
    }

    #[test]
    fn test_fresh_ignores_existing_checkpoint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw_books.json");
        let records = vec![BookRecord {
            title: "Resumed".to_string(),
            product_page_url: "http://example.com/item".to_string(),
            ..BookRecord::default()
        }];
        crate::storage::save_checkpoint(&records, &path).unwrap();

        let mut config = test_config();
        config.output.raw_json_path = path.to_string_lossy().to_string();

        let resumed = Coordinator::new(config.clone(), false).unwrap();
        assert_eq!(resumed.records().len(), 1);

        let fresh = Coordinator::new(config, true).unwrap();
        assert!(fresh.records().is_empty());
    }

    #[test]
    fn test_rejects_unparseable_base_url() {
        let mut config = test_config();
        config.crawler.base_url = "not a url".to_string();
        assert!(Coordinator::new(config, true).is_err());
    }
}
