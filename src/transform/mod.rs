//! Cleaning stage: normalizes the raw dataset for downstream analysis
//!
//! This module reads the raw dataset produced by the crawler, normalizes
//! price / availability / rating fields into typed values, deduplicates by
//! product page URL, and loads the result into a flat CSV file and a SQLite
//! table.

mod fields;
mod sqlite;

pub use fields::{parse_availability, parse_price, rating_from_word};
pub use sqlite::load_sqlite;

use crate::config::Config;
use crate::record::BookRecord;
use crate::storage::{self, StorageError};
use crate::HarvestError;
use serde::Serialize;
use std::collections::HashSet;
use std::path::Path;

/// One cleaned, typed row of the books dataset
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CleanBook {
    pub title: String,
    pub product_page_url: String,
    pub category: Option<String>,
    pub price: Option<f64>,
    pub availability: u32,
    pub rating: Option<u8>,
    pub description: Option<String>,
    pub image_url: String,
}

/// Cleans raw records into typed rows
///
/// - title is trimmed and lowercased
/// - price/availability/rating are normalized per [`fields`]
/// - rows lacking a product page URL are dropped
/// - rows are deduplicated by product page URL, first occurrence winning
pub fn clean_records(raw: &[BookRecord]) -> Vec<CleanBook> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::new();

    for record in raw {
        if record.product_page_url.is_empty() {
            continue;
        }
        if !seen.insert(record.product_page_url.clone()) {
            continue;
        }

        cleaned.push(CleanBook {
            title: record.title.trim().to_lowercase(),
            product_page_url: record.product_page_url.clone(),
            category: record.category.clone(),
            price: parse_price(&record.price_text),
            availability: parse_availability(&record.availability_text),
            rating: rating_from_word(&record.rating_text),
            description: record.description.clone(),
            image_url: record.image_url.clone(),
        });
    }

    cleaned
}

/// Writes the cleaned rows as CSV with a fixed column order
pub fn write_clean_csv(rows: &[CleanBook], path: &Path) -> Result<(), StorageError> {
    storage::ensure_parent_dir(path)?;

    let mut writer = csv::Writer::from_path(path)?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer
        .flush()
        .map_err(|e| StorageError::Io {
            path: path.display().to_string(),
            source: e,
        })?;

    Ok(())
}

/// Runs the full cleaning stage against the configured paths
///
/// Loads the raw JSON dataset, cleans it, and writes both the cleaned CSV
/// and the SQLite `books` table.
pub fn run_transform(config: &Config) -> Result<(), HarvestError> {
    let raw_path = Path::new(&config.output.raw_json_path);
    tracing::info!("Loading raw dataset from {}", raw_path.display());
    let raw = storage::load_checkpoint(raw_path)?;
    tracing::info!("Loaded {} records", raw.len());

    let cleaned = clean_records(&raw);
    tracing::info!("Cleaned data has {} records", cleaned.len());

    let csv_path = Path::new(&config.output.clean_csv_path);
    write_clean_csv(&cleaned, csv_path)?;
    tracing::info!("Wrote cleaned CSV to {}", csv_path.display());

    let db_path = Path::new(&config.output.database_path);
    load_sqlite(&cleaned, db_path)?;
    tracing::info!(
        "Loaded {} rows into SQLite at {}",
        cleaned.len(),
        db_path.display()
    );

    Ok(())
}
