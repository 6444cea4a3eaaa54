//! Bookharvest: a polite book catalog scraper
//!
//! This crate crawls a paginated book catalog, follows each listing to its
//! detail page, and accumulates merged records into a durable, resumable raw
//! dataset. A secondary transform stage normalizes the raw dataset into a
//! cleaned CSV file and SQLite table for downstream analysis.

pub mod config;
pub mod crawler;
pub mod record;
pub mod storage;
pub mod transform;

use thiserror::Error;

/// Main error type for bookharvest operations
#[derive(Debug, Error)]
pub enum HarvestError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
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

/// Fetch failure, surfaced only after the retry budget is exhausted.
///
/// Callers receive this as an explicit value; the fetcher never panics or
/// unwinds past its boundary.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to fetch {url} after {attempts} attempts: {last_error}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        last_error: String,
    },
}

/// Result type alias for bookharvest operations
pub type Result<T> = std::result::Result<T, HarvestError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use record::{BookRecord, DetailRecord, ListingRecord};
