use serde::Deserialize;

/// Main configuration structure for bookharvest
///
/// Every field carries a default so a missing config file (or a partial one)
/// still yields a runnable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub fetch: FetchConfig,
    pub politeness: PolitenessConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawl behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CrawlerConfig {
    /// Root URL of the catalog site; listing pages are joined against it
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Upper bound on listing pages to traverse
    #[serde(rename = "max-pages")]
    pub max_pages: u32,

    /// Checkpoint the accumulator whenever its length is a multiple of this
    #[serde(rename = "checkpoint-every")]
    pub checkpoint_every: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://books.toscrape.com/".to_string(),
            max_pages: 1000,
            checkpoint_every: 20,
        }
    }
}

/// Fetch retry and timeout configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Attempts per request before giving up
    #[serde(rename = "max-retries")]
    pub max_retries: u32,

    /// Base backoff delay in milliseconds; doubled after each failed attempt
    #[serde(rename = "backoff-base-ms")]
    pub backoff_base_ms: u64,

    /// Per-request timeout in seconds
    #[serde(rename = "request-timeout-secs")]
    pub request_timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_retries: 4,
            backoff_base_ms: 1000,
            request_timeout_secs: 10,
        }
    }
}

/// Randomized politeness delays between requests (milliseconds)
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PolitenessConfig {
    /// Minimum pause between detail-page fetches
    #[serde(rename = "item-delay-min-ms")]
    pub item_delay_min_ms: u64,

    /// Maximum pause between detail-page fetches
    #[serde(rename = "item-delay-max-ms")]
    pub item_delay_max_ms: u64,

    /// Minimum pause between listing pages
    #[serde(rename = "page-delay-min-ms")]
    pub page_delay_min_ms: u64,

    /// Maximum pause between listing pages
    #[serde(rename = "page-delay-max-ms")]
    pub page_delay_max_ms: u64,
}

impl Default for PolitenessConfig {
    fn default() -> Self {
        Self {
            item_delay_min_ms: 400,
            item_delay_max_ms: 1200,
            page_delay_min_ms: 800,
            page_delay_max_ms: 2500,
        }
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UserAgentConfig {
    /// Name of the scraper
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the scraper
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the scraper
    #[serde(rename = "contact-url")]
    pub contact_url: String,

    /// Email address for scraper-related contact
    #[serde(rename = "contact-email")]
    pub contact_email: String,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: "bookharvest".to_string(),
            crawler_version: env!("CARGO_PKG_VERSION").to_string(),
            contact_url: "https://example.com/contact".to_string(),
            contact_email: "admin@example.com".to_string(),
        }
    }
}

/// Output path configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Path to the raw dataset (JSON checkpoint file)
    #[serde(rename = "raw-json-path")]
    pub raw_json_path: String,

    /// Path to the flat tabular sibling of the raw dataset
    #[serde(rename = "raw-csv-path")]
    pub raw_csv_path: String,

    /// Path to the cleaned CSV produced by the transform stage
    #[serde(rename = "clean-csv-path")]
    pub clean_csv_path: String,

    /// Path to the SQLite database loaded by the transform stage
    #[serde(rename = "database-path")]
    pub database_path: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            raw_json_path: "data/raw_books.json".to_string(),
            raw_csv_path: "data/raw_books.csv".to_string(),
            clean_csv_path: "data/books_clean.csv".to_string(),
            database_path: "data/books.db".to_string(),
        }
    }
}
