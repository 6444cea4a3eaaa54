//! Configuration module for bookharvest
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Every setting has a default, so the crawler also runs with no
//! config file at all.
//!
//! # Example
//!
//! ```no_run
//! use bookharvest::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("config.toml")).unwrap();
//! println!("Crawling up to {} pages", config.crawler.max_pages);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetchConfig, OutputConfig, PolitenessConfig, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash};

// Re-export validation for callers that build a Config in code
pub use validation::validate;
