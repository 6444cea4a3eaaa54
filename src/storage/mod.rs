//! Storage module for the durable raw dataset
//!
//! This module handles persistence of crawl progress, including:
//! - Loading an existing checkpoint as the initial accumulator
//! - Saving checkpoint snapshots via atomic temp-write + rename
//! - Deriving the flat tabular export with union-of-keys columns

mod checkpoint;
mod table;

pub use checkpoint::{load_checkpoint, save_checkpoint};
pub use table::export_table;

use std::path::Path;
use thiserror::Error;

/// Storage-specific errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error for {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV export error: {0}")]
    Csv(#[from] csv::Error),
}

pub(crate) fn io_error(path: &Path, source: std::io::Error) -> StorageError {
    StorageError::Io {
        path: path.display().to_string(),
        source,
    }
}

/// Creates the parent directory of an output path when needed
pub(crate) fn ensure_parent_dir(path: &Path) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| io_error(parent, e))?;
        }
    }
    Ok(())
}
