//! Checkpoint snapshots: durable, atomic persistence of the accumulator

use super::{ensure_parent_dir, io_error, StorageError};
use crate::record::BookRecord;
use std::fs;
use std::path::{Path, PathBuf};

/// Loads a checkpoint snapshot as an accumulator
///
/// # Arguments
///
/// * `path` - Path to the checkpoint file
///
/// # Returns
///
/// * `Ok(Vec<BookRecord>)` - The deserialized accumulator
/// * `Err(StorageError)` - The file is missing, unreadable, or not valid
///   JSON (callers typically log this and start fresh)
pub fn load_checkpoint(path: &Path) -> Result<Vec<BookRecord>, StorageError> {
    let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
    Ok(serde_json::from_str(&content)?)
}

/// Saves the full accumulator as a checkpoint snapshot
///
/// The snapshot is serialized to a sibling temporary path first and then
/// renamed over the destination. Rename within one directory is atomic, so
/// the destination always holds a complete snapshot: a crash between the
/// temp write and the rename leaves the previous snapshot untouched.
///
/// # Arguments
///
/// * `records` - The accumulator to persist
/// * `path` - Destination path of the checkpoint file
pub fn save_checkpoint(records: &[BookRecord], path: &Path) -> Result<(), StorageError> {
    ensure_parent_dir(path)?;

    let json = serde_json::to_string_pretty(records)?;
    let tmp = tmp_path(path);
    fs::write(&tmp, json).map_err(|e| io_error(&tmp, e))?;
    fs::rename(&tmp, path).map_err(|e| io_error(path, e))?;

    Ok(())
}

/// Sibling temporary path: `raw_books.json` becomes `raw_books.json.tmp`
fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(title: &str, url: &str) -> BookRecord {
        BookRecord {
            title: title.to_string(),
            product_page_url: url.to_string(),
            ..BookRecord::default()
        }
    }

    #[test]
    fn test_save_and_load_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_books.json");

        let records = vec![
            record("A", "http://example.com/a"),
            record("B", "http://example.com/b"),
        ];
        save_checkpoint(&records, &path).unwrap();

        let loaded = load_checkpoint(&path).unwrap();
        assert_eq!(loaded, records);
    }

    #[test]
    fn test_save_creates_missing_parent_dirs() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join("raw_books.json");

        save_checkpoint(&[record("A", "http://example.com/a")], &path).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_save_leaves_no_temp_file_behind() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_books.json");

        save_checkpoint(&[record("A", "http://example.com/a")], &path).unwrap();
        assert!(!path.with_file_name("raw_books.json.tmp").exists());
    }

    #[test]
    fn test_crash_before_rename_keeps_previous_snapshot() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_books.json");

        let committed = vec![record("A", "http://example.com/a")];
        save_checkpoint(&committed, &path).unwrap();

        // Simulated crash: the next snapshot reached the temp sibling but
        // the rename never happened.
        fs::write(path.with_file_name("raw_books.json.tmp"), "{ truncated").unwrap();

        let loaded = load_checkpoint(&path).unwrap();
        assert_eq!(loaded, committed);
    }

    #[test]
    fn test_load_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        assert!(load_checkpoint(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn test_load_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_books.json");
        fs::write(&path, "not json at all").unwrap();
        assert!(matches!(
            load_checkpoint(&path),
            Err(StorageError::Json(_))
        ));
    }

    #[test]
    fn test_empty_accumulator_saves_as_empty_array() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_books.json");

        save_checkpoint(&[], &path).unwrap();
        assert_eq!(load_checkpoint(&path).unwrap(), Vec::<BookRecord>::new());
    }
}
