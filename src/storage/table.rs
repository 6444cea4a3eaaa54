//! Flat tabular export of the raw dataset

use super::{ensure_parent_dir, io_error, StorageError};
use crate::record::BookRecord;
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

/// Derives the flat tabular sibling of the raw dataset
///
/// The column set is the sorted union of every field key present across all
/// records - open attribute keys included - and a record missing a column
/// renders an empty cell for it. The table is regenerated wholesale from the
/// full accumulator on every call; an empty accumulator writes nothing.
///
/// # Arguments
///
/// * `records` - The full accumulator
/// * `path` - Destination path of the CSV file
pub fn export_table(records: &[BookRecord], path: &Path) -> Result<(), StorageError> {
    if records.is_empty() {
        return Ok(());
    }

    let rows: Vec<BTreeMap<String, String>> = records
        .iter()
        .map(flatten_record)
        .collect::<Result<_, serde_json::Error>>()?;

    let mut columns = BTreeSet::new();
    for row in &rows {
        columns.extend(row.keys().cloned());
    }
    let columns: Vec<String> = columns.into_iter().collect();

    ensure_parent_dir(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;
    for row in &rows {
        let cells: Vec<&str> = columns
            .iter()
            .map(|column| row.get(column).map(String::as_str).unwrap_or(""))
            .collect();
        writer.write_record(cells)?;
    }
    writer.flush().map_err(|e| io_error(path, e))?;

    Ok(())
}

/// Flattens a record to its serialized key/value form, open attributes
/// inlined at the top level
fn flatten_record(record: &BookRecord) -> Result<BTreeMap<String, String>, serde_json::Error> {
    let value = serde_json::to_value(record)?;
    let mut row = BTreeMap::new();

    if let serde_json::Value::Object(fields) = value {
        for (key, field) in fields {
            let cell = match field {
                serde_json::Value::String(s) => s,
                serde_json::Value::Null => String::new(),
                other => other.to_string(),
            };
            row.insert(key, cell);
        }
    }

    Ok(row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{DetailRecord, ListingRecord};
    use tempfile::tempdir;

    fn listing(title: &str, url: &str) -> ListingRecord {
        ListingRecord {
            title: title.to_string(),
            product_page_url: url.to_string(),
            price_text: "£10.00".to_string(),
            availability_text: "In stock".to_string(),
            rating_text: "Two".to_string(),
            image_url: "http://example.com/img.jpg".to_string(),
        }
    }

    #[test]
    fn test_empty_accumulator_writes_nothing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_books.csv");

        export_table(&[], &path).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn test_columns_are_sorted_union_of_all_keys() {
        let mut first_attrs = std::collections::BTreeMap::new();
        first_attrs.insert("UPC".to_string(), "abc".to_string());

        let mut second_attrs = std::collections::BTreeMap::new();
        second_attrs.insert("Product Type".to_string(), "Books".to_string());

        let records = vec![
            BookRecord::merge(
                listing("A", "http://example.com/a"),
                Some(DetailRecord {
                    category: Some("Poetry".to_string()),
                    description: "first".to_string(),
                    attributes: first_attrs,
                    fetched_url: "http://example.com/a".to_string(),
                }),
            ),
            BookRecord::merge(
                listing("B", "http://example.com/b"),
                Some(DetailRecord {
                    category: None,
                    description: "second".to_string(),
                    attributes: second_attrs,
                    fetched_url: "http://example.com/b".to_string(),
                }),
            ),
        ];

        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_books.csv");
        export_table(&records, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();

        // Sorted union: open keys from both records plus the fixed fields
        // that were present on at least one of them.
        let mut sorted = header.clone();
        sorted.sort_unstable();
        assert_eq!(header, sorted);
        assert!(header.contains(&"UPC"));
        assert!(header.contains(&"Product Type"));
        assert!(header.contains(&"category"));
        assert!(header.contains(&"title"));

        // Record B has no category and no UPC: those cells are empty.
        let upc_idx = header.iter().position(|c| *c == "UPC").unwrap();
        let category_idx = header.iter().position(|c| *c == "category").unwrap();
        let first_row: Vec<&str> = lines.next().unwrap().split(',').collect();
        let second_row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(first_row[upc_idx], "abc");
        assert_eq!(second_row[upc_idx], "");
        assert_eq!(first_row[category_idx], "Poetry");
        assert_eq!(second_row[category_idx], "");
    }

    #[test]
    fn test_record_without_detail_renders_empty_cells() {
        let records = vec![
            BookRecord::merge(
                listing("A", "http://example.com/a"),
                Some(DetailRecord {
                    category: Some("Poetry".to_string()),
                    description: "text".to_string(),
                    attributes: std::collections::BTreeMap::new(),
                    fetched_url: "http://example.com/a".to_string(),
                }),
            ),
            BookRecord::merge(listing("B", "http://example.com/b"), None),
        ];

        let dir = tempdir().unwrap();
        let path = dir.path().join("raw_books.csv");
        export_table(&records, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let header: Vec<&str> = lines.next().unwrap().split(',').collect();
        let fetched_idx = header.iter().position(|c| *c == "fetched_url").unwrap();

        let _first = lines.next().unwrap();
        let second_row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(second_row[fetched_idx], "");
    }
}
