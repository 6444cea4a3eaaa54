//! SQLite load for the cleaned dataset

use super::CleanBook;
use crate::HarvestError;
use rusqlite::{params, Connection};
use std::path::Path;

/// Replaces the `books` table with the cleaned rows
///
/// The table is dropped and recreated wholesale each run, then indexed on
/// category and price for the downstream readers that filter and aggregate
/// on those columns.
///
/// # Arguments
///
/// * `rows` - The cleaned dataset
/// * `path` - Path to the SQLite database file
pub fn load_sqlite(rows: &[CleanBook], path: &Path) -> Result<(), HarvestError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let mut conn = Connection::open(path)?;

    conn.execute_batch(
        "DROP TABLE IF EXISTS books;
         CREATE TABLE books (
             title TEXT,
             product_page_url TEXT,
             category TEXT,
             price REAL,
             availability INTEGER,
             rating INTEGER,
             description TEXT,
             image_url TEXT
         );",
    )?;

    let tx = conn.transaction()?;
    {
        let mut stmt = tx.prepare(
            "INSERT INTO books
             (title, product_page_url, category, price, availability, rating, description, image_url)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        )?;
        for row in rows {
            stmt.execute(params![
                row.title,
                row.product_page_url,
                row.category,
                row.price,
                row.availability,
                row.rating,
                row.description,
                row.image_url,
            ])?;
        }
    }
    tx.commit()?;

    conn.execute_batch(
        "CREATE INDEX IF NOT EXISTS idx_category ON books(category);
         CREATE INDEX IF NOT EXISTS idx_price ON books(price);",
    )?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clean_row(title: &str, url: &str, price: Option<f64>) -> CleanBook {
        CleanBook {
            title: title.to_string(),
            product_page_url: url.to_string(),
            category: Some("Poetry".to_string()),
            price,
            availability: 22,
            rating: Some(3),
            description: Some("desc".to_string()),
            image_url: "http://example.com/img.jpg".to_string(),
        }
    }

    #[test]
    fn test_load_creates_table_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");

        let rows = vec![
            clean_row("a", "http://example.com/a", Some(51.77)),
            clean_row("b", "http://example.com/b", None),
        ];
        load_sqlite(&rows, &path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM books", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 2);

        let price: Option<f64> = conn
            .query_row(
                "SELECT price FROM books WHERE product_page_url = ?1",
                ["http://example.com/b"],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(price, None);
    }

    #[test]
    fn test_reload_replaces_previous_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");

        load_sqlite(
            &[
                clean_row("a", "http://example.com/a", Some(1.0)),
                clean_row("b", "http://example.com/b", Some(2.0)),
            ],
            &path,
        )
        .unwrap();
        load_sqlite(&[clean_row("c", "http://example.com/c", Some(3.0))], &path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM books", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_indexes_exist() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("books.db");
        load_sqlite(&[clean_row("a", "http://example.com/a", Some(1.0))], &path).unwrap();

        let conn = Connection::open(&path).unwrap();
        let indexes: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'index' AND name IN ('idx_category', 'idx_price')",
                [],
                |r| r.get(0),
            )
            .unwrap();
        assert_eq!(indexes, 2);
    }
}
