//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the SnippetStore trait.

use crate::storage::schema::initialize_schema;
use crate::storage::traits::{SnippetStore, StorageError, StorageResult};
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// SQLite storage backend
///
/// One connection behind a mutex; every statement is short, so workers simply
/// take turns.
pub struct SqliteStorage {
    conn: Mutex<Connection>,
}

impl SqliteStorage {
    /// Opens or creates a database file
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl SnippetStore for SqliteStorage {
    fn save_snippet(&self, url: &str, snippet: &str) -> StorageResult<()> {
        if url.is_empty() {
            return Err(StorageError::InvalidSnippet {
                url: url.to_string(),
                reason: "empty URL".to_string(),
            });
        }

        let now = Utc::now().to_rfc3339();
        self.conn().execute(
            "INSERT INTO snippets (url, snippet, saved_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(url) DO UPDATE SET snippet = excluded.snippet, saved_at = excluded.saved_at",
            params![url, snippet, now],
        )?;
        tracing::debug!("Saved snippet for {}", url);
        Ok(())
    }

    fn get_snippet(&self, url: &str) -> StorageResult<Option<String>> {
        let snippet = self
            .conn()
            .query_row(
                "SELECT snippet FROM snippets WHERE url = ?1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(snippet)
    }

    fn count_snippets(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn()
            .query_row("SELECT COUNT(*) FROM snippets", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;
    use tempfile::TempDir;

    #[test]
    fn test_create_in_memory() {
        assert!(SqliteStorage::new_in_memory().is_ok());
    }

    #[test]
    fn test_save_and_get_snippet() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        storage.save_snippet("http://a.b/", "Hello world").unwrap();

        assert_eq!(
            storage.get_snippet("http://a.b/").unwrap(),
            Some("Hello world".to_string())
        );
    }

    #[test]
    fn test_missing_snippet_is_none() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert_eq!(storage.get_snippet("http://nowhere/").unwrap(), None);
    }

    #[test]
    fn test_resave_replaces_snippet() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        storage.save_snippet("http://a.b/", "first").unwrap();
        storage.save_snippet("http://a.b/", "second").unwrap();

        assert_eq!(
            storage.get_snippet("http://a.b/").unwrap(),
            Some("second".to_string())
        );
        assert_eq!(storage.count_snippets().unwrap(), 1);
    }

    #[test]
    fn test_empty_url_rejected() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        assert!(matches!(
            storage.save_snippet("", "text"),
            Err(StorageError::InvalidSnippet { .. })
        ));
    }

    #[test]
    fn test_saved_at_is_rfc3339() {
        let storage = SqliteStorage::new_in_memory().unwrap();
        storage.save_snippet("http://a.b/", "x").unwrap();

        let saved_at: String = storage
            .conn()
            .query_row(
                "SELECT saved_at FROM snippets WHERE url = ?1",
                params!["http://a.b/"],
                |row| row.get(0),
            )
            .unwrap();
        assert!(chrono::DateTime::parse_from_rfc3339(&saved_at).is_ok());
    }

    #[test]
    fn test_file_database_persists() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("crawldex.db");

        {
            let storage = SqliteStorage::new(&path).unwrap();
            storage.save_snippet("http://a.b/", "kept").unwrap();
        }

        let storage = SqliteStorage::new(&path).unwrap();
        assert_eq!(storage.get_snippet("http://a.b/").unwrap(), Some("kept".to_string()));
    }

    #[test]
    fn test_concurrent_saves() {
        let storage = Arc::new(SqliteStorage::new_in_memory().unwrap());
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let storage = Arc::clone(&storage);
                thread::spawn(move || {
                    for i in 0..10 {
                        let url = format!("http://s{}/p{}/", t, i);
                        storage.save_snippet(&url, "text").unwrap();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(storage.count_snippets().unwrap(), 40);
    }
}
