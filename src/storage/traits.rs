//! Storage traits and error types
//!
//! This module defines the narrow save/get contract the crawler uses to
//! persist page snippets, and the errors a backend can report.

use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Invalid snippet for {url}: {reason}")]
    InvalidSnippet { url: String, reason: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Key-value store for page snippets
///
/// Implementations are shared by every crawl worker and the control listener,
/// so they must be usable from many threads at once.
pub trait SnippetStore: Send + Sync {
    /// Saves the snippet for a URL, replacing any previous one
    fn save_snippet(&self, url: &str, snippet: &str) -> StorageResult<()>;

    /// Gets the snippet saved for a URL, if any
    fn get_snippet(&self, url: &str) -> StorageResult<Option<String>>;

    /// Number of stored snippets
    fn count_snippets(&self) -> StorageResult<u64>;
}
