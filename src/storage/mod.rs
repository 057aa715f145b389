//! Storage module for persisting page snippets
//!
//! This module handles:
//! - The `SnippetStore` contract consumed by crawl tasks and the control listener
//! - SQLite database initialization and schema management
//! - File-backed and in-memory databases

mod schema;
mod sqlite;
mod traits;

pub use sqlite::SqliteStorage;
pub use traits::{SnippetStore, StorageError, StorageResult};

use crate::config::StorageConfig;
use std::path::Path;
use std::sync::Arc;

/// Opens the snippet store described by the storage configuration
///
/// A configured `database-path` opens (or creates) that file; without one the
/// store lives in memory for the lifetime of the process.
pub fn open_storage(config: &StorageConfig) -> StorageResult<Arc<dyn SnippetStore>> {
    let storage = match &config.database_path {
        Some(path) => {
            tracing::info!("Opening snippet database at {}", path);
            SqliteStorage::new(Path::new(path))?
        }
        None => {
            tracing::info!("No database path configured, keeping snippets in memory");
            SqliteStorage::new_in_memory()?
        }
    };
    Ok(Arc::new(storage))
}
