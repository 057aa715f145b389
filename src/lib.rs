//! Crawldex: a bounded crawler with an in-memory inverted index
//!
//! This crate crawls a capped set of pages reachable from a seed URL over a
//! fixed worker pool, indexes every word of their text by position, and
//! answers ranked exact or prefix keyword queries against that index.

pub mod config;
pub mod control;
pub mod crawler;
pub mod index;
pub mod output;
pub mod search;
pub mod storage;
pub mod url;

use thiserror::Error;

/// Main error type for Crawldex operations
#[derive(Debug, Error)]
pub enum CrawldexError {
    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),

    #[error("Invalid seed URL: {0}")]
    InvalidSeed(String),

    #[error("Failed to bind control listener on {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Crawler is shutting down; no new work is accepted")]
    ShuttingDown,

    #[error("Crawl task panicked: {0}")]
    TaskPanicked(String),

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

    #[error("Invalid bind address: {0}")]
    InvalidAddress(String),
}

/// Page fetch errors
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("No domain or path to fetch for {url}")]
    MissingComponents { url: String },

    #[error("Failed to connect to {addr}: {source}")]
    Connect {
        addr: String,
        source: std::io::Error,
    },

    #[error("IO error while fetching {url}: {source}")]
    Io {
        url: String,
        source: std::io::Error,
    },

    #[error("Bad response for {url}: {status}")]
    BadStatus { url: String, status: String },
}

/// Result type alias for Crawldex operations
pub type Result<T> = std::result::Result<T, CrawldexError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for fetch operations
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{Coordinator, CrawlTask, Frontier, WorkQueue};
pub use index::{InvertedIndex, ReadWriteLock};
pub use search::{normalize_query, search, SearchMode, SiteRanker};
pub use storage::{SnippetStore, SqliteStorage};
pub use crate::url::{canonicalize_trailing_slash, is_likely_html, StructuredUrl};
