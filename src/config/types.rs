use serde::Deserialize;

/// Default crawl budget (MAXSITES)
pub const DEFAULT_MAX_SITES: usize = 30;

/// Default worker pool size
pub const DEFAULT_WORKERS: usize = 10;

/// Default snippet length in characters
pub const DEFAULT_SNIPPET_LENGTH: usize = 254;

/// Default control listener address
pub const DEFAULT_CONTROL_BIND: &str = "127.0.0.1:8080";

/// Main configuration structure for Crawldex
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub control: ControlConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Maximum number of sites ever scheduled in one run, seed included
    #[serde(rename = "max-sites", default = "default_max_sites")]
    pub max_sites: usize,

    /// Number of worker threads draining the task queue
    #[serde(default = "default_workers")]
    pub workers: usize,

    /// Length of the stored page snippet, in characters
    #[serde(rename = "snippet-length", default = "default_snippet_length")]
    pub snippet_length: usize,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_sites: DEFAULT_MAX_SITES,
            workers: DEFAULT_WORKERS,
            snippet_length: DEFAULT_SNIPPET_LENGTH,
        }
    }
}

/// Snippet storage configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file; in-memory when absent
    #[serde(rename = "database-path")]
    pub database_path: Option<String>,
}

/// Administrative control listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ControlConfig {
    /// Address the control listener binds to
    #[serde(default = "default_control_bind")]
    pub bind: String,
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            bind: default_control_bind(),
        }
    }
}

fn default_max_sites() -> usize {
    DEFAULT_MAX_SITES
}

fn default_workers() -> usize {
    DEFAULT_WORKERS
}

fn default_snippet_length() -> usize {
    DEFAULT_SNIPPET_LENGTH
}

fn default_control_bind() -> String {
    DEFAULT_CONTROL_BIND.to_string()
}
