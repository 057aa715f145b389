//! Configuration module for Crawldex
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//! Every key has a default, so an absent file is equivalent to an empty one.
//!
//! # Example
//!
//! ```no_run
//! use crawldex::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("crawldex.toml")).unwrap();
//! println!("Workers: {}", config.crawler.workers);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, ControlConfig, CrawlerConfig, StorageConfig, DEFAULT_CONTROL_BIND,
    DEFAULT_MAX_SITES, DEFAULT_SNIPPET_LENGTH, DEFAULT_WORKERS,
};

// Re-export parser functions
pub use parser::{compute_config_hash, load_config, load_config_with_hash, parse_config};
