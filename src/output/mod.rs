//! Output module for end-of-run reporting
//!
//! This module handles:
//! - Printing crawl statistics
//! - Writing the optional diagnostic index dump

pub mod stats;

pub use stats::{collect_statistics, print_statistics, CrawlStatistics};

use crate::crawler::Coordinator;
use crate::CrawldexError;
use std::path::Path;

/// Writes the reports for a finished crawl
///
/// # Arguments
///
/// * `coordinator` - The drained crawl
/// * `dump_path` - Where to write the index dump, if requested
pub fn write_reports(
    coordinator: &Coordinator,
    dump_path: Option<&Path>,
) -> Result<CrawlStatistics, CrawldexError> {
    if let Some(path) = dump_path {
        coordinator.index().dump_to_file(path)?;
    }

    let stats = collect_statistics(coordinator)?;
    tracing::info!(
        "{} sites scheduled, {} words indexed",
        stats.sites_scheduled,
        stats.indexed_words
    );
    Ok(stats)
}
