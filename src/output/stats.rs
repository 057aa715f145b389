//! End-of-run crawl statistics
//!
//! This module provides functionality for collecting and displaying crawl
//! statistics from a finished (or running) crawl.

use crate::crawler::Coordinator;
use crate::CrawldexError;

/// Crawl statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Sites holding a crawl budget slot
    pub sites_scheduled: usize,

    /// Crawl budget
    pub max_sites: usize,

    /// Every scheduled URL, sorted
    pub visited: Vec<String>,

    /// Pages fetched successfully
    pub pages_fetched: usize,

    /// Fetches that failed and were refunded
    pub fetch_failures: usize,

    /// Distinct words in the index
    pub indexed_words: usize,

    /// Snippets held by the store
    pub snippets_stored: u64,
}

/// Collects statistics from a crawl
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully collected statistics
/// * `Err(CrawldexError)` - The snippet store could not be queried
pub fn collect_statistics(coordinator: &Coordinator) -> Result<CrawlStatistics, CrawldexError> {
    let ctx = coordinator.context();
    let frontier = ctx.frontier();

    Ok(CrawlStatistics {
        sites_scheduled: frontier.scheduled_count(),
        max_sites: frontier.max_sites(),
        visited: frontier.visited(),
        pages_fetched: ctx.pages_fetched(),
        fetch_failures: ctx.fetch_failures(),
        indexed_words: ctx.index().len(),
        snippets_stored: ctx.storage().count_snippets()?,
    })
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Crawl Statistics ===\n");

    println!("Overview:");
    println!(
        "  Sites scheduled: {} / {}",
        stats.sites_scheduled, stats.max_sites
    );
    println!("  Pages fetched: {}", stats.pages_fetched);
    println!("  Failed fetches: {}", stats.fetch_failures);
    println!("  Indexed words: {}", stats.indexed_words);
    println!("  Snippets stored: {}", stats.snippets_stored);
    println!();

    if !stats.visited.is_empty() {
        println!("Visited Sites ({}):", stats.visited.len());
        for url in &stats.visited {
            println!("  - {}", url);
        }
        println!();
    }

    let attempted = stats.pages_fetched + stats.fetch_failures;
    let success_rate = if attempted > 0 {
        (stats.pages_fetched as f64 / attempted as f64) * 100.0
    } else {
        0.0
    };

    println!(
        "Success Rate: {:.1}% ({} / {} fetches succeeded)",
        success_rate, stats.pages_fetched, attempted
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CrawlerConfig;
    use crate::storage::{SnippetStore, SqliteStorage};
    use std::sync::Arc;

    #[test]
    fn test_collect_statistics() {
        let storage: Arc<dyn SnippetStore> = Arc::new(SqliteStorage::new_in_memory().unwrap());
        storage.save_snippet("http://a/", "text").unwrap();

        let config = CrawlerConfig {
            max_sites: 7,
            workers: 1,
            ..CrawlerConfig::default()
        };
        let coordinator = Coordinator::new(&config, storage);
        coordinator.index().insert("one", "http://a/", 0);
        coordinator.index().insert("two", "http://a/", 1);
        coordinator.frontier().add_seed("http://a/");

        let stats = collect_statistics(&coordinator).unwrap();
        assert_eq!(stats.sites_scheduled, 1);
        assert_eq!(stats.max_sites, 7);
        assert_eq!(stats.visited, vec!["http://a/".to_string()]);
        assert_eq!(stats.indexed_words, 2);
        assert_eq!(stats.snippets_stored, 1);
        assert_eq!(stats.pages_fetched, 0);

        print_statistics(&stats);
        coordinator.stop_workers();
    }
}
