//! Inverted index over crawled pages
//!
//! Maps each word to the sites containing it, and each site to the ordered
//! positions at which the word occurs there. A single instance is created at
//! startup and shared by every crawl task (writers) and every search (readers).

mod lock;

pub use lock::{ReadGuard, ReadWriteLock, WriteGuard};

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// word -> site -> occurrence positions
type WordMap = HashMap<String, HashMap<String, Vec<usize>>>;

/// Thread-safe word-level inverted index
///
/// Each method takes the lock once, so a single insert or lookup is atomic,
/// but a sequence of calls is not a consistent snapshot while crawling is
/// still running.
#[derive(Default)]
pub struct InvertedIndex {
    words: ReadWriteLock<WordMap>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        tracing::debug!("Building inverted index");
        Self::default()
    }

    /// Records that `word` occurs in `site` at `position`
    ///
    /// Positions for one (word, site) pair are expected in increasing order;
    /// they are appended as given and never rewritten.
    pub fn insert(&self, word: &str, site: &str, position: usize) {
        let mut words = self.words.acquire_write();
        words
            .entry(word.to_string())
            .or_default()
            .entry(site.to_string())
            .or_default()
            .push(position);
    }

    /// All indexed words
    pub fn words(&self) -> HashSet<String> {
        self.words.acquire_read().keys().cloned().collect()
    }

    /// Sites containing `word`; empty if the word is not indexed
    pub fn sites_for(&self, word: &str) -> HashSet<String> {
        self.words
            .acquire_read()
            .get(word)
            .map(|sites| sites.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of occurrences of `word` in `site`
    pub fn rank(&self, word: &str, site: &str) -> usize {
        self.words
            .acquire_read()
            .get(word)
            .and_then(|sites| sites.get(site))
            .map_or(0, Vec::len)
    }

    /// Occurrence positions of `word` in `site`, in insertion order
    pub fn positions(&self, word: &str, site: &str) -> Vec<usize> {
        self.words
            .acquire_read()
            .get(word)
            .and_then(|sites| sites.get(site))
            .cloned()
            .unwrap_or_default()
    }

    /// Number of distinct indexed words
    pub fn len(&self) -> usize {
        self.words.acquire_read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Writes a human-readable dump of the whole index
    ///
    /// One block per word, words and sites sorted:
    ///
    /// ```text
    /// word
    /// "http://site/", 0, 7
    ///
    /// ```
    pub fn write_dump<W: Write>(&self, out: &mut W) -> io::Result<()> {
        let words = self.words.acquire_read();

        let mut sorted_words: Vec<&String> = words.keys().collect();
        sorted_words.sort();

        for word in sorted_words {
            writeln!(out, "{}", word)?;

            let sites = &words[word];
            let mut sorted_sites: Vec<&String> = sites.keys().collect();
            sorted_sites.sort();

            for site in sorted_sites {
                write!(out, "\"{}\"", site)?;
                for position in &sites[site] {
                    write!(out, ", {}", position)?;
                }
                writeln!(out)?;
            }
            writeln!(out)?;
        }

        out.flush()
    }

    /// Writes the dump to a file, replacing any existing content
    pub fn dump_to_file(&self, path: &Path) -> io::Result<()> {
        let mut out = BufWriter::new(File::create(path)?);
        self.write_dump(&mut out)?;
        tracing::info!("Wrote index dump to {}", path.display());
        Ok(())
    }
}
