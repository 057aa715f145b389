//! Ranked keyword search over the inverted index
//!
//! A query is a list of whitespace-separated terms. Each term is matched
//! against the indexed words either exactly or as a prefix, and every match
//! adds the word's occurrence count at a site to that site's rank.

mod ranker;

pub use ranker::{compare_rankers, SiteRanker};

use crate::index::InvertedIndex;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// How query terms are matched against indexed words
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchMode {
    /// The indexed word must equal the term
    Exact,
    /// The indexed word must start with the term
    #[default]
    Prefix,
}

impl SearchMode {
    fn matches(self, word: &str, term: &str) -> bool {
        match self {
            SearchMode::Exact => word == term,
            SearchMode::Prefix => word.starts_with(term),
        }
    }
}

impl fmt::Display for SearchMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchMode::Exact => write!(f, "exact"),
            SearchMode::Prefix => write!(f, "prefix"),
        }
    }
}

impl FromStr for SearchMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "exact" => Ok(SearchMode::Exact),
            "prefix" | "partial" => Ok(SearchMode::Prefix),
            other => Err(format!("unknown search mode: {}", other)),
        }
    }
}

/// Normalizes raw user input into a query string
///
/// Lowercases, trims, and drops every character that is not an ASCII letter,
/// digit or space.
pub fn normalize_query(raw: &str) -> String {
    raw.to_lowercase()
        .trim()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect()
}

/// Runs a normalized query against the index
///
/// The sorted word list is rebuilt on every call. For each term, the run of
/// words sharing its first character is located by binary search and scanned
/// for matches. Ranks add up across every matching word and every term, so a
/// repeated term counts twice.
///
/// Results are ordered by descending rank, ties by ascending site.
///
/// # Example
///
/// ```
/// use crawldex::index::InvertedIndex;
/// use crawldex::search::{search, SearchMode};
///
/// let index = InvertedIndex::new();
/// index.insert("cat", "http://a/", 0);
/// index.insert("car", "http://a/", 1);
///
/// let results = search(&index, "ca", SearchMode::Prefix);
/// assert_eq!(results[0].rank(), 2);
/// ```
pub fn search(index: &InvertedIndex, query: &str, mode: SearchMode) -> Vec<SiteRanker> {
    let mut words: Vec<String> = index.words().into_iter().collect();
    words.sort();

    let mut ranks: HashMap<String, usize> = HashMap::new();

    for term in query.split_whitespace() {
        let Some(first) = term.chars().next() else {
            continue;
        };
        let mut buf = [0u8; 4];
        let letter: &str = first.encode_utf8(&mut buf);

        let start = words.partition_point(|word| word.as_str() < letter);
        let run = words[start..]
            .iter()
            .take_while(|word| word.starts_with(letter));

        for word in run.filter(|word| mode.matches(word, term)) {
            for site in index.sites_for(word) {
                let rank = index.rank(word, &site);
                *ranks.entry(site).or_insert(0) += rank;
            }
        }
        tracing::trace!("After term '{}': {} sites", term, ranks.len());
    }

    let mut results: Vec<SiteRanker> = ranks
        .into_iter()
        .map(|(site, rank)| SiteRanker::new(site, rank))
        .collect();
    results.sort_by(compare_rankers);

    tracing::debug!("{} search '{}': {} results", mode, query, results.len());
    results
}
