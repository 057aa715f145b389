use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A search result: one site and its aggregate rank for a query
///
/// Identity is the site alone, so two rankers for the same site compare equal
/// (and hash alike) whatever their ranks. Ordering for display comes from
/// [`compare_rankers`], not from `Ord`.
#[derive(Debug, Clone)]
pub struct SiteRanker {
    site: String,
    rank: usize,
}

impl SiteRanker {
    pub fn new(site: impl Into<String>, rank: usize) -> Self {
        Self {
            site: site.into(),
            rank,
        }
    }

    pub fn site(&self) -> &str {
        &self.site
    }

    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn set_rank(&mut self, rank: usize) {
        self.rank = rank;
    }
}

impl PartialEq for SiteRanker {
    fn eq(&self, other: &Self) -> bool {
        self.site == other.site
    }
}

impl Eq for SiteRanker {}

impl Hash for SiteRanker {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.site.hash(state);
    }
}

impl fmt::Display for SiteRanker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.rank, self.site)
    }
}

/// Result order: higher rank first, ties by ascending site
pub fn compare_rankers(a: &SiteRanker, b: &SiteRanker) -> Ordering {
    b.rank.cmp(&a.rank).then_with(|| a.site.cmp(&b.site))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_equality_ignores_rank() {
        let a = SiteRanker::new("http://a/", 1);
        let b = SiteRanker::new("http://a/", 9);
        assert_eq!(a, b);

        let set: HashSet<SiteRanker> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_set_rank_keeps_identity() {
        let mut ranker = SiteRanker::new("http://a/", 1);
        let before = ranker.clone();
        ranker.set_rank(5);
        assert_eq!(ranker.rank(), 5);
        assert_eq!(ranker, before);
    }

    #[test]
    fn test_compare_orders_by_rank_then_site() {
        let mut rankers = vec![
            SiteRanker::new("http://b/", 2),
            SiteRanker::new("http://c/", 7),
            SiteRanker::new("http://a/", 2),
        ];
        rankers.sort_by(compare_rankers);

        let sites: Vec<&str> = rankers.iter().map(SiteRanker::site).collect();
        assert_eq!(sites, vec!["http://c/", "http://a/", "http://b/"]);
    }

    #[test]
    fn test_display() {
        assert_eq!(SiteRanker::new("http://a/", 3).to_string(), "3 http://a/");
    }
}
