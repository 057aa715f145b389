//! Crawl frontier: the visited set and the global crawl budget
//!
//! Every URL that is ever scheduled passes through here exactly once. The
//! visited set and the scheduled-site counter share one lock, so the
//! check-increment-mark sequence that admits a URL is a single critical
//! section no matter how many tasks discover links at once.

use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
struct FrontierState {
    visited: HashSet<String>,
    scheduled: usize,
}

/// Outcome of offering a single URL to the frontier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    /// Budget slot consumed and URL marked visited
    Scheduled,
    /// URL was scheduled earlier in this run
    AlreadyVisited,
    /// Crawl budget is exhausted
    AtCapacity,
}

/// Frontier tracks which sites have been scheduled and enforces the cap
pub struct Frontier {
    state: Mutex<FrontierState>,
    max_sites: usize,
}

impl Frontier {
    /// Creates an empty frontier that will schedule at most `max_sites` URLs
    pub fn new(max_sites: usize) -> Self {
        Self {
            state: Mutex::new(FrontierState::default()),
            max_sites,
        }
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Offers one top-level URL (a seed) to the frontier
    ///
    /// Seeds count against the same budget as discovered links.
    pub fn add_seed(&self, url: &str) -> Admission {
        let mut state = self.lock();
        let admission = Self::try_admit(&mut state, url, self.max_sites);
        tracing::debug!("Seed {} -> {:?}", url, admission);
        admission
    }

    /// Admits discovered links under one lock acquisition
    ///
    /// For each link not yet visited, while the budget allows, the counter is
    /// incremented, the link marked visited, and `schedule` called with it
    /// before the lock is released. Returns the number of links scheduled.
    ///
    /// When `schedule` returns false the link is unmarked, its slot returned,
    /// and admission stops. `schedule` runs while the frontier lock is held;
    /// it must not call back into the frontier.
    pub fn admit<'a, I, F>(&self, links: I, mut schedule: F) -> usize
    where
        I: IntoIterator<Item = &'a String>,
        F: FnMut(&str) -> bool,
    {
        let mut state = self.lock();
        let mut admitted = 0;

        for link in links {
            match Self::try_admit(&mut state, link, self.max_sites) {
                Admission::Scheduled => {
                    if !schedule(link) {
                        state.visited.remove(link.as_str());
                        state.scheduled -= 1;
                        tracing::debug!("Could not schedule {}, slot returned", link);
                        break;
                    }
                    admitted += 1;
                }
                Admission::AlreadyVisited => {}
                Admission::AtCapacity => {
                    tracing::trace!("Crawl budget exhausted, dropping {}", link);
                    break;
                }
            }
        }

        admitted
    }

    fn try_admit(state: &mut FrontierState, url: &str, max_sites: usize) -> Admission {
        if state.visited.contains(url) {
            return Admission::AlreadyVisited;
        }
        if state.scheduled >= max_sites {
            return Admission::AtCapacity;
        }
        state.scheduled += 1;
        state.visited.insert(url.to_string());
        tracing::info!("#{} {}", state.scheduled, url);
        Admission::Scheduled
    }

    /// Returns the budget slot held by a URL whose fetch failed
    ///
    /// The URL leaves the visited set, so a later discovery may schedule it
    /// again.
    pub fn refund(&self, url: &str) {
        let mut state = self.lock();
        if state.visited.remove(url) {
            state.scheduled = state.scheduled.saturating_sub(1);
            tracing::debug!("Refunded crawl budget for {}", url);
        }
    }

    /// Number of sites currently holding a budget slot
    pub fn scheduled_count(&self) -> usize {
        self.lock().scheduled
    }

    /// Maximum number of sites that may hold a budget slot
    pub fn max_sites(&self) -> usize {
        self.max_sites
    }

    /// Returns true if the URL currently holds a budget slot
    pub fn is_visited(&self, url: &str) -> bool {
        self.lock().visited.contains(url)
    }

    /// Copy of the visited set, sorted
    pub fn visited(&self) -> Vec<String> {
        let mut visited: Vec<String> = self.lock().visited.iter().cloned().collect();
        visited.sort();
        visited
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn links(urls: &[&str]) -> Vec<String> {
        urls.iter().map(|u| u.to_string()).collect()
    }

    #[test]
    fn test_seed_consumes_budget() {
        let frontier = Frontier::new(2);
        assert_eq!(frontier.add_seed("http://a.b/"), Admission::Scheduled);
        assert_eq!(frontier.scheduled_count(), 1);
        assert!(frontier.is_visited("http://a.b/"));
    }

    #[test]
    fn test_seed_twice_is_already_visited() {
        let frontier = Frontier::new(5);
        frontier.add_seed("http://a.b/");
        assert_eq!(frontier.add_seed("http://a.b/"), Admission::AlreadyVisited);
        assert_eq!(frontier.scheduled_count(), 1);
    }

    #[test]
    fn test_seed_rejected_at_capacity() {
        let frontier = Frontier::new(1);
        frontier.add_seed("http://a.b/");
        assert_eq!(frontier.add_seed("http://c.d/"), Admission::AtCapacity);
    }

    #[test]
    fn test_admit_respects_cap() {
        let frontier = Frontier::new(3);
        frontier.add_seed("http://seed/");

        let found = links(&["http://a/", "http://b/", "http://c/", "http://d/"]);
        let mut scheduled = Vec::new();
        let admitted = frontier.admit(&found, |url| {
            scheduled.push(url.to_string());
            true
        });

        assert_eq!(admitted, 2);
        assert_eq!(scheduled, vec!["http://a/", "http://b/"]);
        assert_eq!(frontier.scheduled_count(), 3);
        assert!(!frontier.is_visited("http://c/"));
    }

    #[test]
    fn test_admit_skips_visited() {
        let frontier = Frontier::new(10);
        frontier.add_seed("http://a/");

        let found = links(&["http://a/", "http://b/"]);
        let mut scheduled = Vec::new();
        frontier.admit(&found, |url| {
            scheduled.push(url.to_string());
            true
        });

        assert_eq!(scheduled, vec!["http://b/"]);
        assert_eq!(frontier.visited(), vec!["http://a/", "http://b/"]);
    }

    #[test]
    fn test_refund_frees_slot() {
        let frontier = Frontier::new(1);
        frontier.add_seed("http://a/");
        frontier.refund("http://a/");

        assert_eq!(frontier.scheduled_count(), 0);
        assert!(!frontier.is_visited("http://a/"));
        assert_eq!(frontier.add_seed("http://b/"), Admission::Scheduled);
    }

    #[test]
    fn test_refund_unknown_url_is_noop() {
        let frontier = Frontier::new(3);
        frontier.add_seed("http://a/");
        frontier.refund("http://never-scheduled/");
        assert_eq!(frontier.scheduled_count(), 1);
    }

    #[test]
    fn test_concurrent_admission_never_exceeds_cap() {
        let frontier = Arc::new(Frontier::new(30));
        let handles: Vec<_> = (0..8)
            .map(|t| {
                let frontier = Arc::clone(&frontier);
                thread::spawn(move || {
                    let found: Vec<String> =
                        (0..50).map(|i| format!("http://h{}/p{}/", t % 3, i)).collect();
                    frontier.admit(&found, |_| true)
                })
            })
            .collect();

        let total: usize = handles.into_iter().map(|h| h.join().unwrap()).sum();
        assert_eq!(total, 30);
        assert_eq!(frontier.scheduled_count(), 30);
        assert_eq!(frontier.visited().len(), 30);
    }

    #[test]
    fn test_admit_returns_slot_when_scheduling_fails() {
        let frontier = Frontier::new(5);
        frontier.add_seed("http://seed/");

        let found = links(&["http://a/", "http://b/"]);
        let admitted = frontier.admit(&found, |_| false);

        assert_eq!(admitted, 0);
        assert_eq!(frontier.scheduled_count(), 1);
        assert_eq!(frontier.visited(), vec!["http://seed/"]);
    }
}
