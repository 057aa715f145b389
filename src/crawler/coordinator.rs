//! Crawler coordinator - process-wide crawl context
//!
//! This module owns the single instances every crawl task and search shares:
//! - The inverted index
//! - The frontier (visited set and crawl budget)
//! - The work queue and its worker threads
//! - The snippet store
//!
//! They are built once, before any worker starts, and handed to tasks through
//! an `Arc<CrawlContext>`.

use crate::config::CrawlerConfig;
use crate::crawler::fetcher::{html_request, RequestBuilder};
use crate::crawler::frontier::{Admission, Frontier};
use crate::crawler::scheduler::WorkQueue;
use crate::crawler::task::CrawlTask;
use crate::index::InvertedIndex;
use crate::storage::SnippetStore;
use crate::url::{canonicalize_trailing_slash, is_likely_html, StructuredUrl};
use crate::CrawldexError;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared state reachable from every crawl task
pub struct CrawlContext {
    index: Arc<InvertedIndex>,
    frontier: Frontier,
    storage: Arc<dyn SnippetStore>,
    queue: WorkQueue,
    request_builder: RequestBuilder,
    snippet_length: usize,
    pub(crate) pages_fetched: AtomicUsize,
    pub(crate) fetch_failures: AtomicUsize,
}

impl CrawlContext {
    pub fn index(&self) -> &Arc<InvertedIndex> {
        &self.index
    }

    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    pub fn storage(&self) -> &Arc<dyn SnippetStore> {
        &self.storage
    }

    pub fn queue(&self) -> &WorkQueue {
        &self.queue
    }

    pub fn request_builder(&self) -> RequestBuilder {
        self.request_builder
    }

    pub fn snippet_length(&self) -> usize {
        self.snippet_length
    }

    /// Pages fetched successfully so far
    pub fn pages_fetched(&self) -> usize {
        self.pages_fetched.load(Ordering::Relaxed)
    }

    /// Fetches that failed and were refunded
    pub fn fetch_failures(&self) -> usize {
        self.fetch_failures.load(Ordering::Relaxed)
    }
}

/// Main crawler coordinator structure
///
/// Cheap to clone; every clone drives the same crawl.
#[derive(Clone)]
pub struct Coordinator {
    ctx: Arc<CrawlContext>,
}

impl Coordinator {
    /// Creates the crawl context and starts the worker pool
    ///
    /// # Arguments
    ///
    /// * `config` - Crawl budget, pool size and snippet length
    /// * `storage` - Where page snippets are saved
    pub fn new(config: &CrawlerConfig, storage: Arc<dyn SnippetStore>) -> Self {
        Self::with_request_builder(config, storage, html_request)
    }

    /// Like [`Coordinator::new`], fetching pages with a custom request builder
    pub fn with_request_builder(
        config: &CrawlerConfig,
        storage: Arc<dyn SnippetStore>,
        request_builder: RequestBuilder,
    ) -> Self {
        tracing::info!(
            "Starting crawler: {} workers, at most {} sites",
            config.workers,
            config.max_sites
        );

        let ctx = CrawlContext {
            index: Arc::new(InvertedIndex::new()),
            frontier: Frontier::new(config.max_sites),
            storage,
            queue: WorkQueue::new(config.workers),
            request_builder,
            snippet_length: config.snippet_length,
            pages_fetched: AtomicUsize::new(0),
            fetch_failures: AtomicUsize::new(0),
        };

        Self { ctx: Arc::new(ctx) }
    }

    /// Adds a top-level URL to the crawl
    ///
    /// The URL is canonicalized and must be a valid, likely-HTML URL. It then
    /// competes for the crawl budget like any discovered link; a crawl task is
    /// submitted only if it is admitted. Once the workers have stopped every
    /// seed is rejected with [`CrawldexError::ShuttingDown`].
    pub fn add_seed(&self, raw: &str) -> Result<Admission, CrawldexError> {
        let url = canonicalize_trailing_slash(raw.trim());
        if !StructuredUrl::parse(&url).is_valid() || !is_likely_html(&url) {
            return Err(CrawldexError::InvalidSeed(raw.to_string()));
        }
        if self.ctx.queue.is_stopped() {
            return Err(CrawldexError::ShuttingDown);
        }

        let admission = self.ctx.frontier.add_seed(&url);
        if admission == Admission::Scheduled {
            // Workers may stop between the check above and here
            if let Err(e) = CrawlTask::new(url.clone(), Arc::clone(&self.ctx)).submit() {
                self.ctx.frontier.refund(&url);
                return Err(e);
            }
        }
        Ok(admission)
    }

    /// Blocks until no task is queued or running
    pub fn await_quiescence(&self) {
        self.ctx.queue.await_quiescence();
    }

    pub fn is_quiescent(&self) -> bool {
        self.ctx.queue.is_quiescent()
    }

    /// Stops the worker pool; call only after quiescence
    pub fn stop_workers(&self) {
        self.ctx.queue.stop_workers();
    }

    /// Waits for quiescence, then stops the workers
    pub fn drain(&self) {
        tracing::info!("Waiting for in-flight crawl tasks to finish");
        self.await_quiescence();
        self.stop_workers();
        tracing::info!(
            "Crawl finished: {} pages fetched, {} failed",
            self.ctx.pages_fetched(),
            self.ctx.fetch_failures()
        );
    }

    pub fn context(&self) -> &Arc<CrawlContext> {
        &self.ctx
    }

    pub fn index(&self) -> &Arc<InvertedIndex> {
        &self.ctx.index
    }

    pub fn frontier(&self) -> &Frontier {
        &self.ctx.frontier
    }

    pub fn storage(&self) -> &Arc<dyn SnippetStore> {
        &self.ctx.storage
    }
}
