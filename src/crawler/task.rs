//! The unit of work executed by a pool worker
//!
//! A crawl task owns one pre-canonicalized URL and runs these steps in order:
//! 1. Fetch the page; on failure refund the budget slot and stop
//! 2. Extract and deduplicate outbound links
//! 3. Admit new links under the frontier lock, submitting a task for each
//! 4. Strip markup to plain text
//! 5. Save a snippet of the text (failures are logged only)
//! 6. Tokenize and index every word with its position

use crate::crawler::coordinator::CrawlContext;
use crate::crawler::fetcher::fetch_with;
use crate::crawler::parser::{extract_links, make_snippet, strip_markup, tokenize};
use crate::url::{canonicalize_trailing_slash, StructuredUrl};
use crate::CrawldexError;
use std::collections::HashSet;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// A single URL to crawl, bound to the context it reports into
pub struct CrawlTask {
    url: String,
    ctx: Arc<CrawlContext>,
}

impl CrawlTask {
    /// Creates a task for a URL that has already been admitted by the frontier
    pub fn new(url: impl Into<String>, ctx: Arc<CrawlContext>) -> Self {
        Self {
            url: url.into(),
            ctx,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// Hands the task to the work queue
    ///
    /// Fails with [`CrawldexError::ShuttingDown`] once the workers have
    /// stopped.
    pub fn submit(self) -> Result<(), CrawldexError> {
        let ctx = Arc::clone(&self.ctx);
        ctx.queue().submit(move || self.run())
    }

    /// Runs every crawl step for this URL
    ///
    /// Only a failed fetch returns an error, after refunding the URL's budget
    /// slot. Later steps cannot fail; a snippet that cannot be saved is logged
    /// and skipped.
    pub fn run(self) -> Result<(), CrawldexError> {
        let ctx = &self.ctx;
        tracing::debug!("Starting on {}", self.url);

        let page = StructuredUrl::parse(&self.url);
        let html = match fetch_with(&page, ctx.request_builder()) {
            Ok(html) => html,
            Err(e) => {
                tracing::debug!("{} not fetched, refunding budget slot", self.url);
                ctx.frontier().refund(&self.url);
                ctx.fetch_failures.fetch_add(1, Ordering::Relaxed);
                return Err(e.into());
            }
        };
        ctx.pages_fetched.fetch_add(1, Ordering::Relaxed);

        let links: HashSet<String> = extract_links(&html, &self.url)
            .iter()
            .map(|link| canonicalize_trailing_slash(link))
            .collect();

        let admitted = ctx
            .frontier()
            .admit(&links, |link| CrawlTask::new(link, Arc::clone(ctx)).submit().is_ok());
        tracing::debug!(
            "{}: {} distinct links, {} scheduled",
            self.url,
            links.len(),
            admitted
        );

        let text = strip_markup(&html);

        if let Some(snippet) = make_snippet(&text, ctx.snippet_length()) {
            if let Err(e) = ctx.storage().save_snippet(&self.url, &snippet) {
                tracing::warn!("Failed to save snippet for {}: {}", self.url, e);
            }
        }

        let index = ctx.index();
        let mut indexed = 0;
        for (position, word) in tokenize(&text).iter().enumerate() {
            tracing::trace!("{} #{}: {}", self.url, position, word);
            index.insert(word, &self.url, position);
            indexed += 1;
        }
        tracing::debug!("Indexed {} words from {}", indexed, self.url);

        Ok(())
    }
}
