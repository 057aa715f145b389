//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Raw-socket page fetching
//! - HTML link extraction and text stripping
//! - The bounded worker pool and its task queue
//! - The frontier enforcing the crawl budget
//! - Per-page crawl tasks and overall crawl coordination

mod coordinator;
mod fetcher;
mod frontier;
mod parser;
mod scheduler;
mod task;

pub use coordinator::{CrawlContext, Coordinator};
pub use fetcher::{fetch, fetch_with, html_request, RequestBuilder, DEFAULT_PORT};
pub use frontier::{Admission, Frontier};
pub use parser::{decode_entities, extract_links, make_snippet, strip_markup, tokenize};
pub use scheduler::{Job, WorkQueue};
pub use task::CrawlTask;

#[cfg(test)]
pub(crate) mod testing {
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread;

    /// Serves the same raw response to every connection on a loopback port
    ///
    /// Returns the `host:port` authority. The listener thread lives until the
    /// test binary exits.
    pub fn serve_forever(response: String) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();

        thread::spawn(move || {
            for stream in listener.incoming() {
                let Ok(mut stream) = stream else { continue };
                let mut reader = BufReader::new(stream.try_clone().unwrap());
                let mut line = String::new();
                while reader.read_line(&mut line).unwrap_or(0) > 0 && line != "\r\n" {
                    line.clear();
                }
                let _ = stream.write_all(response.as_bytes());
            }
        });

        format!("127.0.0.1:{}", port)
    }
}
