//! Control command parsing and execution
//!
//! Commands are single lines: a case-insensitive verb, then an argument that
//! runs to the end of the line.

use crate::control::ControlError;
use crate::crawler::{Admission, Coordinator};
use crate::search::{normalize_query, search, SearchMode};
use crate::CrawldexError;
use std::str::FromStr;

/// Marks the end of a multi-line response
pub const END_MARKER: &str = "END";

/// A parsed control command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add a top-level URL to the crawl
    Seed(String),
    /// Run a query in the given mode
    Search { query: String, mode: SearchMode },
    /// Look up a stored snippet
    Snippet(String),
    /// Report crawl progress
    Status,
    /// Stop accepting commands and drain the crawl
    Shutdown,
}

impl FromStr for Command {
    type Err = ControlError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        if line.is_empty() {
            return Err(ControlError::EmptyCommand);
        }

        let (verb, arg) = match line.split_once(char::is_whitespace) {
            Some((verb, arg)) => (verb, arg.trim()),
            None => (line, ""),
        };

        let required = |name: &'static str| {
            if arg.is_empty() {
                Err(ControlError::MissingArgument(name))
            } else {
                Ok(arg.to_string())
            }
        };

        match verb.to_ascii_uppercase().as_str() {
            "SEED" => Ok(Command::Seed(required("SEED")?)),
            "SEARCH" => Ok(Command::Search {
                query: required("SEARCH")?,
                mode: SearchMode::Prefix,
            }),
            "EXACT" => Ok(Command::Search {
                query: required("EXACT")?,
                mode: SearchMode::Exact,
            }),
            "SNIPPET" => Ok(Command::Snippet(required("SNIPPET")?)),
            "STATUS" => Ok(Command::Status),
            "SHUTDOWN" => Ok(Command::Shutdown),
            other => Err(ControlError::UnknownCommand(other.to_string())),
        }
    }
}

/// Runs a command against the crawl and returns the response lines
///
/// Blocks on the index and storage locks; call from a blocking context.
pub fn execute(coordinator: &Coordinator, command: &Command) -> Vec<String> {
    match command {
        Command::Seed(url) => match coordinator.add_seed(url) {
            Ok(Admission::Scheduled) => vec![format!("OK scheduled {}", url)],
            Ok(Admission::AlreadyVisited) => vec![format!("OK already visited {}", url)],
            Ok(Admission::AtCapacity) => vec!["OK crawl budget exhausted".to_string()],
            Err(CrawldexError::InvalidSeed(url)) => vec![format!("ERR invalid seed url {}", url)],
            Err(e) => vec![format!("ERR {}", e)],
        },

        Command::Search { query, mode } => {
            let query = normalize_query(query);
            let results = search(coordinator.index(), &query, *mode);

            let mut lines = Vec::with_capacity(results.len() + 2);
            lines.push(format!("OK {}", results.len()));
            for result in &results {
                let snippet = match coordinator.storage().get_snippet(result.site()) {
                    Ok(snippet) => snippet.map(|s| one_line(&s)).unwrap_or_default(),
                    Err(e) => {
                        tracing::warn!("Failed to load snippet for {}: {}", result.site(), e);
                        String::new()
                    }
                };
                lines.push(format!("{} {}", result, snippet).trim_end().to_string());
            }
            lines.push(END_MARKER.to_string());
            lines
        }

        Command::Snippet(url) => match coordinator.storage().get_snippet(url) {
            Ok(Some(snippet)) => vec![format!("OK {}", one_line(&snippet))],
            Ok(None) => vec![format!("ERR no snippet for {}", url)],
            Err(e) => vec![format!("ERR {}", e)],
        },

        Command::Status => {
            let ctx = coordinator.context();
            vec![format!(
                "OK scheduled={} max-sites={} words={} fetched={} failed={} pending={} quiescent={}",
                ctx.frontier().scheduled_count(),
                ctx.frontier().max_sites(),
                ctx.index().len(),
                ctx.pages_fetched(),
                ctx.fetch_failures(),
                ctx.queue().pending(),
                coordinator.is_quiescent()
            )]
        }

        Command::Shutdown => vec!["OK shutting down".to_string()],
    }
}

/// Collapses all whitespace runs to single spaces
fn one_line(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
