//! Crawldex main entry point
//!
//! This is the command-line interface for the Crawldex crawler and search
//! engine.

use anyhow::Context;
use clap::Parser;
use crawldex::config::{load_config_with_hash, Config};
use crawldex::control::{execute, Command, ControlServer, END_MARKER};
use crawldex::crawler::Coordinator;
use crawldex::output::{print_statistics, write_reports};
use crawldex::search::SearchMode;
use crawldex::storage::open_storage;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawldex: a bounded crawler with ranked keyword search
///
/// Crawldex crawls a capped number of pages reachable from a seed URL,
/// builds a word-level inverted index over their text, and answers exact or
/// prefix keyword queries, either over a control connection or once the crawl
/// has finished.
#[derive(Parser, Debug)]
#[command(name = "crawldex")]
#[command(version = "1.0.0")]
#[command(about = "A bounded web crawler with an inverted index", long_about = None)]
struct Cli {
    /// Absolute URL the crawl starts from
    #[arg(long, value_name = "URL")]
    seed: String,

    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Write a diagnostic dump of the index to this file after the crawl
    #[arg(long, value_name = "PATH")]
    dump: Option<PathBuf>,

    /// Do not open the control listener; crawl to completion and exit
    #[arg(long)]
    no_control: bool,

    /// Query to answer once the crawl has finished (repeatable)
    #[arg(long = "query", value_name = "QUERY")]
    queries: Vec<String>,

    /// Match query terms exactly instead of by prefix
    #[arg(long)]
    exact: bool,

    /// Validate config and seed, show the crawl settings, and exit
    #[arg(long)]
    dry_run: bool,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    let config = load_config(cli.config.as_ref())?;

    if cli.dry_run {
        handle_dry_run(&config, &cli.seed);
        return Ok(());
    }

    handle_crawl(config, cli).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("crawldex=info,warn"),
            1 => EnvFilter::new("crawldex=debug,info"),
            2 => EnvFilter::new("crawldex=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Loads the configuration file, or the defaults when none is given
fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        tracing::info!("No configuration file given, using defaults");
        return Ok(Config::default());
    };

    tracing::info!("Loading configuration from: {}", path.display());
    let (config, hash) = load_config_with_hash(path)
        .with_context(|| format!("failed to load configuration from {}", path.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", hash);
    Ok(config)
}

/// Handles the --dry-run mode: validates the seed and shows the settings
fn handle_dry_run(config: &Config, seed: &str) {
    println!("=== Crawldex Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Max sites: {}", config.crawler.max_sites);
    println!("  Workers: {}", config.crawler.workers);
    println!("  Snippet length: {}", config.crawler.snippet_length);

    println!("\nStorage:");
    match &config.storage.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: in memory"),
    }

    println!("\nControl:");
    println!("  Bind: {}", config.control.bind);

    let canonical = crawldex::url::canonicalize_trailing_slash(seed);
    let valid = crawldex::url::StructuredUrl::parse(&canonical).is_valid()
        && crawldex::url::is_likely_html(&canonical);
    println!("\nSeed:");
    println!("  {} ({})", canonical, if valid { "valid" } else { "INVALID" });
}

/// Handles a crawl from seeding through the final report
async fn handle_crawl(config: Config, cli: Cli) -> anyhow::Result<()> {
    let storage = open_storage(&config.storage).context("failed to open snippet store")?;
    let coordinator = Coordinator::new(&config.crawler, storage);

    let server = if cli.no_control {
        None
    } else {
        Some(ControlServer::bind(&config.control.bind, coordinator.clone()).await?)
    };

    let admission = coordinator
        .add_seed(&cli.seed)
        .with_context(|| format!("cannot start crawl from {}", cli.seed))?;
    tracing::debug!("Seed {}: {:?}", cli.seed, admission);

    if let Some(server) = server {
        println!("Control listener ready on {}", server.local_addr()?);
        server.run().await?;
    }

    let draining = coordinator.clone();
    tokio::task::spawn_blocking(move || draining.drain())
        .await
        .context("crawl supervisor failed")?;

    let stats = write_reports(&coordinator, cli.dump.as_deref())?;

    let mode = if cli.exact {
        SearchMode::Exact
    } else {
        SearchMode::Prefix
    };
    for query in &cli.queries {
        answer_query(&coordinator, query, mode);
    }

    print_statistics(&stats);
    Ok(())
}

/// Prints the ranked results for one query
fn answer_query(coordinator: &Coordinator, query: &str, mode: SearchMode) {
    println!("=== {} search: {} ===", mode, query);
    let command = Command::Search {
        query: query.to_string(),
        mode,
    };
    for line in execute(coordinator, &command)
        .iter()
        .skip(1)
        .filter(|line| line.as_str() != END_MARKER)
    {
        println!("  {}", line);
    }
    println!();
}
