//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and drive the full
//! crawl cycle end-to-end: seeding, fetching, link admission, indexing,
//! snippet storage, quiescence and search.

use crawldex::config::CrawlerConfig;
use crawldex::crawler::{Admission, Coordinator};
use crawldex::search::{search, SearchMode};
use crawldex::storage::{SnippetStore, SqliteStorage};
use std::sync::Arc;
use tempfile::TempDir;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a coordinator over an in-memory snippet store
fn create_test_coordinator(max_sites: usize, workers: usize) -> Coordinator {
    let storage: Arc<dyn SnippetStore> =
        Arc::new(SqliteStorage::new_in_memory().expect("Failed to open storage"));
    let config = CrawlerConfig {
        max_sites,
        workers,
        ..CrawlerConfig::default()
    };
    Coordinator::new(&config, storage)
}

/// Mounts an HTML page at a path
async fn mount_page(server: &MockServer, page: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Waits for the crawl to finish without blocking the runtime
async fn drain(coordinator: &Coordinator) {
    let draining = coordinator.clone();
    tokio::task::spawn_blocking(move || draining.drain())
        .await
        .expect("Drain task panicked");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_full_crawl_single_site() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    mount_page(
        &mock_server,
        "/",
        format!(
            r#"<html><head><title>Home</title><style>.x {{ color: red }}</style></head><body>
            <h1>Alpha home</h1>
            <a href="/page1.html">Page 1</a>
            <a href="{}/page2.html">Page 2</a>
            <a href="/logo.png">Logo</a>
            <a href="/missing.html">Missing</a>
            <a href="https://elsewhere.example/">Secure</a>
            </body></html>"#,
            base_url
        ),
    )
    .await;

    mount_page(
        &mock_server,
        "/page1.html",
        r#"<html><body><p>Alpha beta alpha</p><a href="/">Home</a></body></html>"#.to_string(),
    )
    .await;

    mount_page(
        &mock_server,
        "/page2.html",
        r#"<html><body><p>Gamma &amp; alphabet</p><script>var alpha = 1;</script></body></html>"#
            .to_string(),
    )
    .await;

    let coordinator = create_test_coordinator(10, 4);
    let seed = format!("{}/", base_url);
    assert_eq!(
        coordinator.add_seed(&seed).expect("Seed should be valid"),
        Admission::Scheduled
    );

    drain(&coordinator).await;

    // The 404 page was refunded; the image and https link were never scheduled
    let visited = coordinator.frontier().visited();
    assert_eq!(
        visited,
        vec![
            format!("{}/", base_url),
            format!("{}/page1.html", base_url),
            format!("{}/page2.html", base_url),
        ]
    );
    assert_eq!(coordinator.frontier().scheduled_count(), 3);
    assert_eq!(coordinator.context().pages_fetched(), 3);
    assert_eq!(coordinator.context().fetch_failures(), 1);

    let index = coordinator.index();
    let page1 = format!("{}/page1.html", base_url);
    assert_eq!(index.positions("alpha", &page1), vec![0, 2]);
    assert_eq!(index.rank("beta", &page1), 1);
    // Script contents are never indexed
    assert!(index.sites_for("var").is_empty());

    let snippet = coordinator
        .storage()
        .get_snippet(&format!("{}/page2.html", base_url))
        .expect("Snippet lookup failed")
        .expect("Snippet should be stored");
    assert!(snippet.starts_with("Gamma"));
    assert!(!snippet.contains("var alpha"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_search_after_crawl() {
    let mock_server = MockServer::start().await;

    mount_page(
        &mock_server,
        "/",
        r#"<html><body>cat cat car <a href="/dogs.html">dogs</a></body></html>"#.to_string(),
    )
    .await;
    mount_page(
        &mock_server,
        "/dogs.html",
        "<html><body>dog dog dog cat</body></html>".to_string(),
    )
    .await;

    let coordinator = create_test_coordinator(30, 2);
    let home = format!("{}/", mock_server.uri());
    let dogs = format!("{}/dogs.html", mock_server.uri());
    coordinator.add_seed(&home).expect("Seed should be valid");
    drain(&coordinator).await;

    let exact = search(coordinator.index(), "cat", SearchMode::Exact);
    let exact: Vec<(&str, usize)> = exact.iter().map(|r| (r.site(), r.rank())).collect();
    assert_eq!(exact, vec![(home.as_str(), 2), (dogs.as_str(), 1)]);

    // "ca" picks up cat and car on the home page
    let prefix = search(coordinator.index(), "ca", SearchMode::Prefix);
    assert_eq!(prefix[0].site(), home);
    assert_eq!(prefix[0].rank(), 3);

    let multi = search(coordinator.index(), "dog cat", SearchMode::Exact);
    assert_eq!(multi[0].site(), dogs);
    assert_eq!(multi[0].rank(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_crawl_budget_is_never_exceeded() {
    let mock_server = MockServer::start().await;

    let links: String = (0..40)
        .map(|i| format!(r#"<a href="/p{}.html">p{}</a>"#, i, i))
        .collect();
    mount_page(
        &mock_server,
        "/",
        format!("<html><body>{}</body></html>", links),
    )
    .await;

    // Every child page links back to a handful of siblings
    Mock::given(method("GET"))
        .and(path_regex(r"^/p\d+\.html$"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"<html><body>leaf <a href="/p1.html">1</a><a href="/p39.html">39</a></body></html>"#,
        ))
        .mount(&mock_server)
        .await;

    let coordinator = create_test_coordinator(5, 10);
    coordinator
        .add_seed(&format!("{}/", mock_server.uri()))
        .expect("Seed should be valid");
    drain(&coordinator).await;

    assert_eq!(coordinator.frontier().scheduled_count(), 5);
    assert_eq!(coordinator.frontier().visited().len(), 5);
    assert_eq!(coordinator.context().pages_fetched(), 5);
    assert_eq!(coordinator.index().sites_for("leaf").len(), 4);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_failed_seed_is_refunded() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let coordinator = create_test_coordinator(30, 2);
    coordinator
        .add_seed(&format!("{}/broken.html", mock_server.uri()))
        .expect("Seed should be valid");
    drain(&coordinator).await;

    assert_eq!(coordinator.frontier().scheduled_count(), 0);
    assert!(coordinator.frontier().visited().is_empty());
    assert!(coordinator.index().is_empty());
    assert_eq!(coordinator.context().fetch_failures(), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn test_snippets_persist_to_database_file() {
    let mock_server = MockServer::start().await;
    mount_page(
        &mock_server,
        "/",
        "<html><body>Persistent&nbsp;snippet text</body></html>".to_string(),
    )
    .await;

    let dir = TempDir::new().expect("Failed to create temp dir");
    let db_path = dir.path().join("crawldex.db");
    let seed = format!("{}/", mock_server.uri());

    {
        let storage: Arc<dyn SnippetStore> =
            Arc::new(SqliteStorage::new(&db_path).expect("Failed to open database"));
        let coordinator = Coordinator::new(&CrawlerConfig::default(), storage);
        coordinator.add_seed(&seed).expect("Seed should be valid");
        drain(&coordinator).await;
    }

    let reopened = SqliteStorage::new(&db_path).expect("Failed to reopen database");
    let snippet = reopened
        .get_snippet(&seed)
        .expect("Snippet lookup failed")
        .expect("Snippet should be stored");
    assert_eq!(snippet, "Persistent snippet text");
}

#[tokio::test(flavor = "multi_thread")]
async fn test_invalid_seed_is_rejected() {
    let coordinator = create_test_coordinator(30, 1);
    assert!(coordinator.add_seed("not a url").is_err());
    assert!(coordinator.add_seed("http://example.com/photo.jpg").is_err());
    drain(&coordinator).await;
    assert!(coordinator.frontier().visited().is_empty());
}
