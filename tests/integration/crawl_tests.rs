//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and run the full
//! crawl cycle end-to-end with the HTTP renderer.

use sitesnap::config::CrawlConfig;
use sitesnap::crawler::Coordinator;
use sitesnap::render::HttpRenderer;
use std::path::Path;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a fast test configuration writing into `output_dir`
fn create_test_config(root_url: &str, output_dir: &Path) -> CrawlConfig {
    let mut config = CrawlConfig::new(root_url);
    config.crawler.pre_navigation_delay_ms = [0, 0];
    config.crawler.settle_delay_ms = 0;
    config.detection.min_content_length = 0;
    config.output.output_dir = output_dir.to_path_buf();
    config
}

fn html(title: &str, body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(format!(
            "<html><head><title>{}</title></head><body>{}</body></html>",
            title, body
        ))
        .insert_header("content-type", "text/html")
}

async fn mount_page(server: &MockServer, page: &str, response: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(response)
        .mount(server)
        .await;
}

fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[tokio::test]
async fn test_scope_and_manifest() {
    let server = MockServer::start().await;
    let base = server.uri();
    let root = format!("{}/docs", base);

    mount_page(
        &server,
        "/docs",
        html(
            "Docs Home",
            &format!(
                r#"<a href="/docs/b">B</a>
                <a href="{root}">self</a>
                <a href="https://other.com/x">external</a>
                <img src="x"><a href="{base}/img.png">image</a>"#,
                root = root,
                base = base
            ),
        ),
    )
    .await;
    mount_page(&server, "/docs/b", html("Page B", "<p>Leaf</p>")).await;

    let dir = tempfile::tempdir().unwrap();
    let config = create_test_config(&root, dir.path());
    let report = Coordinator::new(config, HttpRenderer::new().unwrap())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.domain_key, "0");
    let expected = format!("{}\n{}/b", root, root);
    assert_eq!(
        std::fs::read_to_string(&report.manifest_path).unwrap(),
        expected
    );
    assert_eq!(report.manifest_path, dir.path().join("0").join("___urls.txt"));

    assert_eq!(
        list_dir(&dir.path().join("0")),
        vec!["Docs_Home_docs.html", "Page_B_docs_b.html", "___urls.txt"]
    );
    assert_eq!(report.summary.artifacts_written, 2);
}

#[tokio::test]
async fn test_dry_run_writes_manifest_only() {
    let server = MockServer::start().await;
    let root = format!("{}/docs", server.uri());

    mount_page(&server, "/docs", html("Home", r#"<a href="/docs/a">A</a>"#)).await;
    mount_page(&server, "/docs/a", html("A", "<p>A</p>")).await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&root, dir.path());
    config.dry_run = true;

    let report = Coordinator::new(config, HttpRenderer::new().unwrap())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.urls.len(), 2);
    assert_eq!(list_dir(&dir.path().join("0")), vec!["___urls.txt"]);
    assert_eq!(report.summary.artifacts_written, 0);
}

#[tokio::test]
async fn test_cyclic_site_terminates() {
    let server = MockServer::start().await;
    let root = format!("{}/docs", server.uri());

    mount_page(
        &server,
        "/docs",
        html("Home", r#"<a href="/docs/a">A</a><a href="/docs/b">B</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/docs/a",
        html("A", r#"<a href="/docs/b">B</a><a href="/docs">Home</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/docs/b",
        html("B", r#"<a href="/docs/a#top">A</a><a href="/docs">Home</a>"#),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&root, dir.path());
    config.dry_run = true;
    config.crawler.max_concurrent_pages_open = 2;

    let report = tokio::time::timeout(
        std::time::Duration::from_secs(10),
        Coordinator::new(config, HttpRenderer::new().unwrap())
            .unwrap()
            .run(),
    )
    .await
    .expect("crawl did not terminate")
    .unwrap();

    assert_eq!(
        report.urls,
        vec![root.clone(), format!("{}/a", root), format!("{}/b", root)]
    );

    // every page fetched exactly once
    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 3);
}

#[tokio::test]
async fn test_unreachable_page_is_still_listed() {
    let server = MockServer::start().await;
    let root = format!("{}/docs", server.uri());

    mount_page(
        &server,
        "/docs",
        html("Home", r#"<a href="/docs/slow">Slow</a>"#),
    )
    .await;
    mount_page(
        &server,
        "/docs/slow",
        html("Slow", r#"<a href="/docs/hidden">Hidden</a>"#)
            .set_delay(std::time::Duration::from_secs(2)),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&root, dir.path());
    config.crawler.primary_timeout_ms = 200;
    config.crawler.fallback_timeout_ms = 300;

    let report = Coordinator::new(config, HttpRenderer::new().unwrap())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.urls, vec![root.clone(), format!("{}/slow", root)]);
    assert_eq!(report.summary.failed, 1);
    assert_eq!(report.summary.rendered, 1);
}

#[tokio::test]
async fn test_challenge_page_is_retried_then_kept() {
    let server = MockServer::start().await;
    let root = format!("{}/docs", server.uri());

    Mock::given(method("GET"))
        .and(path("/docs"))
        .respond_with(html(
            "Just a moment...",
            "<p>Checking your browser before accessing the site.</p>",
        ))
        .expect(3)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut config = create_test_config(&root, dir.path());
    config.dry_run = true;

    let report = Coordinator::new(config, HttpRenderer::new().unwrap())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert_eq!(report.urls, vec![root]);
    assert_eq!(report.summary.degraded, 1);
    assert_eq!(report.summary.retries, 2);
}
