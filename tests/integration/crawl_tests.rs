//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use linkscope::config::{Config, CrawlerConfig, FetcherConfig};
use linkscope::crawler::{Coordinator, CrawlTermination, FailureReason, Fetcher};
use linkscope::Auditor;
use wiremock::matchers::{method, path, path_regex};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Creates a test configuration without request spacing
fn create_test_config(max_pages: usize) -> Config {
    Config {
        crawler: CrawlerConfig {
            max_pages,
            max_attempts: None,
            request_spacing_ms: 0,
        },
        ..Config::default()
    }
}

fn html(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(
        format!("<html><head><title>Test</title></head><body>{}</body></html>", body),
        "text/html",
    )
}

async fn mount_redirect(server: &MockServer, from: &str, to: &str) {
    Mock::given(method("GET"))
        .and(path(from))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", to))
        .mount(server)
        .await;
}

async fn mount_page(server: &MockServer, page: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(page))
        .respond_with(html(body))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_budget_limits_breadth_first_crawl() {
    let server = MockServer::start().await;
    let base = server.uri();

    // A -> B, C; B -> A, D
    mount_page(&server, "/", r#"<a href="/b">B</a><a href="/c">C</a>"#).await;
    mount_page(&server, "/b", r#"<a href="/">A</a><a href="/d">D</a>"#).await;
    mount_page(&server, "/c", "").await;
    mount_page(&server, "/d", "").await;

    let auditor = Auditor::new(create_test_config(3)).unwrap();
    let report = auditor.crawl(&base, None).await.unwrap();

    assert_eq!(report.page_count(), 3);
    assert!(report.budget_exhausted());

    let has = |p: &str| report.pages.contains_key(&format!("{}{}", base, p));
    assert!(has("/"));
    assert!(has("/b"));
    assert!(!(has("/c") && has("/d")));
}

#[tokio::test]
async fn test_crawl_stays_on_seed_origin() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    mount_page(
        &server,
        "/",
        &format!(
            r#"<a href="/about">About</a><a href="{}/elsewhere">Elsewhere</a>"#,
            other.uri()
        ),
    )
    .await;
    mount_page(&server, "/about", "").await;

    Mock::given(method("GET"))
        .respond_with(html(""))
        .expect(0)
        .mount(&other)
        .await;

    let auditor = Auditor::new(create_test_config(10)).unwrap();
    let report = auditor.crawl(&server.uri(), None).await.unwrap();

    assert_eq!(report.page_count(), 2);
    assert_eq!(report.termination, CrawlTermination::FrontierExhausted);
    for url in report.pages.keys() {
        assert!(url.starts_with(&server.uri()));
    }
}

#[tokio::test]
async fn test_each_page_is_fetched_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html(
            r#"<a href="/b">B</a><a href="/b/">B again</a><a href="/b#top">B top</a><a href="/">Self</a>"#,
        ))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(html(r#"<a href="/">Home</a>"#))
        .expect(1)
        .mount(&server)
        .await;

    let auditor = Auditor::new(create_test_config(10)).unwrap();
    let report = auditor.crawl(&server.uri(), None).await.unwrap();

    assert_eq!(report.page_count(), 2);
    assert_eq!(report.attempts, 2);
    assert_eq!(report.link_edges().len(), 1);
}

#[tokio::test]
async fn test_failures_do_not_abort_crawl() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/missing">Missing</a><a href="/ok">OK</a>"#,
    )
    .await;
    mount_page(&server, "/ok", "").await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let auditor = Auditor::new(create_test_config(10)).unwrap();
    let report = auditor.crawl(&server.uri(), None).await.unwrap();

    assert_eq!(report.page_count(), 2);
    assert_eq!(report.failures.len(), 1);

    let failure = &report.failures[0];
    assert_eq!(failure.url, format!("{}/missing", server.uri()));
    assert!(matches!(
        failure.reason,
        FailureReason::HttpStatus { status_code: 404 }
    ));
}

#[tokio::test]
async fn test_attempt_ceiling_stops_crawl_of_broken_site() {
    let server = MockServer::start().await;

    let links: String = (1..=5)
        .map(|i| format!(r#"<a href="/broken{}">x</a>"#, i))
        .collect();
    mount_page(&server, "/", &links).await;
    Mock::given(method("GET"))
        .and(path_regex("^/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let fetcher = Fetcher::new(&FetcherConfig::default()).unwrap();
    let config = CrawlerConfig {
        max_pages: 5,
        max_attempts: Some(3),
        request_spacing_ms: 0,
    };
    let report = Coordinator::new(fetcher, config)
        .crawl(&server.uri(), 5)
        .await
        .unwrap();

    assert_eq!(report.termination, CrawlTermination::AttemptCeilingReached);
    assert_eq!(report.attempts, 3);
    assert_eq!(report.page_count(), 1);
    assert_eq!(report.failures.len(), 2);
}

#[tokio::test]
async fn test_off_origin_redirect_is_a_failure() {
    let server = MockServer::start().await;
    let other = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/out">Out</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/out"))
        .respond_with(
            ResponseTemplate::new(302)
                .insert_header("Location", format!("{}/landing", other.uri()).as_str()),
        )
        .mount(&server)
        .await;
    mount_page(&other, "/landing", "").await;

    let auditor = Auditor::new(create_test_config(10)).unwrap();
    let report = auditor.crawl(&server.uri(), None).await.unwrap();

    assert_eq!(report.page_count(), 1);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].reason,
        FailureReason::OffOrigin { .. }
    ));
}

#[tokio::test]
async fn test_unreachable_seed_is_reported_not_raised() {
    let auditor = Auditor::new(create_test_config(5)).unwrap();
    let report = auditor.crawl("http://127.0.0.1:9/", None).await.unwrap();

    assert_eq!(report.page_count(), 0);
    assert_eq!(report.failures.len(), 1);
    assert!(matches!(
        report.failures[0].reason,
        FailureReason::Fetch { .. }
    ));
}

#[tokio::test]
async fn test_optimize_site_attaches_titles() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        r#"<a href="/about">About</a><a href="/contact">Contact</a><a href="/blog">Blog</a>"#,
    )
    .await;
    mount_page(&server, "/about", r#"<a href="/">Home</a>"#).await;
    mount_page(&server, "/contact", r#"<a href="/">Home</a>"#).await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<p>no title</p>", "text/html"))
        .mount(&server)
        .await;

    let auditor = Auditor::new(create_test_config(10)).unwrap();
    let result = auditor
        .optimize_site(&server.uri(), None, Some(2))
        .await
        .unwrap();

    assert_eq!(result.pages_crawled, 4);

    let home = result
        .recommendations
        .iter()
        .find(|r| r.page == "home")
        .unwrap();
    assert_eq!(home.title, "Homepage");
    assert!(home.targets.is_empty());

    let blog = result
        .recommendations
        .iter()
        .find(|r| r.page == "blog")
        .unwrap();
    assert_eq!(blog.title, "Untitled");

    let about = result
        .recommendations
        .iter()
        .find(|r| r.page == "about")
        .unwrap();
    assert_eq!(about.title, "Test");
    assert_eq!(about.targets, vec!["blog", "contact"]);
}

#[tokio::test]
async fn test_redirects_onto_known_page_are_aliases() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/",
        r#"<a href="/old1">1</a><a href="/old2">2</a><a href="/old3">3</a><a href="/real">Real</a>"#,
    )
    .await;
    for old in ["/old1", "/old2", "/old3"] {
        mount_redirect(&server, old, "/").await;
    }
    mount_page(&server, "/real", r#"<a href="/">Home</a>"#).await;

    let auditor = Auditor::new(create_test_config(3)).unwrap();
    let report = auditor.crawl(&base, None).await.unwrap();

    assert_eq!(report.page_count(), 2);
    assert!(report.pages.contains_key(&format!("{}/", base)));
    assert!(report.pages.contains_key(&format!("{}/real", base)));
    assert_eq!(report.termination, CrawlTermination::FrontierExhausted);

    assert_eq!(report.failures.len(), 3);
    for failure in &report.failures {
        match &failure.reason {
            FailureReason::Alias { final_url } => assert_eq!(final_url, &format!("{}/", base)),
            other => panic!("unexpected failure {:?}", other),
        }
    }

    let result = auditor.optimize_site(&base, None, None).await.unwrap();
    assert_eq!(result.pages_crawled, 2);
    let mut slugs: Vec<&str> = result
        .recommendations
        .iter()
        .map(|r| r.page.as_str())
        .collect();
    slugs.sort();
    assert_eq!(slugs, vec!["home", "real"]);
}

#[tokio::test]
async fn test_redirect_to_new_page_is_keyed_by_target() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(&server, "/", r#"<a href="/moved">Moved</a>"#).await;
    mount_redirect(&server, "/moved", "/landing").await;
    mount_page(&server, "/landing", r#"<a href="/">Home</a>"#).await;

    let auditor = Auditor::new(create_test_config(10)).unwrap();
    let report = auditor.crawl(&base, None).await.unwrap();

    assert_eq!(report.page_count(), 2);
    assert!(report.failures.is_empty());

    let landing = &report.pages[&format!("{}/landing", base)];
    assert_eq!(landing.final_url, format!("{}/landing", base));
    assert!(!report.pages.contains_key(&format!("{}/moved", base)));
}

#[tokio::test]
async fn test_seed_redirect_moves_crawl_origin() {
    let old_site = MockServer::start().await;
    let new_site = MockServer::start().await;

    mount_redirect(&old_site, "/", &format!("{}/", new_site.uri())).await;
    mount_page(&new_site, "/", r#"<a href="/a">A</a>"#).await;
    mount_page(&new_site, "/a", r#"<a href="/">Home</a>"#).await;

    let auditor = Auditor::new(create_test_config(10)).unwrap();
    let report = auditor.crawl(&old_site.uri(), None).await.unwrap();

    assert_eq!(report.seed, format!("{}/", new_site.uri()));
    assert_eq!(report.page_count(), 2);
    assert!(report.failures.is_empty());
    for url in report.pages.keys() {
        assert!(url.starts_with(&new_site.uri()));
    }
    assert!(report.pages.contains_key(&format!("{}/a", new_site.uri())));
}
