//! Integration tests for concurrent link validation

use linkscope::config::{Config, FetcherConfig, ValidatorConfig};
use linkscope::validator::Outcome;
use linkscope::{Auditor, LinkscopeError};
use std::time::{Duration, Instant};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn create_test_config(max_concurrent: usize) -> Config {
    Config {
        fetcher: FetcherConfig {
            timeout_secs: 2,
            connect_timeout_secs: 2,
            ..FetcherConfig::default()
        },
        validator: ValidatorConfig { max_concurrent },
        ..Config::default()
    }
}

async fn mount_status(server: &MockServer, p: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(p))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_mixed_batch_is_partitioned() {
    let server = MockServer::start().await;
    mount_status(&server, "/200", 200).await;
    mount_status(&server, "/404", 404).await;

    let urls = vec![
        format!("{}/200", server.uri()),
        format!("{}/404", server.uri()),
        "http://nonexistent.invalid/".to_string(),
    ];

    let auditor = Auditor::new(create_test_config(8)).unwrap();
    let report = auditor.validate_links(urls).await;

    assert_eq!(report.len(), 3);
    assert_eq!(report.valid_count(), 1);
    assert_eq!(report.broken_count(), 2);

    let ok = report.get(&format!("{}/200", server.uri())).unwrap();
    assert_eq!(ok.outcome, Outcome::Status { status_code: 200 });

    let missing = report.get(&format!("{}/404", server.uri())).unwrap();
    assert_eq!(missing.outcome, Outcome::Status { status_code: 404 });

    let unresolvable = report.get("http://nonexistent.invalid/").unwrap();
    assert!(matches!(unresolvable.outcome, Outcome::Error { .. }));
}

#[tokio::test]
async fn test_output_cardinality_matches_input() {
    let server = MockServer::start().await;
    mount_status(&server, "/a", 200).await;
    mount_status(&server, "/b", 301).await;
    mount_status(&server, "/c", 500).await;

    let mut urls = Vec::new();
    for p in ["/a", "/b", "/c", "/a", "/unmocked"] {
        urls.push(format!("{}{}", server.uri(), p));
    }
    urls.push("not a url".to_string());
    urls.push("http://127.0.0.1:9/".to_string());

    let auditor = Auditor::new(create_test_config(2)).unwrap();
    let report = auditor.validate_links(urls.clone()).await;

    assert_eq!(report.len(), urls.len());

    let mut returned: Vec<&str> = report.results.iter().map(|r| r.url.as_str()).collect();
    let mut expected: Vec<&str> = urls.iter().map(String::as_str).collect();
    returned.sort_unstable();
    expected.sort_unstable();
    assert_eq!(returned, expected);

    for result in &report.results {
        let valid = matches!(result.outcome, Outcome::Status { status_code } if status_code < 400);
        assert_eq!(result.is_valid(), valid, "{}", result.url);
    }

    // /a twice, plus the 3xx without Location that reqwest hands back as-is
    assert_eq!(report.valid_count(), 3);
    assert_eq!(report.broken_count(), 4);
}

#[tokio::test]
async fn test_checks_run_concurrently() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_millis(300)))
        .mount(&server)
        .await;

    let urls: Vec<String> = (0..8)
        .map(|i| format!("{}/slow/{}", server.uri(), i))
        .collect();

    let auditor = Auditor::new(create_test_config(8)).unwrap();
    let started = Instant::now();
    let report = auditor.validate_links(urls).await;

    assert_eq!(report.valid_count(), 8);
    assert!(started.elapsed() < Duration::from_millis(8 * 300));
}

async fn mount_slow(server: &MockServer, delay: Duration) {
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(delay))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_concurrency_ceiling_is_respected() {
    let server = MockServer::start().await;
    mount_slow(&server, Duration::from_millis(300)).await;

    let urls: Vec<String> = (0..6)
        .map(|i| format!("{}/slow/{}", server.uri(), i))
        .collect();

    // Two checks at a time means three rounds of 300ms
    let auditor = Auditor::new(create_test_config(2)).unwrap();
    let started = Instant::now();
    let report = auditor.validate_links(urls).await;

    assert_eq!(report.valid_count(), 6);
    assert!(started.elapsed() >= Duration::from_millis(900));
}

#[tokio::test]
async fn test_dropped_validation_stops_pending_checks() {
    let server = MockServer::start().await;
    mount_slow(&server, Duration::from_millis(300)).await;

    let urls: Vec<String> = (0..6)
        .map(|i| format!("{}/slow/{}", server.uri(), i))
        .collect();

    let auditor = Auditor::new(create_test_config(2)).unwrap();
    let result =
        tokio::time::timeout(Duration::from_millis(450), auditor.validate_links(urls)).await;
    assert!(result.is_err());

    // Checks that never got a permit must not be sent after the caller gave up
    tokio::time::sleep(Duration::from_millis(700)).await;
    let received = server.received_requests().await.unwrap_or_default();
    assert!(received.len() < 6, "sent {} requests", received.len());
}

#[tokio::test]
async fn test_slow_link_times_out_without_blocking_others() {
    let server = MockServer::start().await;
    mount_status(&server, "/fast", 200).await;
    Mock::given(method("GET"))
        .and(path("/hang"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;

    let auditor = Auditor::new(create_test_config(4)).unwrap();
    let report = auditor
        .validate_links(vec![
            format!("{}/hang", server.uri()),
            format!("{}/fast", server.uri()),
        ])
        .await;

    assert_eq!(report.len(), 2);
    assert!(report.get(&format!("{}/fast", server.uri())).unwrap().is_valid());

    let hung = report.get(&format!("{}/hang", server.uri())).unwrap();
    assert!(hung.is_broken());
    assert!(matches!(hung.outcome, Outcome::Error { .. }));
}

#[tokio::test]
async fn test_check_page_validates_extracted_links() {
    let server = MockServer::start().await;
    let body = format!(
        r#"<html><body>
            <a href="/ok">OK</a>
            <a href="/gone">Gone</a>
            <a href="{}/external">External</a>
            <a href="mailto:someone@example.com">Mail</a>
        </body></html>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/page"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&server)
        .await;
    mount_status(&server, "/ok", 200).await;
    mount_status(&server, "/gone", 410).await;
    mount_status(&server, "/external", 200).await;

    let auditor = Auditor::new(create_test_config(4)).unwrap();
    let result = auditor
        .check_page(&format!("{}/page", server.uri()))
        .await
        .unwrap();

    assert_eq!(result.total_links, 3);
    assert_eq!(result.report.len(), 3);
    assert_eq!(result.report.broken_count(), 1);
    assert_eq!(
        result.report.broken().next().unwrap().url,
        format!("{}/gone", server.uri())
    );
}

#[tokio::test]
async fn test_check_page_fails_when_page_is_missing() {
    let server = MockServer::start().await;
    mount_status(&server, "/page", 404).await;

    let auditor = Auditor::new(create_test_config(4)).unwrap();
    let result = auditor
        .check_page(&format!("{}/page", server.uri()))
        .await;

    assert!(matches!(
        result,
        Err(LinkscopeError::HttpStatus {
            status_code: 404,
            ..
        })
    ));
}
