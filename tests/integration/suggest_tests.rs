//! Integration tests for link suggestions

use linkscope::config::Config;
use linkscope::graph::{suggest_links, LinkGraph};
use linkscope::Auditor;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn pairs(items: &[(&str, &str)]) -> Vec<(String, String)> {
    items
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect()
}

#[test]
fn test_home_is_pointed_at_unlinked_page() {
    let pages = strings(&["home", "about", "contact", "blog"]);
    let edges = pairs(&[("home", "about"), ("home", "contact")]);

    let report = suggest_links(&pages, &edges, 2);
    let home = report.targets_for("home").unwrap();

    assert!(!home.contains(&"about".to_string()));
    assert!(!home.contains(&"contact".to_string()));
    assert_eq!(home, ["blog"]);
}

#[test]
fn test_suggestions_are_deterministic() {
    let pages = strings(&["a", "b", "c", "d", "e", "f"]);
    let edges = pairs(&[("a", "b"), ("b", "c"), ("c", "a"), ("d", "e"), ("a", "d")]);

    let first = suggest_links(&pages, &edges, 3);
    for _ in 0..20 {
        let again = suggest_links(&pages, &edges, 3);
        assert_eq!(again.suggestions, first.suggestions);
        assert_eq!(again.metrics, first.metrics);
    }
}

#[test]
fn test_suggestions_never_include_neighbors_or_self() {
    let pages = strings(&["a", "b", "c", "d", "e"]);
    let edges = pairs(&[("a", "b"), ("b", "c"), ("c", "d"), ("d", "e"), ("e", "a")]);
    let graph = LinkGraph::new(&pages, &edges);

    let report = suggest_links(&pages, &edges, 10);
    for suggestion in &report.suggestions {
        assert!(suggestion.targets.len() <= 10);
        for target in &suggestion.targets {
            assert_ne!(target, &suggestion.page);
            assert!(!graph.is_linked(&suggestion.page, target));
        }
    }

    // Every page in a 5-cycle has exactly two non-neighbors
    assert!(report.suggestions.iter().all(|s| s.targets.len() == 2));
}

#[test]
fn test_edges_outside_page_set_are_ignored() {
    let pages = strings(&["home", "about"]);
    let edges = pairs(&[("home", "ghost"), ("home", "home")]);

    let report = suggest_links(&pages, &edges, 3);
    assert_eq!(report.targets_for("home").unwrap(), ["about"]);
    assert_eq!(report.metrics_for("home").unwrap().degree, 0);
}

#[tokio::test]
async fn test_internal_pages_from_homepage() {
    let server = MockServer::start().await;
    let body = format!(
        r#"<html><body>
            <a href="/">Home</a>
            <a href="/About">About</a>
            <a href="/about/">About again</a>
            <a href="/blog/">Blog</a>
            <a href="https://elsewhere.example/">Elsewhere</a>
            <a href="{}/contact">Contact</a>
        </body></html>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html"))
        .mount(&server)
        .await;

    let auditor = Auditor::new(Config::default()).unwrap();
    let pages = auditor.internal_pages(&server.uri(), None).await.unwrap();
    assert_eq!(pages, vec!["home", "about", "blog", "contact"]);

    let capped = auditor.internal_pages(&server.uri(), Some(2)).await.unwrap();
    assert_eq!(capped, vec!["home", "about"]);

    let report = auditor.suggest_links(&pages, &[], Some(1));
    assert_eq!(report.suggestions.len(), 4);
}
