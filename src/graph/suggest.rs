use super::{EdgeEndpoints, LinkGraph, NodeMetrics};
use crate::crawler::extract_links;
use crate::url::{page_id_from_url, same_origin};
use serde::Serialize;
use std::collections::HashMap;
use url::Url;

/// Suggested link targets for one page
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PageSuggestions {
    pub page: String,

    /// Best candidates first, at most `top_n`
    pub targets: Vec<String>,
}

/// Result of a suggestion run over one graph
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionReport {
    /// Per-page metrics, in page order
    pub metrics: Vec<NodeMetrics>,

    /// Per-page suggestions, in page order
    pub suggestions: Vec<PageSuggestions>,
}

impl SuggestionReport {
    /// Suggested targets for `page`, if the page was part of the graph
    pub fn targets_for(&self, page: &str) -> Option<&[String]> {
        self.suggestions
            .iter()
            .find(|s| s.page == page)
            .map(|s| s.targets.as_slice())
    }

    /// Metrics for `page`, if the page was part of the graph
    pub fn metrics_for(&self, page: &str) -> Option<&NodeMetrics> {
        self.metrics.iter().find(|m| m.page == page)
    }
}

/// Suggests new internal links for every page
///
/// Builds a [`LinkGraph`] from `pages` and `edges`, then for each page ranks
/// every other page it is not already linked to by degree centrality and
/// clustering coefficient (both descending, ties broken by page id) and keeps
/// the first `top_n`. The output is fully determined by the inputs.
///
/// # Example
///
/// ```
/// use linkscope::graph::suggest_links;
///
/// let pages = ["home", "about", "contact", "blog"].map(String::from);
/// let edges = [("home", "about"), ("home", "contact")].map(|(a, b)| (a.to_string(), b.to_string()));
///
/// let report = suggest_links(&pages, &edges, 2);
/// assert_eq!(report.targets_for("home").unwrap(), ["blog"]);
/// ```
pub fn suggest_links<P, E>(pages: &[P], edges: &[E], top_n: usize) -> SuggestionReport
where
    P: AsRef<str>,
    E: EdgeEndpoints,
{
    let graph = LinkGraph::new(pages, edges);
    let metrics = NodeMetrics::for_graph(&graph);
    let by_page: HashMap<&str, &NodeMetrics> =
        metrics.iter().map(|m| (m.page.as_str(), m)).collect();

    tracing::debug!(
        "Suggesting up to {} links over {} pages and {} edges",
        top_n,
        graph.page_count(),
        graph.edge_count()
    );

    let suggestions = graph
        .pages()
        .iter()
        .map(|page| {
            let mut candidates: Vec<&NodeMetrics> = graph
                .pages()
                .iter()
                .filter(|other| *other != page && !graph.is_linked(page, other))
                .filter_map(|other| by_page.get(other.as_str()).copied())
                .collect();

            candidates.sort_by(|a, b| a.rank(b));
            candidates.truncate(top_n);

            PageSuggestions {
                page: page.clone(),
                targets: candidates.into_iter().map(|m| m.page.clone()).collect(),
            }
        })
        .collect();

    SuggestionReport {
        metrics,
        suggestions,
    }
}

/// Collects the distinct same-origin page ids linked from one page
///
/// Links are taken in document order and turned into slug-style ids with
/// [`page_id_from_url`]. Collection stops once `max_links` ids are found.
pub fn extract_internal_pages(root: &Url, html: &str, max_links: usize) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    if max_links == 0 {
        return found;
    }

    for link in extract_links(root, html) {
        if !same_origin(root, &link) {
            continue;
        }

        let slug = page_id_from_url(&link);
        if !found.contains(&slug) {
            found.push(slug);
        }

        if found.len() >= max_links {
            break;
        }
    }

    found
}
