use super::LinkGraph;
use serde::Serialize;
use std::cmp::Ordering;

/// Structural metrics of one page in a [`LinkGraph`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeMetrics {
    pub page: String,
    pub degree: usize,
    pub degree_centrality: f64,
    pub clustering: f64,
}

impl NodeMetrics {
    /// Computes the metrics of every page, in page order
    pub fn for_graph(graph: &LinkGraph) -> Vec<NodeMetrics> {
        graph
            .pages()
            .iter()
            .map(|page| NodeMetrics {
                page: page.clone(),
                degree: graph.degree(page),
                degree_centrality: graph.degree_centrality(page),
                clustering: graph.clustering(page),
            })
            .collect()
    }

    /// Ranking order for suggestion candidates
    ///
    /// Higher centrality first, then higher clustering, then page id
    /// ascending. Total, so sorting with it is deterministic.
    pub fn rank(&self, other: &NodeMetrics) -> Ordering {
        other
            .degree_centrality
            .total_cmp(&self.degree_centrality)
            .then_with(|| other.clustering.total_cmp(&self.clustering))
            .then_with(|| self.page.cmp(&other.page))
    }
}
