//! Link graph and internal link suggestions
//!
//! Pages are nodes of a simple undirected graph; an edge means the two pages
//! already link to each other in at least one direction. Suggestions point
//! each page at well-connected, well-clustered pages it does not link to yet.

mod metrics;
mod suggest;

pub use metrics::NodeMetrics;
pub use suggest::{extract_internal_pages, suggest_links, PageSuggestions, SuggestionReport};

use petgraph::graphmap::UnGraphMap;
use std::collections::HashMap;

/// Undirected, simple graph of pages
///
/// Nodes are kept in first-seen order. Page ids are interned to indices so
/// the underlying graph map works on `Copy` keys.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    pages: Vec<String>,
    index: HashMap<String, usize>,
    graph: UnGraphMap<usize, ()>,
}

impl LinkGraph {
    /// Builds a graph from a page list and existing link pairs
    ///
    /// Duplicate pages collapse into one node. Self-links and pairs with an
    /// endpoint that is not in `pages` are ignored.
    pub fn new<P, E>(pages: P, edges: E) -> Self
    where
        P: IntoIterator,
        P::Item: AsRef<str>,
        E: IntoIterator,
        E::Item: EdgeEndpoints,
    {
        let mut graph = Self::default();

        for page in pages {
            graph.add_page(page.as_ref());
        }

        for edge in edges {
            let (a, b) = edge.endpoints();
            if !graph.add_edge(a, b) {
                tracing::trace!("Ignoring edge {} -- {}", a, b);
            }
        }

        graph
    }

    fn add_page(&mut self, page: &str) {
        if self.index.contains_key(page) {
            return;
        }

        let id = self.pages.len();
        self.pages.push(page.to_string());
        self.index.insert(page.to_string(), id);
        self.graph.add_node(id);
    }

    fn add_edge(&mut self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) if a != b => {
                self.graph.add_edge(a, b, ());
                true
            }
            _ => false,
        }
    }

    /// Pages in first-seen order
    pub fn pages(&self) -> &[String] {
        &self.pages
    }

    /// Number of distinct pages
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Number of distinct links
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns true if the page is part of the graph
    pub fn contains(&self, page: &str) -> bool {
        self.index.contains_key(page)
    }

    /// Returns true if the two pages are directly linked
    pub fn is_linked(&self, a: &str, b: &str) -> bool {
        match (self.index.get(a), self.index.get(b)) {
            (Some(&a), Some(&b)) => self.graph.contains_edge(a, b),
            _ => false,
        }
    }

    /// Number of pages directly linked to `page`
    pub fn degree(&self, page: &str) -> usize {
        self.index
            .get(page)
            .map_or(0, |&id| self.graph.neighbors(id).count())
    }

    /// Degree centrality of `page`: the share of other pages it links to
    ///
    /// A graph with one page (or none) gives every page a centrality of 1.0.
    pub fn degree_centrality(&self, page: &str) -> f64 {
        let n = self.page_count();
        if n <= 1 {
            return 1.0;
        }
        self.degree(page) as f64 / (n - 1) as f64
    }

    /// Local clustering coefficient of `page`
    ///
    /// The share of the page's neighbor pairs that are linked to each other;
    /// 0.0 for pages with fewer than two neighbors.
    pub fn clustering(&self, page: &str) -> f64 {
        let Some(&id) = self.index.get(page) else {
            return 0.0;
        };

        let neighbors: Vec<usize> = self.graph.neighbors(id).collect();
        let k = neighbors.len();
        if k < 2 {
            return 0.0;
        }

        let mut triangles = 0usize;
        for (i, &a) in neighbors.iter().enumerate() {
            for &b in &neighbors[i + 1..] {
                if self.graph.contains_edge(a, b) {
                    triangles += 1;
                }
            }
        }

        triangles as f64 / (k * (k - 1) / 2) as f64
    }
}

/// Something that names the two pages of a link
pub trait EdgeEndpoints {
    fn endpoints(&self) -> (&str, &str);
}

impl<A: AsRef<str>, B: AsRef<str>> EdgeEndpoints for (A, B) {
    fn endpoints(&self) -> (&str, &str) {
        (self.0.as_ref(), self.1.as_ref())
    }
}

impl<T: EdgeEndpoints> EdgeEndpoints for &T {
    fn endpoints(&self) -> (&str, &str) {
        (*self).endpoints()
    }
}
