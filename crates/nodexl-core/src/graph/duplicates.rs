//! Duplicate-edge detection.
//!
//! Two edges are duplicates when they join the same endpoints with the same
//! directedness. Directed edges compare `(back, front)` in order, so `A → B`
//! and `B → A` are distinct. Undirected edges compare the unordered pair. A
//! directed edge never duplicates an undirected one, even in a mixed graph.

use std::collections::HashMap;

use super::{EdgeView, Graph, VertexId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum EdgeKey {
    Directed(VertexId, VertexId),
    Undirected(VertexId, VertexId),
}

impl EdgeKey {
    fn of(edge: &EdgeView<'_>) -> Self {
        if edge.is_directed() {
            Self::Directed(edge.back, edge.front)
        } else if edge.back <= edge.front {
            Self::Undirected(edge.back, edge.front)
        } else {
            Self::Undirected(edge.front, edge.back)
        }
    }

    fn is_self_loop(self) -> bool {
        match self {
            Self::Directed(a, b) | Self::Undirected(a, b) => a == b,
        }
    }
}

/// Counts of unique and duplicated edges in a graph snapshot.
#[derive(Debug, Clone)]
pub struct DuplicateEdgeDetector {
    groups: HashMap<EdgeKey, usize>,
}

impl DuplicateEdgeDetector {
    /// Scan every edge of `graph`.
    #[must_use]
    pub fn new(graph: &Graph) -> Self {
        let mut groups: HashMap<EdgeKey, usize> = HashMap::new();
        for edge in graph.edges() {
            *groups.entry(EdgeKey::of(&edge)).or_insert(0) += 1;
        }
        Self { groups }
    }

    /// Whether any edge has at least one duplicate.
    #[must_use]
    pub fn graph_contains_duplicate_edges(&self) -> bool {
        self.groups.values().any(|&n| n > 1)
    }

    /// Number of edges that have no duplicate.
    #[must_use]
    pub fn unique_edge_count(&self) -> usize {
        self.groups.values().filter(|&&n| n == 1).count()
    }

    /// Number of edges that belong to a group of two or more duplicates.
    #[must_use]
    pub fn edges_with_duplicates_count(&self) -> usize {
        self.groups.values().filter(|&&n| n > 1).sum()
    }

    /// Number of edges left if every duplicate group were merged into one.
    #[must_use]
    pub fn total_edges_after_merging_duplicates(&self) -> usize {
        self.groups.len()
    }

    /// Like [`Self::total_edges_after_merging_duplicates`] but without
    /// self-loops. This is the edge count used for graph density.
    #[must_use]
    pub fn total_edges_after_merging_duplicates_no_self_loops(&self) -> usize {
        self.groups.keys().filter(|k| !k.is_self_loop()).count()
    }

    /// How many edges (including `edge` itself) share `edge`'s endpoints.
    #[must_use]
    pub fn group_size(&self, edge: &EdgeView<'_>) -> usize {
        self.groups.get(&EdgeKey::of(edge)).copied().unwrap_or(0)
    }
}
