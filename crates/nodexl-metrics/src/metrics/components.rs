//! Connected components via Tarjan's algorithm.
//!
//! # Algorithm
//!
//! Tarjan's strongly connected components, iterative, walking
//! [`Graph::adjacent_vertices`]. Adjacency ignores edge direction, so every
//! edge is traversable both ways and each strongly connected component is a
//! (weakly) connected component of the graph.
//!
//! The per-vertex index/lowlink bookkeeping lives in a side table owned by
//! the calculation and updated through `&mut self` as the explicit DFS
//! frame stack advances; the graph is only borrowed.
//!
//! # Ordering
//!
//! Components are sorted by vertex count, ascending or descending. When any
//! vertex in the graph carries a `layout_sort_order`, ties are broken by the
//! smallest sort order in each component (vertices without one count as 0).
//! The sort is stable, so remaining ties keep discovery order. Vertices
//! inside a component are listed in enumeration order.

use std::collections::{HashMap, HashSet};

use nodexl_core::{Graph, VertexId};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::calculator::{CalculationContext, GraphMetricCalculator, Outcome};
use crate::error::MetricError;

/// Order of the component list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ComponentSortOrder {
    /// Smallest component first.
    Ascending,
    /// Largest component first.
    #[default]
    Descending,
}

impl ComponentSortOrder {
    /// `Descending` when `descending` is set, else `Ascending`.
    #[must_use]
    pub const fn from_descending(descending: bool) -> Self {
        if descending {
            Self::Descending
        } else {
            Self::Ascending
        }
    }
}

// ---------------------------------------------------------------------------
// Tarjan
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
struct TarjanState {
    index: usize,
    lowlink: usize,
    on_stack: bool,
}

#[derive(Debug, Default)]
struct Tarjan {
    states: HashMap<VertexId, TarjanState>,
    stack: Vec<VertexId>,
    next_index: usize,
    components: Vec<Vec<VertexId>>,
}

impl Tarjan {
    /// Number `v` and push it onto the component stack.
    fn open(&mut self, v: VertexId) {
        let index = self.next_index;
        self.next_index += 1;
        self.states.insert(
            v,
            TarjanState {
                index,
                lowlink: index,
                on_stack: true,
            },
        );
        self.stack.push(v);
    }

    /// Tarjan from `root`, iterative: each frame holds a vertex, its
    /// neighbours and a cursor into them, so path length never touches the
    /// thread stack.
    fn visit(&mut self, graph: &Graph, root: VertexId) {
        self.open(root);
        let mut call_stack: Vec<(VertexId, Vec<VertexId>, usize)> =
            vec![(root, graph.adjacent_vertices(root), 0)];

        while let Some(frame) = call_stack.last_mut() {
            let v = frame.0;
            if let Some(&w) = frame.1.get(frame.2) {
                frame.2 += 1;
                match self.states.get(&w).copied() {
                    None => {
                        self.open(w);
                        call_stack.push((w, graph.adjacent_vertices(w), 0));
                    }
                    Some(state) if state.on_stack => self.lower(v, state.index),
                    Some(_) => {}
                }
                continue;
            }

            call_stack.pop();
            let Some(state) = self.states.get(&v).copied() else {
                continue;
            };
            if let Some(parent) = call_stack.last() {
                self.lower(parent.0, state.lowlink);
            }
            if state.lowlink == state.index {
                self.close(v);
            }
        }
    }

    /// Pop the component rooted at `v` off the stack.
    fn close(&mut self, v: VertexId) {
        let mut component = Vec::new();
        while let Some(w) = self.stack.pop() {
            if let Some(s) = self.states.get_mut(&w) {
                s.on_stack = false;
            }
            component.push(w);
            if w == v {
                break;
            }
        }
        self.components.push(component);
    }

    fn lower(&mut self, v: VertexId, candidate: usize) {
        if let Some(s) = self.states.get_mut(&v) {
            s.lowlink = s.lowlink.min(candidate);
        }
    }
}

// ---------------------------------------------------------------------------
// Calculator
// ---------------------------------------------------------------------------

/// Calculates connected components as sorted vertex lists.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConnectedComponentCalculator {
    order: ComponentSortOrder,
}

impl ConnectedComponentCalculator {
    /// Calculator producing components in `order`.
    #[must_use]
    pub const fn new(order: ComponentSortOrder) -> Self {
        Self { order }
    }

    /// The configured order.
    #[must_use]
    pub const fn order(&self) -> ComponentSortOrder {
        self.order
    }

    fn sort(&self, graph: &Graph, components: &mut [Vec<VertexId>]) {
        let by_size = |a: &Vec<VertexId>, b: &Vec<VertexId>| match self.order {
            ComponentSortOrder::Ascending => a.len().cmp(&b.len()),
            ComponentSortOrder::Descending => b.len().cmp(&a.len()),
        };

        if graph.has_layout_sort_order() {
            let min_order = |c: &[VertexId]| {
                c.iter()
                    .map(|&v| {
                        graph
                            .vertex(v)
                            .and_then(|vertex| vertex.layout_sort_order)
                            .unwrap_or(0.0)
                    })
                    .fold(f32::INFINITY, f32::min)
            };
            components.sort_by(|a, b| {
                by_size(a, b)
                    .then_with(|| min_order(a.as_slice()).total_cmp(&min_order(b.as_slice())))
            });
        } else {
            components.sort_by(by_size);
        }
    }
}

impl GraphMetricCalculator for ConnectedComponentCalculator {
    type Output = Vec<Vec<VertexId>>;

    fn graph_metric_description(&self) -> &'static str {
        "Calculating connected components"
    }

    #[instrument(skip(self, graph, ctx), fields(vertices = graph.vertex_count()))]
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<Vec<Vec<VertexId>>>, MetricError> {
        let positions = graph.vertex_positions();
        let n = positions.len();
        let mut tarjan = Tarjan::default();

        for (i, v) in graph.vertex_ids().enumerate() {
            if ctx.should_cancel(i, n, self.graph_metric_description()) {
                return Ok(Outcome::Cancelled);
            }
            if !tarjan.states.contains_key(&v) {
                tarjan.visit(graph, v);
            }
        }

        let mut components = tarjan.components;
        for component in &mut components {
            component.sort_by_key(|v| positions[v]);
        }
        self.sort(graph, &mut components);

        debug!(components = components.len(), "components found");
        Ok(Outcome::Complete(components))
    }
}

/// Number of edges inside each component, in the order given.
///
/// Every edge joins two vertices of the same component, so the counts sum to
/// the graph's edge count when `components` partitions its vertices.
#[must_use]
pub fn component_edge_counts(graph: &Graph, components: &[Vec<VertexId>]) -> Vec<usize> {
    components
        .iter()
        .map(|component| {
            let members: HashSet<VertexId> = component.iter().copied().collect();
            graph.edges().filter(|e| members.contains(&e.back)).count()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use nodexl_core::{Directedness, Vertex};

    use super::*;

    fn graph(directedness: Directedness, names: &[&str], edges: &[(&str, &str)]) -> Graph {
        let mut g = Graph::new(directedness);
        for name in names {
            g.get_or_add_vertex(name);
        }
        for (a, b) in edges {
            let a = g.get_or_add_vertex(a);
            let b = g.get_or_add_vertex(b);
            g.connect(a, b).expect("edge");
        }
        g
    }

    fn names(g: &Graph, components: &[Vec<VertexId>]) -> Vec<Vec<String>> {
        components
            .iter()
            .map(|c| {
                c.iter()
                    .map(|&v| g.vertex(v).expect("vertex").name.clone())
                    .collect()
            })
            .collect()
    }

    #[test]
    fn empty_graph_has_no_components() {
        let g = Graph::new(Directedness::Undirected);
        let components = ConnectedComponentCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("components");
        assert!(components.is_empty());
    }

    #[test]
    fn two_triangles() {
        let g = graph(
            Directedness::Undirected,
            &[],
            &[
                ("a", "b"),
                ("b", "c"),
                ("c", "a"),
                ("x", "y"),
                ("y", "z"),
                ("z", "x"),
            ],
        );
        let components = ConnectedComponentCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("components");
        assert_eq!(components.len(), 2);
        assert!(components.iter().all(|c| c.len() == 3));
    }

    #[test]
    fn direction_is_ignored() {
        // a → b ← c is one weakly connected component.
        let g = graph(Directedness::Directed, &[], &[("a", "b"), ("c", "b")]);
        let components = ConnectedComponentCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("components");
        assert_eq!(names(&g, &components), vec![vec!["a", "b", "c"]]);
    }

    #[test]
    fn sort_orders() {
        let g = graph(
            Directedness::Undirected,
            &["solo"],
            &[("a", "b"), ("b", "c"), ("p", "q")],
        );

        let descending = ConnectedComponentCalculator::new(ComponentSortOrder::Descending)
            .calculate_graph_metrics(&g)
            .expect("components");
        let sizes: Vec<_> = descending.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![3, 2, 1]);

        let ascending = ConnectedComponentCalculator::new(ComponentSortOrder::Ascending)
            .calculate_graph_metrics(&g)
            .expect("components");
        let sizes: Vec<_> = ascending.iter().map(Vec::len).collect();
        assert_eq!(sizes, vec![1, 2, 3]);
    }

    #[test]
    fn layout_sort_order_breaks_ties() {
        let mut g = Graph::new(Directedness::Undirected);
        let mut add = |name: &str, order: Option<f32>| {
            let mut vertex = Vertex::new(name);
            vertex.layout_sort_order = order;
            g.insert_vertex(vertex).expect("vertex")
        };
        let first = add("first", Some(5.0));
        let second = add("second", Some(2.0));
        let third = add("third", None);

        let components = ConnectedComponentCalculator::new(ComponentSortOrder::Ascending)
            .calculate_graph_metrics(&g)
            .expect("components");
        // third counts as 0, then 2.0, then 5.0.
        assert_eq!(components, vec![vec![third], vec![second], vec![first]]);
    }

    #[test]
    fn ties_keep_discovery_order_without_layout_metadata() {
        let g = graph(Directedness::Undirected, &["a", "b", "c"], &[]);
        let components = ConnectedComponentCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("components");
        assert_eq!(names(&g, &components), vec![vec!["a"], vec!["b"], vec!["c"]]);
    }

    #[test]
    fn long_path_is_one_component() {
        let n = 200_000;
        let mut g = Graph::new(Directedness::Undirected);
        let ids: Vec<VertexId> = (0..n).map(|i| g.get_or_add_vertex(&i.to_string())).collect();
        for pair in ids.windows(2) {
            g.connect(pair[0], pair[1]).expect("edge");
        }

        let components = ConnectedComponentCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("components");
        assert_eq!(components.len(), 1);
        assert_eq!(components[0].len(), n);
        assert_eq!(components[0][0], ids[0]);
    }

    #[test]
    fn edge_counts_per_component() {
        let g = graph(
            Directedness::Undirected,
            &[],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("a", "a"), ("x", "y")],
        );
        let components = ConnectedComponentCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("components");
        assert_eq!(component_edge_counts(&g, &components), vec![4, 1]);
    }
}
