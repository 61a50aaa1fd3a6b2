//! Graph-wide metrics.
//!
//! # Overview
//!
//! [`OverallMetrics`] is a snapshot of counts that describe the whole graph:
//! edge and vertex totals, duplicate and self-loop counts, density, and
//! statistics over connected components and geodesic (shortest path)
//! distances.
//!
//! # Density
//!
//! ```text
//! density = 2·E' / (V·(V-1))      halved for directed graphs
//! ```
//!
//! where `E'` counts edges after merging duplicates, self-loops excluded.
//! Graphs with fewer than two vertices have no density (`None`).
//!
//! # Geodesics
//!
//! Maximum and average hop count over every ordered pair of distinct vertices
//! joined by a path. `None` when no such pair exists.
//!
//! Geodesics need the all-pairs shortest path matrix, O(V³) time and O(V²)
//! memory, so they are only computed when asked for with
//! [`OverallMetricCalculator::with_geodesics`]. Everything else is O(V + E).
//! If the matrix cannot be allocated the geodesic fields stay `None` and the
//! remaining metrics are still returned.

use nodexl_core::{Directedness, DuplicateEdgeDetector, Graph};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::components::{
    ComponentSortOrder, ConnectedComponentCalculator, component_edge_counts,
};
use super::shortest_path::{AllPairsShortestPathCalculator, NO_PATH, ShortestPathMatrix};
use crate::calculator::{CalculationContext, GraphMetricCalculator, Outcome};
use crate::error::MetricError;

/// Graph-wide metrics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallMetrics {
    pub directedness: Directedness,
    /// Edges with no duplicate.
    pub unique_edges: usize,
    /// Edges that belong to a group of two or more duplicates.
    pub edges_with_duplicates: usize,
    pub total_edges: usize,
    pub self_loops: usize,
    pub vertices: usize,
    /// `None` for graphs with fewer than two vertices.
    pub graph_density: Option<f64>,
    pub connected_components: usize,
    /// Components made of a single vertex.
    pub single_vertex_connected_components: usize,
    pub maximum_connected_component_vertices: usize,
    pub maximum_connected_component_edges: usize,
    /// `None` unless geodesics were requested and a path exists.
    pub maximum_geodesic_distance: Option<u16>,
    pub average_geodesic_distance: Option<f64>,
}

/// Density of `graph`, or `None` when it has fewer than two vertices.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn graph_density(graph: &Graph, detector: &DuplicateEdgeDetector) -> Option<f64> {
    let v = graph.vertex_count();
    if v <= 1 {
        return None;
    }
    let edges = detector.total_edges_after_merging_duplicates_no_self_loops() as f64;
    let mut density = 2.0 * edges / (v as f64 * (v - 1) as f64);
    if graph.directedness() == Directedness::Directed {
        density /= 2.0;
    }
    Some(density.max(0.0))
}

#[allow(clippy::cast_precision_loss)]
fn geodesics(matrix: &ShortestPathMatrix) -> (Option<u16>, Option<f64>) {
    let mut max: Option<u16> = None;
    let mut sum = 0_u64;
    let mut pairs = 0_u64;

    for i in 0..matrix.len() {
        for (j, &d) in matrix.row(i).iter().enumerate() {
            if i == j || d == NO_PATH {
                continue;
            }
            max = Some(max.map_or(d, |m| m.max(d)));
            sum += u64::from(d);
            pairs += 1;
        }
    }

    let average = (pairs > 0).then(|| sum as f64 / pairs as f64);
    (max, average)
}

/// Calculates [`OverallMetrics`].
#[derive(Debug, Clone, Copy, Default)]
pub struct OverallMetricCalculator {
    geodesics: bool,
}

impl OverallMetricCalculator {
    /// Calculator that also fills the geodesic fields when `geodesics` is set.
    #[must_use]
    pub const fn with_geodesics(geodesics: bool) -> Self {
        Self { geodesics }
    }

    /// Whether geodesic statistics are calculated.
    #[must_use]
    pub const fn geodesics(&self) -> bool {
        self.geodesics
    }
}

impl GraphMetricCalculator for OverallMetricCalculator {
    type Output = OverallMetrics;

    fn graph_metric_description(&self) -> &'static str {
        "Calculating overall metrics"
    }

    #[instrument(skip(self, graph, ctx), fields(vertices = graph.vertex_count()))]
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<OverallMetrics>, MetricError> {
        if ctx.should_cancel(0, 3, self.graph_metric_description()) {
            return Ok(Outcome::Cancelled);
        }
        let detector = DuplicateEdgeDetector::new(graph);

        let Outcome::Complete(components) =
            ConnectedComponentCalculator::new(ComponentSortOrder::Descending)
                .try_calculate_graph_metrics(graph, ctx)?
        else {
            return Ok(Outcome::Cancelled);
        };

        let (maximum_geodesic_distance, average_geodesic_distance) = if self.geodesics {
            match AllPairsShortestPathCalculator.try_calculate_graph_metrics(graph, ctx) {
                Ok(Outcome::Complete(matrix)) => geodesics(&matrix),
                Ok(Outcome::Cancelled) => return Ok(Outcome::Cancelled),
                Err(MetricError::CannotCalculate(message)) => {
                    warn!(%message, "skipping geodesic distances");
                    (None, None)
                }
                Err(err) => return Err(err),
            }
        } else {
            (None, None)
        };

        let edge_counts = component_edge_counts(graph, &components);

        let metrics = OverallMetrics {
            directedness: graph.directedness(),
            unique_edges: detector.unique_edge_count(),
            edges_with_duplicates: detector.edges_with_duplicates_count(),
            total_edges: graph.edge_count(),
            self_loops: graph.self_loop_count(),
            vertices: graph.vertex_count(),
            graph_density: graph_density(graph, &detector),
            connected_components: components.len(),
            single_vertex_connected_components: components
                .iter()
                .filter(|c| c.len() == 1)
                .count(),
            maximum_connected_component_vertices: components
                .iter()
                .map(Vec::len)
                .max()
                .unwrap_or(0),
            maximum_connected_component_edges: edge_counts.into_iter().max().unwrap_or(0),
            maximum_geodesic_distance,
            average_geodesic_distance,
        };
        debug!(?metrics, "overall metrics");
        Ok(Outcome::Complete(metrics))
    }
}

#[cfg(test)]
mod tests {
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

    fn overall(g: &Graph) -> OverallMetrics {
        OverallMetricCalculator::with_geodesics(true)
            .calculate_graph_metrics(g)
            .expect("overall")
    }

    #[test]
    fn tiny_graphs_have_no_density() {
        assert_eq!(overall(&graph(Directedness::Directed, &[], &[])).graph_density, None);
        assert_eq!(
            overall(&graph(Directedness::Directed, &["solo"], &[])).graph_density,
            None
        );
    }

    #[test]
    fn complete_undirected_density_is_one() {
        let g = graph(
            Directedness::Undirected,
            &[],
            &[("a", "b"), ("b", "c"), ("c", "a")],
        );
        let density = overall(&g).graph_density.expect("density");
        assert!((density - 1.0).abs() < 1e-10);
    }

    #[test]
    fn directed_density_is_halved() {
        // One arc between two vertices: 2·1 / (2·1) / 2 = 0.5.
        let g = graph(Directedness::Directed, &[], &[("a", "b")]);
        let density = overall(&g).graph_density.expect("density");
        assert!((density - 0.5).abs() < 1e-10);
    }

    #[test]
    fn duplicates_and_self_loops() {
        let g = graph(
            Directedness::Undirected,
            &[],
            &[("a", "b"), ("b", "a"), ("b", "c"), ("c", "c")],
        );
        let m = overall(&g);
        assert_eq!(m.total_edges, 4);
        assert_eq!(m.self_loops, 1);
        assert_eq!(m.edges_with_duplicates, 2);
        assert_eq!(m.unique_edges, 2);
        // Merged without self-loops: a-b, b-c over 3 vertices.
        let density = m.graph_density.expect("density");
        assert!((density - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn component_and_geodesic_statistics() {
        // Path a-b-c-d, pair x-y, isolated z.
        let mut g = graph(
            Directedness::Undirected,
            &[],
            &[("a", "b"), ("b", "c"), ("c", "d"), ("x", "y")],
        );
        g.get_or_add_vertex("z");
        let m = overall(&g);

        assert_eq!(m.vertices, 7);
        assert_eq!(m.connected_components, 3);
        assert_eq!(m.single_vertex_connected_components, 1);
        assert_eq!(m.maximum_connected_component_vertices, 4);
        assert_eq!(m.maximum_connected_component_edges, 3);
        assert_eq!(m.maximum_geodesic_distance, Some(3));

        // Path pairs: 1,2,3,1,2,1 each both ways → 20 over 12; pair: 1 both
        // ways → 2 over 2. Total 22 / 14.
        let average = m.average_geodesic_distance.expect("average");
        assert!((average - 22.0 / 14.0).abs() < 1e-10);
    }

    #[test]
    fn geodesics_are_opt_in() {
        let g = graph(Directedness::Undirected, &[], &[("a", "b"), ("b", "c")]);
        let m = OverallMetricCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("overall");
        assert_eq!(m.maximum_geodesic_distance, None);
        assert_eq!(m.average_geodesic_distance, None);
        assert_eq!(m.connected_components, 1);
        let density = m.graph_density.expect("density");
        assert!((density - 2.0 / 3.0).abs() < 1e-10);
    }

    #[test]
    fn long_path_without_geodesics() {
        // Far past what an all-pairs matrix could handle quickly.
        let n = 100_000_usize;
        let mut g = Graph::new(Directedness::Undirected);
        let ids: Vec<_> = (0..n).map(|i| g.get_or_add_vertex(&i.to_string())).collect();
        for pair in ids.windows(2) {
            g.connect(pair[0], pair[1]).expect("edge");
        }

        let m = OverallMetricCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("overall");
        assert_eq!(m.total_edges, n - 1);
        assert_eq!(m.connected_components, 1);
        assert_eq!(m.maximum_connected_component_edges, n - 1);
        assert!(m.graph_density.expect("density") > 0.0);
    }

    #[test]
    fn edgeless_graph_has_no_geodesics() {
        let m = overall(&graph(Directedness::Undirected, &["a", "b"], &[]));
        assert_eq!(m.maximum_geodesic_distance, None);
        assert_eq!(m.average_geodesic_distance, None);
        assert_eq!(m.graph_density, Some(0.0));
    }
}
