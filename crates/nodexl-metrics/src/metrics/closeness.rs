//! Closeness centrality: mean hop count from a vertex to every vertex it can
//! reach. Lower means more central. A vertex that reaches nobody scores 0.

use nodexl_core::Graph;
use tracing::instrument;

use super::VertexMetrics;
use super::shortest_path::{AllPairsShortestPathCalculator, NO_PATH};
use crate::calculator::{CalculationContext, GraphMetricCalculator, Outcome};
use crate::error::MetricError;

/// Calculates closeness centrality from the all-pairs shortest path matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClosenessCentralityCalculator;

impl GraphMetricCalculator for ClosenessCentralityCalculator {
    type Output = VertexMetrics;

    fn graph_metric_description(&self) -> &'static str {
        "Calculating closeness centralities"
    }

    #[instrument(skip(self, graph, ctx), fields(vertices = graph.vertex_count()))]
    #[allow(clippy::cast_precision_loss)]
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<VertexMetrics>, MetricError> {
        let Outcome::Complete(matrix) =
            AllPairsShortestPathCalculator.try_calculate_graph_metrics(graph, ctx)?
        else {
            return Ok(Outcome::Cancelled);
        };

        let mut result = VertexMetrics::new();
        for (i, &vertex) in matrix.vertices().iter().enumerate() {
            let (sum, count) = matrix
                .row(i)
                .iter()
                .enumerate()
                .filter(|&(j, &d)| j != i && d != NO_PATH)
                .fold((0_u64, 0_u64), |(sum, count), (_, &d)| {
                    (sum + u64::from(d), count + 1)
                });

            let closeness = if count == 0 {
                0.0
            } else {
                sum as f64 / count as f64
            };
            result.insert(vertex, closeness);
        }

        Ok(Outcome::Complete(result))
    }
}

#[cfg(test)]
mod tests {
    use nodexl_core::Directedness;

    use super::*;

    #[test]
    fn isolated_vertex_is_zero() {
        let mut g = Graph::new(Directedness::Undirected);
        let a = g.get_or_add_vertex("A");
        let b = g.get_or_add_vertex("B");
        let lonely = g.get_or_add_vertex("lonely");
        g.connect(a, b).expect("edge");

        let scores = ClosenessCentralityCalculator
            .calculate_graph_metrics(&g)
            .expect("closeness");
        assert!(scores[&lonely].abs() < 1e-10);
        assert!((scores[&a] - 1.0).abs() < 1e-10);
    }

    #[test]
    fn path_endpoints_average_farther() {
        // A - B - C: A reaches B at 1 and C at 2 → 1.5. B reaches both at 1.
        let mut g = Graph::new(Directedness::Undirected);
        let a = g.get_or_add_vertex("A");
        let b = g.get_or_add_vertex("B");
        let c = g.get_or_add_vertex("C");
        g.connect(a, b).expect("edge");
        g.connect(b, c).expect("edge");

        let scores = ClosenessCentralityCalculator
            .calculate_graph_metrics(&g)
            .expect("closeness");
        assert!((scores[&a] - 1.5).abs() < 1e-10);
        assert!((scores[&b] - 1.0).abs() < 1e-10);
        assert!((scores[&c] - 1.5).abs() < 1e-10);
    }

    #[test]
    fn directed_sink_reaches_nobody() {
        let mut g = Graph::new(Directedness::Directed);
        let a = g.get_or_add_vertex("A");
        let b = g.get_or_add_vertex("B");
        g.connect(a, b).expect("edge");

        let scores = ClosenessCentralityCalculator
            .calculate_graph_metrics(&g)
            .expect("closeness");
        assert!((scores[&a] - 1.0).abs() < 1e-10);
        assert!(scores[&b].abs() < 1e-10);
    }

    #[test]
    fn cancellation_propagates() {
        let token = crate::calculator::CancellationToken::new();
        token.cancel();
        let mut g = Graph::new(Directedness::Directed);
        g.get_or_add_vertex("A");
        let outcome = ClosenessCentralityCalculator
            .try_calculate_graph_metrics(&g, &CalculationContext::with_token(token))
            .expect("not an error");
        assert!(outcome.is_cancelled());
    }
}
