//! Clustering coefficient: the fraction of possible edges among a vertex's
//! neighbours that actually exist.
//!
//! For a vertex with `k` distinct neighbours (itself excluded), the
//! coefficient is the number of distinct edges joining two neighbours divided
//! by `k(k-1)` in a directed graph, or `k(k-1)/2` otherwise. Vertices with
//! fewer than two neighbours score 0.
//!
//! Parallel edges between the same neighbours count once, so the result is
//! only meaningful for graphs without duplicate edges. Callers that care
//! should check [`nodexl_core::DuplicateEdgeDetector`] first.

use std::collections::HashSet;

use nodexl_core::{Directedness, Graph, VertexId};
use tracing::instrument;

use super::VertexMetrics;
use crate::calculator::{CalculationContext, GraphMetricCalculator, Outcome};
use crate::error::MetricError;

/// Calculates the clustering coefficient of every vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClusteringCoefficientCalculator;

impl ClusteringCoefficientCalculator {
    #[allow(clippy::cast_precision_loss)]
    fn coefficient(graph: &Graph, vertex: VertexId) -> f64 {
        let neighbours: HashSet<VertexId> = graph
            .adjacent_vertices(vertex)
            .into_iter()
            .filter(|&v| v != vertex)
            .collect();
        let k = neighbours.len();
        if k < 2 {
            return 0.0;
        }

        // (back, front, is_directed); undirected keys are ordered low → high.
        let mut edges: HashSet<(VertexId, VertexId, bool)> = HashSet::new();
        for &neighbour in &neighbours {
            for edge in graph.incident_edges(neighbour) {
                if edge.is_self_loop() {
                    continue;
                }
                let other = edge.opposite(neighbour);
                if !neighbours.contains(&other) {
                    continue;
                }
                let key = if edge.is_directed() {
                    (edge.back, edge.front, true)
                } else {
                    (edge.back.min(edge.front), edge.back.max(edge.front), false)
                };
                edges.insert(key);
            }
        }

        let possible = if graph.directedness() == Directedness::Directed {
            k * (k - 1)
        } else {
            k * (k - 1) / 2
        };
        edges.len() as f64 / possible as f64
    }
}

impl GraphMetricCalculator for ClusteringCoefficientCalculator {
    type Output = VertexMetrics;

    fn graph_metric_description(&self) -> &'static str {
        "Calculating clustering coefficients"
    }

    #[instrument(skip(self, graph, ctx), fields(vertices = graph.vertex_count()))]
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<VertexMetrics>, MetricError> {
        let n = graph.vertex_count();
        let mut result = VertexMetrics::new();

        for (i, vertex) in graph.vertex_ids().enumerate() {
            if i % 100 == 0 && ctx.should_cancel(i, n, self.graph_metric_description()) {
                return Ok(Outcome::Cancelled);
            }
            result.insert(vertex, Self::coefficient(graph, vertex));
        }

        Ok(Outcome::Complete(result))
    }
}
