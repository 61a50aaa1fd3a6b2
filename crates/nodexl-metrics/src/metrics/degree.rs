//! In, out and total degree per vertex.
//!
//! Every incident edge adds to the out-degree when the vertex is its back
//! (source) vertex and to the in-degree when the vertex is its front (target)
//! vertex. Both are tested, so a self-loop adds one to each. Undirected edges
//! count by the orientation they were stored with.

use std::collections::BTreeMap;

use nodexl_core::{Graph, VertexId};
use serde::Serialize;
use tracing::instrument;

use crate::calculator::{CalculationContext, GraphMetricCalculator, Outcome};
use crate::error::MetricError;

/// Degrees of one vertex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct VertexDegrees {
    pub in_degree: usize,
    pub out_degree: usize,
    /// `in_degree + out_degree`.
    pub degree: usize,
}

/// Calculates [`VertexDegrees`] for every vertex.
#[derive(Debug, Clone, Copy, Default)]
pub struct VertexDegreeCalculator;

impl VertexDegreeCalculator {
    /// Degrees of a single vertex.
    #[must_use]
    pub fn degrees_of(graph: &Graph, vertex: VertexId) -> VertexDegrees {
        let mut degrees = VertexDegrees::default();
        for edge in graph.incident_edges(vertex) {
            if edge.back == vertex {
                degrees.out_degree += 1;
            }
            if edge.front == vertex {
                degrees.in_degree += 1;
            }
        }
        degrees.degree = degrees.in_degree + degrees.out_degree;
        degrees
    }
}

impl GraphMetricCalculator for VertexDegreeCalculator {
    type Output = BTreeMap<VertexId, VertexDegrees>;

    fn graph_metric_description(&self) -> &'static str {
        "Calculating vertex degrees"
    }

    #[instrument(skip(self, graph, ctx), fields(vertices = graph.vertex_count()))]
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<Self::Output>, MetricError> {
        let n = graph.vertex_count();
        let mut result = BTreeMap::new();
        for (i, vertex) in graph.vertex_ids().enumerate() {
            if i % 100 == 0 && ctx.should_cancel(i, n, self.graph_metric_description()) {
                return Ok(Outcome::Cancelled);
            }
            result.insert(vertex, Self::degrees_of(graph, vertex));
        }
        Ok(Outcome::Complete(result))
    }
}
