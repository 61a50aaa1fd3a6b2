//! Eigenvector centrality via power iteration.
//!
//! # Overview
//!
//! Eigenvector centrality scores vertices on the idea that connections to
//! high-scoring vertices contribute more to a vertex's score. It is the
//! dominant eigenvector of the adjacency matrix.
//!
//! # Algorithm
//!
//! Power iteration on the undirected adjacency matrix, computed without
//! materialising the matrix:
//!
//! 1. Initialise scores uniformly.
//! 2. For each vertex `v`: `e*(v) = Σ e(u)` over [`Graph::adjacent_vertices`]
//!    of `v`, excluding `v` itself.
//! 3. `lambda = ‖e*‖₂`; `e = e* / lambda`. If `lambda` is 0 every score is 0
//!    and the iteration ends.
//! 4. After at least two iterations, stop once `lambda` changes by no more
//!    than 0.0001 %; otherwise stop after 100 iterations.
//!
//! Edge direction is ignored, so DAGs and sinks still get meaningful scores.
//! Vertices in a component that does not hold the dominant eigenvector tend
//! to 0. On bipartite graphs `lambda` can settle while the scores still
//! alternate between two vectors; the last one computed is returned.

use nodexl_core::{Graph, VertexId};
use tracing::{debug, instrument};

use super::VertexMetrics;
use crate::calculator::{CalculationContext, GraphMetricCalculator, Outcome};
use crate::error::MetricError;

/// Iteration cap.
pub const MAX_ITERATIONS: usize = 100;

/// Largest change in `lambda`, in percent, that counts as converged.
const CONVERGENCE_PERCENT: f64 = 0.0001;

/// Result of eigenvector centrality computation.
#[derive(Debug, Clone, PartialEq)]
pub struct EigenvectorResult {
    /// Eigenvector centrality scores: vertex → score.
    pub scores: VertexMetrics,
    /// Number of iterations performed.
    pub iterations: usize,
    /// Whether `lambda` settled before the iteration cap.
    pub converged: bool,
}

/// Calculates eigenvector centrality.
#[derive(Debug, Clone, Copy, Default)]
pub struct EigenvectorCentralityCalculator;

impl GraphMetricCalculator for EigenvectorCentralityCalculator {
    type Output = EigenvectorResult;

    fn graph_metric_description(&self) -> &'static str {
        "Calculating eigenvector centralities"
    }

    #[instrument(skip(self, graph, ctx), fields(vertices = graph.vertex_count()))]
    #[allow(clippy::cast_precision_loss)]
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<EigenvectorResult>, MetricError> {
        let vertices: Vec<VertexId> = graph.vertex_ids().collect();
        let n = vertices.len();

        if n == 0 {
            return Ok(Outcome::Complete(EigenvectorResult {
                scores: VertexMetrics::new(),
                iterations: 0,
                converged: true,
            }));
        }

        let positions = graph.vertex_positions();
        let neighbors: Vec<Vec<usize>> = vertices
            .iter()
            .map(|&v| {
                graph
                    .adjacent_vertices(v)
                    .into_iter()
                    .filter(|&u| u != v)
                    .map(|u| positions[&u])
                    .collect()
            })
            .collect();

        // Initialize scores uniformly.
        let init_val = 1.0 / (n as f64).sqrt();
        let mut scores: Vec<f64> = vec![init_val; n];

        let mut converged = false;
        let mut iterations = 0;
        let mut previous_lambda = 0.0_f64;

        for iter in 0..MAX_ITERATIONS {
            if ctx.should_cancel(iter, MAX_ITERATIONS, self.graph_metric_description()) {
                return Ok(Outcome::Cancelled);
            }
            iterations = iter + 1;

            let new_scores: Vec<f64> = neighbors
                .iter()
                .map(|nbrs| nbrs.iter().map(|&u| scores[u]).sum())
                .collect();

            let lambda = new_scores.iter().map(|s| s * s).sum::<f64>().sqrt();
            if lambda == 0.0 {
                scores = vec![0.0; n];
                converged = true;
                break;
            }

            scores = new_scores.into_iter().map(|s| s / lambda).collect();

            if iterations >= 2 {
                let change = ((lambda - previous_lambda) / previous_lambda).abs() * 100.0;
                if change <= CONVERGENCE_PERCENT {
                    converged = true;
                    break;
                }
            }
            previous_lambda = lambda;
        }

        debug!(iterations, converged, "eigenvector centrality finished");

        Ok(Outcome::Complete(EigenvectorResult {
            scores: vertices.into_iter().zip(scores).collect(),
            iterations,
            converged,
        }))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
