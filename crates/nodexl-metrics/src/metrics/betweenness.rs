//! Betweenness centrality via Brandes' algorithm.
//!
//! # Overview
//!
//! Betweenness centrality measures how often a vertex lies on shortest paths
//! between other pairs of vertices. High-betweenness vertices are bridges:
//! removing them lengthens or breaks many paths.
//!
//! # Algorithm
//!
//! Brandes (2001) for unweighted graphs, following [`Graph::successors`]:
//!
//! 1. For each source `s`, run BFS to compute shortest-path counts (`sigma`),
//!    distances and predecessor lists.
//! 2. Accumulate dependency scores in reverse BFS order (farthest first).
//! 3. Sum the dependency scores across all sources.
//!
//! Complexity: O(V·E).
//!
//! # Output
//!
//! Undirected graphs count every path twice (once from each end), so their
//! sums are halved. Scores are then divided by the largest score, so the
//! most central vertex gets 1.0. When every score is 0 they all stay 0. The
//! textbook `(n-1)(n-2)` normaliser is not applied.

use std::collections::VecDeque;

use nodexl_core::{Directedness, Graph, VertexId};
use tracing::instrument;

use super::VertexMetrics;
use crate::calculator::{CalculationContext, GraphMetricCalculator, Outcome};
use crate::error::MetricError;

/// Sources processed between cancellation checks.
const CHECK_INTERVAL: usize = 100;

/// Calculates betweenness centrality, scaled so the maximum is 1.0.
#[derive(Debug, Clone, Copy, Default)]
pub struct BetweennessCentralityCalculator;

impl GraphMetricCalculator for BetweennessCentralityCalculator {
    type Output = VertexMetrics;

    fn graph_metric_description(&self) -> &'static str {
        "Calculating betweenness centralities"
    }

    #[instrument(skip(self, graph, ctx), fields(vertices = graph.vertex_count()))]
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<VertexMetrics>, MetricError> {
        let vertices: Vec<VertexId> = graph.vertex_ids().collect();
        let n = vertices.len();
        if n == 0 {
            return Ok(Outcome::Complete(VertexMetrics::new()));
        }

        let positions = graph.vertex_positions();
        let successors: Vec<Vec<usize>> = vertices
            .iter()
            .map(|&v| graph.successors(v).iter().map(|w| positions[w]).collect())
            .collect();

        // Vertex-indexed betweenness accumulator.
        let mut cb: Vec<f64> = vec![0.0; n];

        for s in 0..n {
            if s % CHECK_INTERVAL == 0
                && ctx.should_cancel(s, n, self.graph_metric_description())
            {
                return Ok(Outcome::Cancelled);
            }

            // Stack: vertices in order of discovery (farthest popped first).
            let mut stack: Vec<usize> = Vec::with_capacity(n);

            // predecessors[w]: vertices that immediately precede w on
            // shortest paths from s.
            let mut predecessors: Vec<Vec<usize>> = vec![Vec::new(); n];

            // sigma[t]: number of shortest paths from s to t.
            let mut sigma: Vec<f64> = vec![0.0; n];
            sigma[s] = 1.0;

            // dist[t]: distance from s to t (-1 = unvisited).
            let mut dist: Vec<i64> = vec![-1; n];
            dist[s] = 0;

            let mut queue: VecDeque<usize> = VecDeque::new();
            queue.push_back(s);

            while let Some(v) = queue.pop_front() {
                stack.push(v);

                for &w in &successors[v] {
                    // First visit to w?
                    if dist[w] < 0 {
                        dist[w] = dist[v] + 1;
                        queue.push_back(w);
                    }

                    // Shortest path to w via v?
                    if dist[w] == dist[v] + 1 {
                        sigma[w] += sigma[v];
                        predecessors[w].push(v);
                    }
                }
            }

            // Accumulate dependencies in reverse BFS order.
            let mut delta: Vec<f64> = vec![0.0; n];

            while let Some(w) = stack.pop() {
                for &v in &predecessors[w] {
                    if sigma[w] > 0.0 {
                        delta[v] += (sigma[v] / sigma[w]) * (1.0 + delta[w]);
                    }
                }

                if w != s {
                    cb[w] += delta[w];
                }
            }
        }

        if graph.directedness() == Directedness::Undirected {
            for score in &mut cb {
                *score /= 2.0;
            }
        }

        let max = cb.iter().copied().fold(0.0_f64, f64::max);
        if max > 0.0 {
            for score in &mut cb {
                *score /= max;
            }
        }

        Ok(Outcome::Complete(vertices.into_iter().zip(cb).collect()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
