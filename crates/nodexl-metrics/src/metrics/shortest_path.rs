//! All-pairs shortest paths via Floyd–Warshall.
//!
//! # Algorithm
//!
//! Edges are unweighted and adjacency is boolean, so self-loops and parallel
//! edges change nothing. With vertices numbered by enumeration position:
//!
//! 1. `d[i][j] = 1` when `j ≠ i` is a successor of `i`, `d[i][i] = 0`, every
//!    other cell is [`NO_PATH`].
//! 2. For each intermediate `k`, relax `d[i][j] = min(d[i][j], d[i][k] + d[k][j])`,
//!    skipping pairs where either leg is [`NO_PATH`].
//!
//! Complexity: O(V³) time, O(V²) memory. The matrix holds `u16` distances,
//! and allocation failure is reported as [`MetricError::CannotCalculate`]
//! instead of aborting the process.

use std::collections::HashMap;

use nodexl_core::{Graph, VertexId};
use tracing::instrument;

use crate::calculator::{CalculationContext, GraphMetricCalculator, Outcome};
use crate::error::MetricError;

/// Distance stored for unreachable pairs.
pub const NO_PATH: u16 = u16::MAX;

/// Dense V×V hop-count matrix indexed by vertex enumeration position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortestPathMatrix {
    vertices: Vec<VertexId>,
    positions: HashMap<VertexId, usize>,
    distances: Vec<u16>,
}

impl ShortestPathMatrix {
    /// Vertices in matrix order.
    #[must_use]
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Number of rows (and columns).
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Whether the matrix is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Distance from row `i` to column `j`, or [`NO_PATH`].
    ///
    /// # Panics
    ///
    /// Panics if either position is out of range.
    #[must_use]
    pub fn distance(&self, i: usize, j: usize) -> u16 {
        let n = self.len();
        assert!(i < n && j < n, "position out of range");
        self.distances[i * n + j]
    }

    /// Distances from row `i` to every column.
    #[must_use]
    pub fn row(&self, i: usize) -> &[u16] {
        let n = self.len();
        &self.distances[i * n..(i + 1) * n]
    }

    /// Hop count from `from` to `to`; `None` when unreachable or when either
    /// vertex is not in the matrix.
    #[must_use]
    pub fn distance_between(&self, from: VertexId, to: VertexId) -> Option<u16> {
        let i = *self.positions.get(&from)?;
        let j = *self.positions.get(&to)?;
        let d = self.distance(i, j);
        (d != NO_PATH).then_some(d)
    }
}

fn not_enough_memory(n: usize) -> MetricError {
    MetricError::CannotCalculate(format!(
        "There is not enough memory to calculate shortest paths for a graph with {n} vertices."
    ))
}

/// Calculates a [`ShortestPathMatrix`].
#[derive(Debug, Clone, Copy, Default)]
pub struct AllPairsShortestPathCalculator;

impl GraphMetricCalculator for AllPairsShortestPathCalculator {
    type Output = ShortestPathMatrix;

    fn graph_metric_description(&self) -> &'static str {
        "Calculating shortest paths"
    }

    #[instrument(skip(self, graph, ctx), fields(vertices = graph.vertex_count()))]
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<ShortestPathMatrix>, MetricError> {
        let vertices: Vec<VertexId> = graph.vertex_ids().collect();
        let positions = graph.vertex_positions();
        let n = vertices.len();

        let cells = n.checked_mul(n).ok_or_else(|| not_enough_memory(n))?;
        let mut d: Vec<u16> = Vec::new();
        d.try_reserve_exact(cells).map_err(|_| not_enough_memory(n))?;
        d.resize(cells, NO_PATH);

        for (i, &v) in vertices.iter().enumerate() {
            d[i * n + i] = 0;
            for w in graph.successors(v) {
                let j = positions[&w];
                if j != i {
                    d[i * n + j] = 1;
                }
            }
        }

        for k in 0..n {
            if ctx.should_cancel(k, n, self.graph_metric_description()) {
                return Ok(Outcome::Cancelled);
            }
            for i in 0..n {
                let dik = d[i * n + k];
                if dik == NO_PATH {
                    continue;
                }
                for j in 0..n {
                    let dkj = d[k * n + j];
                    if dkj == NO_PATH {
                        continue;
                    }
                    let through = dik.saturating_add(dkj);
                    if through < d[i * n + j] {
                        d[i * n + j] = through;
                    }
                }
            }
        }

        Ok(Outcome::Complete(ShortestPathMatrix {
            vertices,
            positions,
            distances: d,
        }))
    }
}

#[cfg(test)]
mod tests {
    use nodexl_core::Directedness;

    use super::*;

    fn build(directedness: Directedness, n: usize, edges: &[(usize, usize)]) -> (Graph, Vec<VertexId>) {
        let mut g = Graph::new(directedness);
        let ids: Vec<_> = (0..n).map(|i| g.get_or_add_vertex(&i.to_string())).collect();
        for &(a, b) in edges {
            g.connect(ids[a], ids[b]).expect("edge");
        }
        (g, ids)
    }

    #[test]
    fn empty_graph() {
        let (g, _) = build(Directedness::Directed, 0, &[]);
        let m = AllPairsShortestPathCalculator
            .calculate_graph_metrics(&g)
            .expect("matrix");
        assert!(m.is_empty());
    }

    #[test]
    fn directed_chain() {
        // 0 → 1 → 2
        let (g, ids) = build(Directedness::Directed, 3, &[(0, 1), (1, 2)]);
        let m = AllPairsShortestPathCalculator
            .calculate_graph_metrics(&g)
            .expect("matrix");

        assert_eq!(m.row(0), &[0, 1, 2]);
        assert_eq!(m.row(1), &[NO_PATH, 0, 1]);
        assert_eq!(m.row(2), &[NO_PATH, NO_PATH, 0]);
        assert_eq!(m.distance_between(ids[0], ids[2]), Some(2));
        assert_eq!(m.distance_between(ids[2], ids[0]), None);
    }

    #[test]
    fn undirected_cycle_is_symmetric() {
        let (g, _) = build(
            Directedness::Undirected,
            5,
            &[(0, 1), (1, 2), (2, 3), (3, 4), (4, 0)],
        );
        let m = AllPairsShortestPathCalculator
            .calculate_graph_metrics(&g)
            .expect("matrix");
        for i in 0..5 {
            for j in 0..5 {
                assert_eq!(m.distance(i, j), m.distance(j, i));
            }
        }
        assert_eq!(m.distance(0, 2), 2);
        assert_eq!(m.distance(0, 3), 2);
    }

    #[test]
    fn self_loops_and_duplicates_ignored() {
        let (g, _) = build(Directedness::Directed, 2, &[(0, 0), (0, 1), (0, 1)]);
        let m = AllPairsShortestPathCalculator
            .calculate_graph_metrics(&g)
            .expect("matrix");
        assert_eq!(m.row(0), &[0, 1]);
    }

    #[test]
    fn cancelled_before_first_pass() {
        let (g, _) = build(Directedness::Directed, 3, &[(0, 1)]);
        let token = crate::calculator::CancellationToken::new();
        token.cancel();
        let outcome = AllPairsShortestPathCalculator
            .try_calculate_graph_metrics(&g, &CalculationContext::with_token(token))
            .expect("cancellation is not an error");
        assert!(outcome.is_cancelled());
    }
}
