//! PageRank by power iteration, in process.
//!
//! # Algorithm
//!
//! ```text
//! PR(v) = (1 - d) / N + d * Σ PR(u) / out_degree(u)   for each u → v
//! ```
//!
//! where `d` is the damping factor (default 0.85). Out-degree counts distinct
//! successors, so parallel edges do not add weight and undirected edges are
//! followed both ways. A vertex with no successors spreads its rank evenly
//! over every vertex. Iteration stops when the L1 change drops below the
//! tolerance or after `max_iter` rounds.

use nodexl_core::{Graph, VertexId};
use tracing::{debug, instrument, warn};

use super::{SnapBackend, SnapError, SnapMetric, SnapMetrics, SnapResults};
use crate::calculator::{CalculationContext, Outcome};
use crate::error::MetricError;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for PageRank computation.
#[derive(Debug, Clone)]
pub struct PageRankConfig {
    /// Damping factor (probability of following a link vs teleporting).
    /// Default: 0.85.
    pub damping: f64,
    /// Convergence threshold: stop when L1 norm of rank delta < tolerance.
    /// Default: 1e-6.
    pub tolerance: f64,
    /// Maximum number of iterations.
    /// Default: 100.
    pub max_iter: usize,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iter: 100,
        }
    }
}

/// [`SnapBackend`] that computes [`SnapMetric::PageRank`] without an external
/// process. Any other metric is [`SnapError::Unsupported`].
#[derive(Debug, Clone, Default)]
pub struct InProcessPageRank {
    config: PageRankConfig,
}

impl InProcessPageRank {
    /// Backend with the given configuration.
    #[must_use]
    pub const fn new(config: PageRankConfig) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub const fn config(&self) -> &PageRankConfig {
        &self.config
    }

    /// Power iteration. Returns `None` if cancelled.
    #[allow(clippy::cast_precision_loss)]
    fn ranks(&self, graph: &Graph, ctx: &CalculationContext<'_>) -> Option<Vec<f64>> {
        const STATUS: &str = "Calculating PageRank";

        let vertices: Vec<VertexId> = graph.vertex_ids().collect();
        let n = vertices.len();
        if n == 0 {
            return Some(Vec::new());
        }

        let positions = graph.vertex_positions();
        let successors: Vec<Vec<usize>> = vertices
            .iter()
            .map(|&v| graph.successors(v).iter().map(|w| positions[w]).collect())
            .collect();

        let config = &self.config;
        let n_f64 = n as f64;
        let base = (1.0 - config.damping) / n_f64;

        // Initialize ranks uniformly.
        let mut ranks = vec![1.0 / n_f64; n];
        let mut new_ranks = vec![0.0_f64; n];

        let mut iterations = 0;
        let mut converged = false;

        for iteration in 0..config.max_iter {
            if ctx.should_cancel(iteration, config.max_iter, STATUS) {
                return None;
            }
            iterations += 1;

            // Dangling vertices spread their rank over every vertex.
            let dangling: f64 = successors
                .iter()
                .zip(&ranks)
                .filter(|(out, _)| out.is_empty())
                .map(|(_, r)| r)
                .sum();
            let teleport = base + config.damping * dangling / n_f64;
            new_ranks.fill(teleport);

            for (u, out) in successors.iter().enumerate() {
                if out.is_empty() {
                    continue;
                }
                let share = config.damping * ranks[u] / out.len() as f64;
                for &w in out {
                    new_ranks[w] += share;
                }
            }

            // Check convergence: L1 norm of delta.
            let delta: f64 = ranks
                .iter()
                .zip(&new_ranks)
                .map(|(old, new)| (old - new).abs())
                .sum();

            std::mem::swap(&mut ranks, &mut new_ranks);

            if delta < config.tolerance {
                converged = true;
                break;
            }
        }

        if converged {
            debug!(iterations, "PageRank converged");
        } else {
            warn!(iterations, "PageRank did not converge");
        }
        Some(ranks)
    }
}

impl SnapBackend for InProcessPageRank {
    #[instrument(skip(self, graph, ctx))]
    fn calculate(
        &self,
        graph: &Graph,
        metrics: SnapMetrics,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<SnapResults>, MetricError> {
        if let Some(other) = metrics.iter().find(|m| *m != SnapMetric::PageRank) {
            return Err(SnapError::Unsupported(other).into());
        }

        let mut results = SnapResults::default();
        if !metrics.contains(SnapMetric::PageRank) {
            return Ok(Outcome::Complete(results));
        }

        let Some(ranks) = self.ranks(graph, ctx) else {
            return Ok(Outcome::Cancelled);
        };
        results.insert(SnapMetric::PageRank, graph.vertex_ids().zip(ranks).collect());
        Ok(Outcome::Complete(results))
    }
}

#[cfg(test)]
mod tests {
    use nodexl_core::Directedness;

    use super::*;
    use crate::calculator::CancellationToken;

    fn directed(edges: &[(&str, &str)]) -> Graph {
        let mut g = Graph::new(Directedness::Directed);
        for (a, b) in edges {
            let a = g.get_or_add_vertex(a);
            let b = g.get_or_add_vertex(b);
            g.connect(a, b).expect("edge");
        }
        g
    }

    fn page_rank(g: &Graph) -> Vec<f64> {
        let outcome = InProcessPageRank::default()
            .calculate(g, SnapMetrics::PAGE_RANK, &CalculationContext::detached())
            .expect("page rank");
        let Outcome::Complete(mut results) = outcome else {
            panic!("not cancelled");
        };
        let column = results.take(SnapMetric::PageRank).expect("column");
        g.vertex_ids().map(|v| column[&v]).collect()
    }

    #[test]
    fn empty_graph_yields_empty_column() {
        let g = Graph::new(Directedness::Directed);
        assert!(page_rank(&g).is_empty());
    }

    #[test]
    fn ranks_sum_to_one() {
        let g = directed(&[("A", "B"), ("B", "C"), ("C", "A"), ("C", "D")]);
        let total: f64 = page_rank(&g).iter().sum();
        assert!((total - 1.0).abs() < 1e-6, "sum = {total}");
    }

    #[test]
    fn cycle_is_uniform() {
        let g = directed(&[("A", "B"), ("B", "C"), ("C", "A")]);
        for r in page_rank(&g) {
            assert!((r - 1.0 / 3.0).abs() < 1e-6);
        }
    }

    #[test]
    fn sink_outranks_sources() {
        // A → C, B → C: C collects the rank of both sources.
        let g = directed(&[("A", "C"), ("B", "C")]);
        let ranks = page_rank(&g);
        assert!(ranks[2] > ranks[0]);
        assert!((ranks[0] - ranks[1]).abs() < 1e-12);
    }

    #[test]
    fn other_metrics_unsupported() {
        let g = directed(&[("A", "B")]);
        let err = InProcessPageRank::default()
            .calculate(
                &g,
                SnapMetrics::PAGE_RANK | SnapMetrics::BETWEENNESS_CENTRALITY,
                &CalculationContext::detached(),
            )
            .expect_err("betweenness unsupported");
        assert!(matches!(
            err,
            MetricError::Snap(SnapError::Unsupported(SnapMetric::BetweennessCentrality))
        ));
    }

    #[test]
    fn cancellation_returns_cancelled() {
        let token = CancellationToken::new();
        token.cancel();
        let g = directed(&[("A", "B")]);
        let outcome = InProcessPageRank::default()
            .calculate(&g, SnapMetrics::PAGE_RANK, &CalculationContext::with_token(token))
            .expect("not an error");
        assert!(outcome.is_cancelled());
    }
}
