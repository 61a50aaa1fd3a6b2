//! PageRank, delegated to a [`SnapBackend`].

use nodexl_core::Graph;
use tracing::instrument;

use super::VertexMetrics;
use crate::calculator::{CalculationContext, GraphMetricCalculator, Outcome};
use crate::error::MetricError;
use crate::snap::{SnapBackend, SnapError, SnapMetric, SnapMetrics};

/// Calculates PageRank through a [`SnapBackend`].
///
/// Swapping [`crate::snap::SnapExecutable`] for
/// [`crate::snap::InProcessPageRank`] (or a boxed backend chosen at runtime)
/// changes nothing else.
#[derive(Debug, Clone, Default)]
pub struct PageRankCalculator<B> {
    backend: B,
}

impl<B: SnapBackend> PageRankCalculator<B> {
    /// Calculator using `backend`.
    #[must_use]
    pub const fn new(backend: B) -> Self {
        Self { backend }
    }

    /// The backend in use.
    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: SnapBackend> GraphMetricCalculator for PageRankCalculator<B> {
    type Output = VertexMetrics;

    fn graph_metric_description(&self) -> &'static str {
        "Calculating PageRanks"
    }

    #[instrument(skip(self, graph, ctx), fields(vertices = graph.vertex_count()))]
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<VertexMetrics>, MetricError> {
        let Outcome::Complete(mut results) =
            self.backend.calculate(graph, SnapMetrics::PAGE_RANK, ctx)?
        else {
            return Ok(Outcome::Cancelled);
        };

        let column = results
            .take(SnapMetric::PageRank)
            .ok_or(SnapError::MalformedOutput {
                line: 1,
                message: format!("no {} column", SnapMetric::PageRank),
            })?;

        // Every vertex gets a value, even if the backend skipped it.
        let ranks = graph
            .vertex_ids()
            .map(|v| (v, column.get(&v).copied().unwrap_or(0.0)))
            .collect();
        Ok(Outcome::Complete(ranks))
    }
}
