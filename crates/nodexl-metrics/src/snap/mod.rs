//! PageRank and friends behind a pluggable SNAP strategy.
//!
//! # Overview
//!
//! NodeXL computes a handful of metrics with SNAP, an external graph
//! library shipped as a command-line tool. [`SnapBackend`] is the seam:
//!
//! - [`SnapExecutable`] writes the graph to a temporary edge list, runs the
//!   tool, and parses its tab-delimited output.
//! - [`InProcessPageRank`] computes PageRank by power iteration without
//!   leaving the process.
//!
//! Calculators such as [`crate::metrics::PageRankCalculator`] are generic
//! over the backend, so swapping one for the other changes no call site.

pub mod executable;
pub mod in_process;

use std::collections::BTreeMap;
use std::fmt;
use std::io;
use std::ops::BitOr;
use std::path::PathBuf;

use nodexl_core::Graph;
use nodexl_core::error::ErrorCode;

use crate::calculator::{CalculationContext, Outcome};
use crate::error::MetricError;
use crate::metrics::VertexMetrics;

pub use executable::SnapExecutable;
pub use in_process::{InProcessPageRank, PageRankConfig};

// ---------------------------------------------------------------------------
// Metric selection
// ---------------------------------------------------------------------------

/// One metric the SNAP tool can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SnapMetric {
    ClosenessCentrality,
    BetweennessCentrality,
    EigenvectorCentrality,
    PageRank,
}

impl SnapMetric {
    /// Every metric, in bit order.
    pub const ALL: [Self; 4] = [
        Self::ClosenessCentrality,
        Self::BetweennessCentrality,
        Self::EigenvectorCentrality,
        Self::PageRank,
    ];

    /// Bit used for this metric in the command-line mask.
    #[must_use]
    pub const fn bit(self) -> u32 {
        1 << (self as u32)
    }

    /// Column header the tool writes for this metric.
    #[must_use]
    pub const fn column_header(self) -> &'static str {
        match self {
            Self::ClosenessCentrality => "Closeness Centrality",
            Self::BetweennessCentrality => "Betweenness Centrality",
            Self::EigenvectorCentrality => "Eigenvector Centrality",
            Self::PageRank => "PageRank",
        }
    }
}

impl fmt::Display for SnapMetric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_header())
    }
}

/// A set of [`SnapMetric`]s, passed to the tool as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SnapMetrics(u32);

impl SnapMetrics {
    pub const NONE: Self = Self(0);
    pub const CLOSENESS_CENTRALITY: Self = Self(SnapMetric::ClosenessCentrality.bit());
    pub const BETWEENNESS_CENTRALITY: Self = Self(SnapMetric::BetweennessCentrality.bit());
    pub const EIGENVECTOR_CENTRALITY: Self = Self(SnapMetric::EigenvectorCentrality.bit());
    pub const PAGE_RANK: Self = Self(SnapMetric::PageRank.bit());

    /// Raw mask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Whether `metric` is in the set.
    #[must_use]
    pub const fn contains(self, metric: SnapMetric) -> bool {
        self.0 & metric.bit() != 0
    }

    /// Whether the set is empty.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Members in bit order, which is also the tool's column order.
    pub fn iter(self) -> impl Iterator<Item = SnapMetric> {
        SnapMetric::ALL.into_iter().filter(move |m| self.contains(*m))
    }
}

impl From<SnapMetric> for SnapMetrics {
    fn from(metric: SnapMetric) -> Self {
        Self(metric.bit())
    }
}

impl BitOr for SnapMetrics {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

// ---------------------------------------------------------------------------
// Results and errors
// ---------------------------------------------------------------------------

/// Per-vertex values for each computed metric.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SnapResults {
    columns: BTreeMap<SnapMetric, VertexMetrics>,
}

impl SnapResults {
    /// Values for `metric`, if it was computed.
    #[must_use]
    pub fn get(&self, metric: SnapMetric) -> Option<&VertexMetrics> {
        self.columns.get(&metric)
    }

    /// Take the values for `metric` out of the results.
    pub fn take(&mut self, metric: SnapMetric) -> Option<VertexMetrics> {
        self.columns.remove(&metric)
    }

    /// Store values for `metric`.
    pub fn insert(&mut self, metric: SnapMetric, values: VertexMetrics) {
        self.columns.insert(metric, values);
    }

    /// Metrics present.
    pub fn metrics(&self) -> impl Iterator<Item = SnapMetric> + '_ {
        self.columns.keys().copied()
    }
}

/// Errors raised by a [`SnapBackend`].
#[derive(Debug, thiserror::Error)]
pub enum SnapError {
    /// No executable path was configured.
    #[error("no SNAP executable is configured")]
    NotConfigured,

    /// The configured executable does not exist.
    #[error("SNAP executable {} was not found", .0.display())]
    ExecutableNotFound(PathBuf),

    /// Temporary files or the process could not be handled.
    #[error("SNAP I/O error: {0}")]
    Io(#[from] io::Error),

    /// The tool exited unsuccessfully.
    #[error("SNAP exited with {status}: {stderr}")]
    Failed {
        /// Exit status as printed by the OS.
        status: String,
        /// Captured standard error, trimmed.
        stderr: String,
    },

    /// The tool's output file could not be parsed.
    #[error("malformed SNAP output at line {line}: {message}")]
    MalformedOutput {
        /// 1-based line in the output file.
        line: usize,
        /// What is wrong.
        message: String,
    },

    /// The backend cannot compute the requested metric.
    #[error("this SNAP backend cannot compute {0}")]
    Unsupported(SnapMetric),
}

impl SnapError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::NotConfigured | Self::ExecutableNotFound(_) | Self::Unsupported(_) => {
                ErrorCode::SnapUnavailable
            }
            Self::Io(_) | Self::Failed { .. } | Self::MalformedOutput { .. } => {
                ErrorCode::SnapFailed
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Backend trait
// ---------------------------------------------------------------------------

/// Computes [`SnapMetric`]s for a graph.
pub trait SnapBackend {
    /// Compute `metrics` for every vertex of `graph`.
    ///
    /// # Errors
    ///
    /// Returns [`MetricError::Snap`] when the backend fails or cannot compute
    /// one of the requested metrics.
    fn calculate(
        &self,
        graph: &Graph,
        metrics: SnapMetrics,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<SnapResults>, MetricError>;
}

impl<B: SnapBackend + ?Sized> SnapBackend for Box<B> {
    fn calculate(
        &self,
        graph: &Graph,
        metrics: SnapMetrics,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<SnapResults>, MetricError> {
        (**self).calculate(graph, metrics, ctx)
    }
}
