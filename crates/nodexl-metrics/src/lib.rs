#![forbid(unsafe_code)]
//! nodexl-metrics: the graph-metrics engine.
//!
//! Calculators implement [`GraphMetricCalculator`] and run synchronously
//! against a borrowed [`nodexl_core::Graph`]. Long-running calculators poll a
//! [`CancellationToken`] and report progress through a [`ProgressReporter`];
//! see [`calculator`].
//!
//! PageRank and the other SNAP metrics go through the [`snap::SnapBackend`]
//! strategy, either an external executable or an in-process implementation.

pub mod calculator;
pub mod error;
pub mod metrics;
pub mod snap;

pub use calculator::{
    CalculationContext, CancellationToken, GraphMetricCalculator, Outcome, ProgressReporter,
    TracingProgress,
};
pub use error::MetricError;
