//! The contract shared by every graph metric calculator.
//!
//! # Overview
//!
//! A calculator borrows a [`Graph`] for the whole call and runs synchronously
//! on the calling thread. The [`CalculationContext`] is a side channel: it
//! carries a [`CancellationToken`] that the calculator polls at outer-loop
//! boundaries and a [`ProgressReporter`] that receives percent-complete
//! updates.
//!
//! Cancellation is not an error. A cancelled calculation returns
//! [`Outcome::Cancelled`] and exposes no partial result. Conditions that make
//! the metric impossible to compute (the shortest-path matrix does not fit in
//! memory, the SNAP tool is missing) are [`MetricError`]s.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use nodexl_core::Graph;
use tracing::debug;

use crate::error::MetricError;

// ---------------------------------------------------------------------------
// Outcome
// ---------------------------------------------------------------------------

/// Result of a cooperative calculation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub enum Outcome<T> {
    /// The calculation ran to completion.
    Complete(T),
    /// Cancellation was requested before the calculation finished.
    Cancelled,
}

impl<T> Outcome<T> {
    /// The completed value, if any.
    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Complete(value) => Some(value),
            Self::Cancelled => None,
        }
    }

    /// Whether the calculation was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }

    /// Transform the completed value.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Self::Complete(value) => Outcome::Complete(f(value)),
            Self::Cancelled => Outcome::Cancelled,
        }
    }
}

// ---------------------------------------------------------------------------
// Cancellation and progress
// ---------------------------------------------------------------------------

/// Shared cancellation flag. Clones observe the same flag, and any clone may
/// cancel from any thread.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken(Arc<AtomicBool>);

impl CancellationToken {
    /// A token that has not been cancelled.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Receives progress updates from a running calculation.
pub trait ProgressReporter {
    /// `percent` is in `0..=100`; `status` describes the current step.
    fn report(&self, percent: u8, status: &str);
}

/// Default reporter: emits a `tracing` debug event per update.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingProgress;

impl ProgressReporter for TracingProgress {
    fn report(&self, percent: u8, status: &str) {
        debug!(percent, status, "progress");
    }
}

/// Progress and cancellation channel handed to a calculator.
#[derive(Clone)]
pub struct CalculationContext<'a> {
    token: CancellationToken,
    progress: &'a dyn ProgressReporter,
}

impl std::fmt::Debug for CalculationContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CalculationContext")
            .field("cancelled", &self.token.is_cancelled())
            .finish_non_exhaustive()
    }
}

impl<'a> CalculationContext<'a> {
    /// Context polling `token` and reporting through `progress`.
    #[must_use]
    pub fn new(token: CancellationToken, progress: &'a dyn ProgressReporter) -> Self {
        Self { token, progress }
    }

    /// Context with a fresh token that nothing else holds, so it is never
    /// cancelled. Progress goes to [`TracingProgress`].
    #[must_use]
    pub fn detached() -> CalculationContext<'static> {
        CalculationContext {
            token: CancellationToken::new(),
            progress: &TracingProgress,
        }
    }

    /// Context polling `token` and reporting to [`TracingProgress`].
    #[must_use]
    pub fn with_token(token: CancellationToken) -> CalculationContext<'static> {
        CalculationContext {
            token,
            progress: &TracingProgress,
        }
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Forward a progress update.
    pub fn report(&self, percent: u8, status: &str) {
        self.progress.report(percent, status);
    }

    /// Report `done` of `total` steps of `status`, then return `true` if the
    /// calculation should stop.
    #[must_use]
    pub fn should_cancel(&self, done: usize, total: usize, status: &str) -> bool {
        if self.is_cancelled() {
            debug!(status, done, total, "calculation cancelled");
            return true;
        }
        self.report(percent(done, total), status);
        false
    }
}

#[allow(clippy::cast_possible_truncation)]
fn percent(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    // Bounded by 100, so the cast is lossless.
    (done.min(total) * 100 / total) as u8
}

// ---------------------------------------------------------------------------
// Calculator trait
// ---------------------------------------------------------------------------

/// A calculator for one graph metric.
pub trait GraphMetricCalculator {
    /// What the calculator produces.
    type Output;

    /// Human-readable description used in progress messages.
    fn graph_metric_description(&self) -> &'static str;

    /// Calculate, polling `ctx` for cancellation and reporting progress.
    ///
    /// # Errors
    ///
    /// Returns a [`MetricError`] when the metric cannot be calculated for
    /// this graph. Cancellation is reported as [`Outcome::Cancelled`].
    fn try_calculate_graph_metrics(
        &self,
        graph: &Graph,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<Self::Output>, MetricError>;

    /// Calculate to completion with a context that is never cancelled.
    ///
    /// # Errors
    ///
    /// See [`GraphMetricCalculator::try_calculate_graph_metrics`].
    fn calculate_graph_metrics(&self, graph: &Graph) -> Result<Self::Output, MetricError> {
        match self.try_calculate_graph_metrics(graph, &CalculationContext::detached())? {
            Outcome::Complete(value) => Ok(value),
            Outcome::Cancelled => Err(MetricError::CannotCalculate(format!(
                "{} stopped without a cancellation request",
                self.graph_metric_description()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<(u8, String)>>);

    impl ProgressReporter for Recorder {
        fn report(&self, percent: u8, status: &str) {
            self.0.borrow_mut().push((percent, status.to_string()));
        }
    }

    #[test]
    fn token_clones_share_state() {
        let token = CancellationToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn should_cancel_reports_progress_until_cancelled() {
        let recorder = Recorder::default();
        let token = CancellationToken::new();
        let ctx = CalculationContext::new(token.clone(), &recorder);

        assert!(!ctx.should_cancel(1, 4, "step"));
        token.cancel();
        assert!(ctx.should_cancel(2, 4, "step"));

        assert_eq!(*recorder.0.borrow(), vec![(25, "step".to_string())]);
    }

    #[test]
    fn percent_is_clamped() {
        assert_eq!(percent(0, 0), 100);
        assert_eq!(percent(5, 4), 100);
        assert_eq!(percent(1, 3), 33);
    }

    #[test]
    fn outcome_helpers() {
        let done: Outcome<u32> = Outcome::Complete(3);
        assert_eq!(done.clone().map(|v| v * 2), Outcome::Complete(6));
        assert_eq!(done.into_option(), Some(3));
        assert!(Outcome::<u32>::Cancelled.is_cancelled());
    }
}
