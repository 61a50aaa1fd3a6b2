use nodexl_core::error::ErrorCode;

use crate::snap::SnapError;

/// Fatal calculation failures. Cancellation is not an error; see
/// [`crate::calculator::Outcome`].
#[derive(Debug, thiserror::Error)]
pub enum MetricError {
    /// The metric cannot be calculated for this graph. The message is meant
    /// for the user.
    #[error("{0}")]
    CannotCalculate(String),

    /// The SNAP backend failed.
    #[error(transparent)]
    Snap(#[from] SnapError),
}

impl MetricError {
    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::CannotCalculate(_) => ErrorCode::CannotCalculate,
            Self::Snap(e) => e.code(),
        }
    }
}
