use std::fmt;

/// Machine-readable error codes shared by the library crates and the CLI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    ConfigParseError,
    UnknownGraphFormat,
    MalformedGraphFile,
    UnsupportedGraphFeature,
    InvalidGraph,
    CannotCalculate,
    SnapUnavailable,
    SnapFailed,
    InternalUnexpected,
}

impl ErrorCode {
    /// Stable code identifier (`E####`) for machine parsing.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::ConfigParseError => "E1001",
            Self::UnknownGraphFormat => "E2001",
            Self::MalformedGraphFile => "E2002",
            Self::UnsupportedGraphFeature => "E2003",
            Self::InvalidGraph => "E2004",
            Self::CannotCalculate => "E3001",
            Self::SnapUnavailable => "E4001",
            Self::SnapFailed => "E4002",
            Self::InternalUnexpected => "E9001",
        }
    }

    /// Short human-facing summary for logs and terminal output.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::ConfigParseError => "Config file parse error",
            Self::UnknownGraphFormat => "Unknown graph file format",
            Self::MalformedGraphFile => "Malformed graph file",
            Self::UnsupportedGraphFeature => "Graph cannot be saved in this format",
            Self::InvalidGraph => "Invalid graph operation",
            Self::CannotCalculate => "Graph metrics cannot be calculated",
            Self::SnapUnavailable => "SNAP executable not available",
            Self::SnapFailed => "SNAP executable failed",
            Self::InternalUnexpected => "Internal unexpected error",
        }
    }

    /// Optional remediation hint that can be surfaced to operators.
    #[must_use]
    pub const fn hint(self) -> Option<&'static str> {
        match self {
            Self::ConfigParseError => Some("Fix syntax in nodexl.toml and retry."),
            Self::UnknownGraphFormat => {
                Some("Pass --format graphml|pajek|ucinet|simple or use a known file extension.")
            }
            Self::MalformedGraphFile => Some("Fix the reported line and retry."),
            Self::UnsupportedGraphFeature => Some("Choose a format that supports this graph."),
            Self::InvalidGraph => None,
            Self::CannotCalculate => {
                Some("Try a smaller graph; all-pairs metrics need memory proportional to V².")
            }
            Self::SnapUnavailable => {
                Some("Set snap.executable in nodexl.toml or NODEXL_SNAP_PATH, or use the in-process backend.")
            }
            Self::SnapFailed => Some("Re-run with NODEXL_LOG=debug to see the tool's output."),
            Self::InternalUnexpected => Some("Retry once. If persistent, report a bug with logs."),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}
