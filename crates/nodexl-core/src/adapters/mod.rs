//! Graph file adapters.
//!
//! # Overview
//!
//! Each supported file format has an adapter implementing [`GraphAdapter`]:
//!
//! | Format   | Adapter                  | Extensions        |
//! |----------|--------------------------|-------------------|
//! | GraphML  | [`GraphMlGraphAdapter`]  | `.graphml`, `.xml`|
//! | Pajek    | [`PajekGraphAdapter`]    | `.net`, `.paj`    |
//! | UCINET   | [`UcinetGraphAdapter`]   | `.dl`             |
//! | Simple   | [`SimpleGraphAdapter`]   | `.txt`, `.tsv`    |
//!
//! The line-oriented formats report malformed input as
//! [`AdapterError::Format`] with a 1-based line number and the offending text,
//! truncated and stripped of control characters so it is safe to print.

pub mod graphml;
pub mod pajek;
pub mod simple;
pub mod ucinet;

use std::fmt;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use tracing::{debug, instrument};

use crate::error::ErrorCode;
use crate::graph::{Directedness, Graph, GraphError};

pub use graphml::GraphMlGraphAdapter;
pub use pajek::PajekGraphAdapter;
pub use simple::SimpleGraphAdapter;
pub use ucinet::UcinetGraphAdapter;

/// Longest slice of offending text quoted in a format error.
const MAX_ERROR_TEXT_CHARS: usize = 40;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised while loading or saving a graph file.
#[derive(Debug, thiserror::Error)]
pub enum AdapterError {
    /// Underlying I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line-oriented file is malformed.
    #[error("line {line}: {message} (text: {text:?})")]
    Format {
        /// 1-based line number.
        line: usize,
        /// What is wrong.
        message: String,
        /// The offending text, truncated and sanitized.
        text: String,
    },

    /// The XML layer rejected a GraphML file.
    #[error("XML error: {0}")]
    Xml(#[from] quick_xml::Error),

    /// A GraphML file is well-formed XML but not a valid graph.
    #[error("GraphML error: {0}")]
    GraphMl(String),

    /// Building the graph failed.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),

    /// The graph cannot be represented in the target format.
    #[error("{format} cannot store this graph: {reason}")]
    Unsupported {
        /// Target format.
        format: GraphFormat,
        /// Why not.
        reason: String,
    },

    /// The file format could not be inferred from the path.
    #[error("cannot determine the graph format of {}", .0.display())]
    UnknownFormat(PathBuf),
}

impl AdapterError {
    /// Build a [`AdapterError::Format`] quoting `text`.
    #[must_use]
    pub fn format(line: usize, message: impl Into<String>, text: &str) -> Self {
        Self::Format {
            line,
            message: message.into(),
            text: sanitize_error_text(text),
        }
    }

    /// Machine-readable code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Io(_) => ErrorCode::InternalUnexpected,
            Self::Format { .. } | Self::Xml(_) | Self::GraphMl(_) => ErrorCode::MalformedGraphFile,
            Self::Graph(_) => ErrorCode::InvalidGraph,
            Self::Unsupported { .. } => ErrorCode::UnsupportedGraphFeature,
            Self::UnknownFormat(_) => ErrorCode::UnknownGraphFormat,
        }
    }
}

/// Truncate `text` and replace control characters so it can be quoted in an
/// error message.
#[must_use]
pub fn sanitize_error_text(text: &str) -> String {
    let mut out: String = text
        .chars()
        .take(MAX_ERROR_TEXT_CHARS)
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    if text.chars().count() > MAX_ERROR_TEXT_CHARS {
        out.push_str("...");
    }
    out
}

// ---------------------------------------------------------------------------
// Adapter trait
// ---------------------------------------------------------------------------

/// Reads and writes one graph file format.
pub trait GraphAdapter {
    /// Parse a graph from `reader`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] on I/O failure or malformed input.
    fn load(&self, reader: &mut dyn BufRead) -> Result<Graph, AdapterError>;

    /// Write `graph` to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an [`AdapterError`] on I/O failure or when the graph cannot be
    /// represented in this format.
    fn save(&self, graph: &Graph, writer: &mut dyn Write) -> Result<(), AdapterError>;

    /// Parse a graph held in memory.
    ///
    /// # Errors
    ///
    /// See [`GraphAdapter::load`].
    fn load_str(&self, text: &str) -> Result<Graph, AdapterError> {
        let mut bytes = text.as_bytes();
        self.load(&mut bytes)
    }

    /// Serialize a graph to a string.
    ///
    /// # Errors
    ///
    /// See [`GraphAdapter::save`].
    fn save_to_string(&self, graph: &Graph) -> Result<String, AdapterError> {
        let mut buf = Vec::new();
        self.save(graph, &mut buf)?;
        String::from_utf8(buf)
            .map_err(|e| AdapterError::Io(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}

/// Iterate over the lines of `reader` with 1-based line numbers, stripping a
/// trailing carriage return.
pub(crate) fn numbered_lines(
    reader: &mut dyn BufRead,
) -> impl Iterator<Item = Result<(usize, String), AdapterError>> + '_ {
    reader.lines().enumerate().map(|(i, line)| {
        let mut line = line?;
        if line.ends_with('\r') {
            line.pop();
        }
        Ok((i + 1, line))
    })
}

// ---------------------------------------------------------------------------
// Format selection
// ---------------------------------------------------------------------------

/// Supported graph file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GraphFormat {
    /// GraphML XML.
    GraphMl,
    /// Pajek `.net` subset.
    Pajek,
    /// UCINET full-matrix DL.
    Ucinet,
    /// Tab-delimited two-column edge list.
    Simple,
}

impl GraphFormat {
    /// All formats, in display order.
    pub const ALL: [Self; 4] = [Self::GraphMl, Self::Pajek, Self::Ucinet, Self::Simple];

    /// Infer the format from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "graphml" | "xml" => Some(Self::GraphMl),
            "net" | "paj" => Some(Self::Pajek),
            "dl" => Some(Self::Ucinet),
            "txt" | "tsv" => Some(Self::Simple),
            _ => None,
        }
    }

    /// Build the adapter for this format.
    ///
    /// `directedness` is used by formats that do not record it themselves
    /// (simple and UCINET). GraphML and Pajek files carry their own.
    #[must_use]
    pub fn adapter(self, directedness: Directedness) -> Box<dyn GraphAdapter> {
        match self {
            Self::GraphMl => Box::new(GraphMlGraphAdapter),
            Self::Pajek => Box::new(PajekGraphAdapter),
            Self::Ucinet => Box::new(UcinetGraphAdapter::new(directedness)),
            Self::Simple => Box::new(SimpleGraphAdapter::new(directedness)),
        }
    }

    /// Lowercase name as accepted by [`FromStr`].
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::GraphMl => "graphml",
            Self::Pajek => "pajek",
            Self::Ucinet => "ucinet",
            Self::Simple => "simple",
        }
    }
}

impl fmt::Display for GraphFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GraphFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                format!("unknown graph format {s:?} (expected graphml, pajek, ucinet or simple)")
            })
    }
}

fn resolve_format(path: &Path, format: Option<GraphFormat>) -> Result<GraphFormat, AdapterError> {
    format
        .or_else(|| GraphFormat::from_path(path))
        .ok_or_else(|| AdapterError::UnknownFormat(path.to_path_buf()))
}

/// Load a graph file, inferring the format from the extension when `format`
/// is `None`.
///
/// # Errors
///
/// Returns an [`AdapterError`] if the format is unknown, the file cannot be
/// opened, or its contents are malformed.
#[instrument(skip(format, directedness), fields(path = %path.display()))]
pub fn load_graph_file(
    path: &Path,
    format: Option<GraphFormat>,
    directedness: Directedness,
) -> Result<Graph, AdapterError> {
    let format = resolve_format(path, format)?;
    let file = File::open(path)?;
    let mut reader = BufReader::new(file);
    let graph = format.adapter(directedness).load(&mut reader)?;
    debug!(
        %format,
        vertices = graph.vertex_count(),
        edges = graph.edge_count(),
        "graph loaded"
    );
    Ok(graph)
}

/// Save a graph file, inferring the format from the extension when `format`
/// is `None`.
///
/// # Errors
///
/// Returns an [`AdapterError`] if the format is unknown, the file cannot be
/// written, or the graph is not representable in the format.
#[instrument(skip(graph, format), fields(path = %path.display()))]
pub fn save_graph_file(
    graph: &Graph,
    path: &Path,
    format: Option<GraphFormat>,
) -> Result<(), AdapterError> {
    let format = resolve_format(path, format)?;
    let mut writer = BufWriter::new(File::create(path)?);
    format.adapter(graph.directedness()).save(graph, &mut writer)?;
    writer.flush()?;
    debug!(%format, "graph saved");
    Ok(())
}
