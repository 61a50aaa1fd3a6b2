//! The external SNAP graph-metrics tool.
//!
//! # Protocol
//!
//! Input is a tab-separated edge list, one `back<TAB>front` line per edge,
//! with vertices numbered by their enumeration position. Undirected edges in
//! a mixed graph are written in both directions. The tool is invoked as
//!
//! ```text
//! <executable> <input file> <output file> <directed: 0|1> <metric mask>
//! ```
//!
//! and writes a tab-delimited file whose first line is `Vertex ID` followed
//! by one header per requested metric (in [`SnapMetric`] bit order). Each
//! following line is a vertex number and its values. Vertices the tool does
//! not report (isolated vertices never appear in the edge list) score 0.
//!
//! The temporary directory is removed when the call returns, on every path.
//! No timeout is enforced.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::process::Command;

use nodexl_core::config::SnapConfig;
use nodexl_core::{Directedness, Graph, VertexId};
use tracing::{debug, instrument, warn};

use super::{SnapBackend, SnapError, SnapMetrics, SnapResults};
use crate::calculator::{CalculationContext, Outcome};
use crate::error::MetricError;
use crate::metrics::VertexMetrics;

const INPUT_FILE: &str = "edges.tsv";
const OUTPUT_FILE: &str = "metrics.tsv";
const VERTEX_ID_HEADER: &str = "Vertex ID";

/// Runs the SNAP executable at a fixed path.
#[derive(Debug, Clone)]
pub struct SnapExecutable {
    path: PathBuf,
}

impl SnapExecutable {
    /// Backend running the executable at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Backend for the executable named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SnapError::NotConfigured`] when no path is set.
    pub fn from_config(config: &SnapConfig) -> Result<Self, SnapError> {
        config
            .executable
            .as_ref()
            .map(Self::new)
            .ok_or(SnapError::NotConfigured)
    }

    /// Path of the executable.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn run(
        &self,
        input: &Path,
        output: &Path,
        directed: bool,
        metrics: SnapMetrics,
    ) -> Result<(), SnapError> {
        let result = Command::new(&self.path)
            .arg(input)
            .arg(output)
            .arg(if directed { "1" } else { "0" })
            .arg(metrics.bits().to_string())
            .output();

        let out = match result {
            Ok(out) => out,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(SnapError::ExecutableNotFound(self.path.clone()));
            }
            Err(e) => return Err(e.into()),
        };

        let stderr = String::from_utf8_lossy(&out.stderr).trim().to_string();
        if !out.status.success() {
            return Err(SnapError::Failed {
                status: out.status.to_string(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            warn!(%stderr, "SNAP wrote to stderr");
        }
        Ok(())
    }
}

/// Write the edge list the tool reads.
fn write_edge_list(graph: &Graph, writer: &mut impl Write) -> std::io::Result<()> {
    let positions = graph.vertex_positions();
    let mixed = graph.directedness() == Directedness::Mixed;
    for edge in graph.edges() {
        let back = positions[&edge.back];
        let front = positions[&edge.front];
        writeln!(writer, "{back}\t{front}")?;
        if mixed && !edge.is_directed() && back != front {
            writeln!(writer, "{front}\t{back}")?;
        }
    }
    writer.flush()
}

/// Parse the tool's output for `metrics`, mapping vertex numbers back to ids.
fn parse_output(
    reader: impl BufRead,
    metrics: SnapMetrics,
    vertices: &[VertexId],
) -> Result<SnapResults, SnapError> {
    let requested: Vec<_> = metrics.iter().collect();
    let malformed = |line: usize, message: String| SnapError::MalformedOutput { line, message };

    let mut columns: Vec<VertexMetrics> = requested
        .iter()
        .map(|_| vertices.iter().map(|&v| (v, 0.0)).collect())
        .collect();

    let mut lines = reader.lines();
    let header = lines
        .next()
        .transpose()?
        .ok_or_else(|| malformed(1, "output file is empty".to_string()))?;
    let expected: Vec<&str> = std::iter::once(VERTEX_ID_HEADER)
        .chain(requested.iter().map(|m| m.column_header()))
        .collect();
    let found: Vec<&str> = header.trim_end().split('\t').map(str::trim).collect();
    if found != expected {
        return Err(malformed(
            1,
            format!("expected header {:?}, found {:?}", expected.join("\t"), header.trim_end()),
        ));
    }

    for (i, line) in lines.enumerate() {
        let line_no = i + 2;
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let fields: Vec<&str> = line.trim_end().split('\t').map(str::trim).collect();
        if fields.len() != requested.len() + 1 {
            return Err(malformed(
                line_no,
                format!("expected {} columns, found {}", requested.len() + 1, fields.len()),
            ));
        }
        let vertex = fields[0]
            .parse::<usize>()
            .ok()
            .and_then(|i| vertices.get(i))
            .ok_or_else(|| malformed(line_no, format!("unknown vertex {:?}", fields[0])))?;
        for (column, raw) in columns.iter_mut().zip(&fields[1..]) {
            let value = raw
                .parse::<f64>()
                .map_err(|_| malformed(line_no, format!("{raw:?} is not a number")))?;
            column.insert(*vertex, value);
        }
    }

    let mut results = SnapResults::default();
    for (metric, column) in requested.into_iter().zip(columns) {
        results.insert(metric, column);
    }
    Ok(results)
}

impl SnapBackend for SnapExecutable {
    #[instrument(skip(self, graph, ctx), fields(executable = %self.path.display()))]
    fn calculate(
        &self,
        graph: &Graph,
        metrics: SnapMetrics,
        ctx: &CalculationContext<'_>,
    ) -> Result<Outcome<SnapResults>, MetricError> {
        const STATUS: &str = "Running SNAP";

        if metrics.is_empty() {
            return Ok(Outcome::Complete(SnapResults::default()));
        }
        if ctx.should_cancel(0, 1, STATUS) {
            return Ok(Outcome::Cancelled);
        }
        if !self.path.is_file() {
            return Err(SnapError::ExecutableNotFound(self.path.clone()).into());
        }

        let dir = tempfile::tempdir().map_err(SnapError::from)?;
        let input = dir.path().join(INPUT_FILE);
        let output = dir.path().join(OUTPUT_FILE);

        let mut writer = BufWriter::new(File::create(&input).map_err(SnapError::from)?);
        write_edge_list(graph, &mut writer).map_err(SnapError::from)?;
        drop(writer);

        let directed = graph.directedness() != Directedness::Undirected;
        debug!(directed, mask = metrics.bits(), "launching SNAP");
        self.run(&input, &output, directed, metrics)?;

        let vertices: Vec<VertexId> = graph.vertex_ids().collect();
        let file = File::open(&output).map_err(SnapError::from)?;
        let results = parse_output(BufReader::new(file), metrics, &vertices)?;

        ctx.report(100, STATUS);
        Ok(Outcome::Complete(results))
    }
}
