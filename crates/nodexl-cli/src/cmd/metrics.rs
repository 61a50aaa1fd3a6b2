//! `nodexl metrics`: per-vertex metrics.

use std::collections::BTreeMap;
use std::io::Write;
use std::str::FromStr;

use anyhow::{Context, Result, bail};
use clap::{Args, ValueEnum};
use nodexl_core::config::NodexlConfig;
use nodexl_core::{Graph, VertexId};
use nodexl_metrics::GraphMetricCalculator;
use nodexl_metrics::metrics::{
    BetweennessCentralityCalculator, ClosenessCentralityCalculator,
    ClusteringCoefficientCalculator, ComponentSortOrder, ConnectedComponentCalculator,
    EigenvectorCentralityCalculator, PageRankCalculator, VertexDegreeCalculator, VertexMetrics,
};
use serde::Serialize;
use tracing::{info, warn};

use super::{InputArgs, format_value, snap_backend};
use crate::output::{OutputMode, pretty_rule, render_mode};

/// A per-vertex metric the command can compute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, ValueEnum)]
pub enum Metric {
    /// In, out and total degree.
    Degree,
    Betweenness,
    Closeness,
    Eigenvector,
    Clustering,
    /// Through the configured SNAP backend.
    Pagerank,
    /// 1-based index of the vertex's connected component.
    Components,
}

impl Metric {
    /// Output columns produced by this metric.
    const fn columns(self) -> &'static [&'static str] {
        match self {
            Self::Degree => &["in_degree", "out_degree", "degree"],
            Self::Betweenness => &["betweenness"],
            Self::Closeness => &["closeness"],
            Self::Eigenvector => &["eigenvector"],
            Self::Clustering => &["clustering"],
            Self::Pagerank => &["pagerank"],
            Self::Components => &["component"],
        }
    }
}

impl FromStr for Metric {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        <Self as ValueEnum>::from_str(s, true).map_err(|e| anyhow::anyhow!(e))
    }
}

/// Arguments for `nodexl metrics`.
#[derive(Args, Debug)]
pub struct MetricsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Metric to compute; repeat for several. Defaults to
    /// `metrics.default_metrics` from the configuration.
    #[arg(long = "metric", short = 'm', value_enum)]
    pub metrics: Vec<Metric>,

    /// Number components smallest first.
    #[arg(long)]
    pub components_ascending: bool,
}

/// One row of output.
#[derive(Debug, Serialize)]
pub struct VertexRow {
    pub vertex: String,
    #[serde(flatten)]
    pub values: BTreeMap<&'static str, f64>,
}

/// Report payload for `nodexl metrics`.
#[derive(Debug, Serialize)]
pub struct MetricsReport {
    pub columns: Vec<&'static str>,
    pub vertices: Vec<VertexRow>,
    #[serde(skip)]
    precision: usize,
}

/// The metrics to run: the flags, else the configured defaults.
fn selected_metrics(args: &MetricsArgs, config: &NodexlConfig) -> Result<Vec<Metric>> {
    let mut metrics = if args.metrics.is_empty() {
        config
            .metrics
            .default_metrics
            .iter()
            .map(|name| {
                name.parse::<Metric>()
                    .with_context(|| format!("invalid metrics.default_metrics entry {name:?}"))
            })
            .collect::<Result<Vec<_>>>()?
    } else {
        args.metrics.clone()
    };
    metrics.sort();
    metrics.dedup();
    if metrics.is_empty() {
        bail!("no metrics selected");
    }
    Ok(metrics)
}

fn store(
    rows: &mut BTreeMap<VertexId, BTreeMap<&'static str, f64>>,
    column: &'static str,
    values: &VertexMetrics,
) {
    for (vertex, value) in values {
        rows.entry(*vertex).or_default().insert(column, *value);
    }
}

#[allow(clippy::cast_precision_loss)]
fn compute(
    graph: &Graph,
    metric: Metric,
    config: &NodexlConfig,
    components_ascending: bool,
    rows: &mut BTreeMap<VertexId, BTreeMap<&'static str, f64>>,
) -> Result<()> {
    match metric {
        Metric::Degree => {
            let degrees = VertexDegreeCalculator.calculate_graph_metrics(graph)?;
            for (vertex, d) in degrees {
                let row = rows.entry(vertex).or_default();
                row.insert("in_degree", d.in_degree as f64);
                row.insert("out_degree", d.out_degree as f64);
                row.insert("degree", d.degree as f64);
            }
        }
        Metric::Betweenness => {
            let values = BetweennessCentralityCalculator.calculate_graph_metrics(graph)?;
            store(rows, "betweenness", &values);
        }
        Metric::Closeness => {
            let values = ClosenessCentralityCalculator.calculate_graph_metrics(graph)?;
            store(rows, "closeness", &values);
        }
        Metric::Eigenvector => {
            let result = EigenvectorCentralityCalculator.calculate_graph_metrics(graph)?;
            if !result.converged {
                warn!(
                    iterations = result.iterations,
                    "eigenvector centrality did not converge"
                );
            }
            store(rows, "eigenvector", &result.scores);
        }
        Metric::Clustering => {
            let values = ClusteringCoefficientCalculator.calculate_graph_metrics(graph)?;
            store(rows, "clustering", &values);
        }
        Metric::Pagerank => {
            let values =
                PageRankCalculator::new(snap_backend(config)?).calculate_graph_metrics(graph)?;
            store(rows, "pagerank", &values);
        }
        Metric::Components => {
            let descending = config.metrics.components_descending && !components_ascending;
            let components =
                ConnectedComponentCalculator::new(ComponentSortOrder::from_descending(descending))
                    .calculate_graph_metrics(graph)?;
            for (index, component) in components.iter().enumerate() {
                for vertex in component {
                    rows.entry(*vertex)
                        .or_default()
                        .insert("component", (index + 1) as f64);
                }
            }
        }
    }
    Ok(())
}

/// Execute `nodexl metrics`.
pub fn run_metrics(args: &MetricsArgs, config: &NodexlConfig, output: OutputMode) -> Result<()> {
    let graph = args.input.load()?;
    let metrics = selected_metrics(args, config)?;

    let mut rows: BTreeMap<VertexId, BTreeMap<&'static str, f64>> = graph
        .vertex_ids()
        .map(|v| (v, BTreeMap::new()))
        .collect();
    for &metric in &metrics {
        info!(?metric, "calculating");
        compute(&graph, metric, config, args.components_ascending, &mut rows)
            .with_context(|| format!("failed to calculate {metric:?} metrics"))?;
    }

    let report = MetricsReport {
        columns: metrics.iter().flat_map(|m| m.columns()).copied().collect(),
        vertices: graph
            .vertices()
            .map(|(id, vertex)| VertexRow {
                vertex: vertex.name.clone(),
                values: rows.remove(&id).unwrap_or_default(),
            })
            .collect(),
        precision: config.output.precision,
    };

    render_mode(output, &report, render_metrics_text, render_metrics_pretty)
}

fn cell(report: &MetricsReport, row: &VertexRow, column: &str) -> String {
    row.values
        .get(column)
        .map(|v| format_value(*v, report.precision))
        .unwrap_or_default()
}

fn render_metrics_text(report: &MetricsReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "vertex\t{}", report.columns.join("\t"))?;
    for row in &report.vertices {
        let cells: Vec<String> = report
            .columns
            .iter()
            .map(|c| cell(report, row, c))
            .collect();
        writeln!(w, "{}\t{}", row.vertex, cells.join("\t"))?;
    }
    Ok(())
}

fn render_metrics_pretty(report: &MetricsReport, w: &mut dyn Write) -> std::io::Result<()> {
    let name_width = report
        .vertices
        .iter()
        .map(|r| r.vertex.chars().count())
        .chain(std::iter::once("Vertex".len()))
        .max()
        .unwrap_or(6);

    write!(w, "{:<name_width$}", "Vertex")?;
    for column in &report.columns {
        write!(w, "  {column:>12}")?;
    }
    writeln!(w)?;
    pretty_rule(w)?;

    for row in &report.vertices {
        write!(w, "{:<name_width$}", row.vertex)?;
        for column in &report.columns {
            write!(w, "  {:>12}", cell(report, row, column))?;
        }
        writeln!(w)?;
    }
    Ok(())
}
