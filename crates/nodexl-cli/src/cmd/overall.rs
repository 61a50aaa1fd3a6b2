//! `nodexl overall`: graph-wide metrics.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use nodexl_metrics::GraphMetricCalculator;
use nodexl_metrics::metrics::{OverallMetricCalculator, OverallMetrics};

use super::{InputArgs, format_value};
use crate::output::{OutputMode, pretty_pairs, render_mode};

/// Arguments for `nodexl overall`.
#[derive(Args, Debug)]
pub struct OverallArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// Also calculate maximum and average geodesic distance. Needs the
    /// all-pairs shortest path matrix: cubic time, quadratic memory.
    #[arg(long)]
    pub geodesics: bool,
}

/// Execute `nodexl overall`.
pub fn run_overall(args: &OverallArgs, precision: usize, output: OutputMode) -> Result<()> {
    let graph = args.input.load()?;
    let metrics = OverallMetricCalculator::with_geodesics(args.geodesics)
        .calculate_graph_metrics(&graph)
        .context("failed to calculate overall metrics")?;

    let title = args.input.file.display().to_string();
    render_mode(
        output,
        &metrics,
        |m, w| render_overall_text(m, precision, w),
        |m, w| pretty_pairs(w, &title, &rows(m, precision)),
    )
}

fn optional<T>(value: Option<T>, show: impl FnOnce(T) -> String) -> String {
    value.map_or_else(|| "Not Applicable".to_string(), show)
}

fn rows(m: &OverallMetrics, precision: usize) -> Vec<(&'static str, String)> {
    vec![
        ("Graph Type", m.directedness.to_string()),
        ("Vertices", m.vertices.to_string()),
        ("Unique Edges", m.unique_edges.to_string()),
        ("Edges With Duplicates", m.edges_with_duplicates.to_string()),
        ("Total Edges", m.total_edges.to_string()),
        ("Self-Loops", m.self_loops.to_string()),
        (
            "Graph Density",
            optional(m.graph_density, |d| format_value(d, precision)),
        ),
        ("Connected Components", m.connected_components.to_string()),
        (
            "Single-Vertex Connected Components",
            m.single_vertex_connected_components.to_string(),
        ),
        (
            "Maximum Vertices in a Connected Component",
            m.maximum_connected_component_vertices.to_string(),
        ),
        (
            "Maximum Edges in a Connected Component",
            m.maximum_connected_component_edges.to_string(),
        ),
        (
            "Maximum Geodesic Distance (Diameter)",
            optional(m.maximum_geodesic_distance, |d| d.to_string()),
        ),
        (
            "Average Geodesic Distance",
            optional(m.average_geodesic_distance, |d| format_value(d, precision)),
        ),
    ]
}

fn render_overall_text(
    m: &OverallMetrics,
    precision: usize,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    for (key, value) in rows(m, precision) {
        writeln!(w, "{key}\t{value}")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use nodexl_core::Directedness;

    use super::*;

    fn sample() -> OverallMetrics {
        OverallMetrics {
            directedness: Directedness::Undirected,
            unique_edges: 3,
            edges_with_duplicates: 0,
            total_edges: 3,
            self_loops: 0,
            vertices: 3,
            graph_density: Some(1.0),
            connected_components: 1,
            single_vertex_connected_components: 0,
            maximum_connected_component_vertices: 3,
            maximum_connected_component_edges: 3,
            maximum_geodesic_distance: Some(1),
            average_geodesic_distance: None,
        }
    }

    #[test]
    fn text_rows_are_tab_separated() {
        let mut buf = Vec::new();
        render_overall_text(&sample(), 2, &mut buf).expect("write");
        let text = String::from_utf8(buf).expect("utf8");
        assert!(text.contains("Graph Density\t1.00\n"));
        assert!(text.contains("Average Geodesic Distance\tNot Applicable\n"));
        assert_eq!(text.lines().count(), 13);
    }
}
