//! `nodexl components`: connected components, largest first by default.

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;
use nodexl_core::config::NodexlConfig;
use nodexl_metrics::GraphMetricCalculator;
use nodexl_metrics::metrics::components::component_edge_counts;
use nodexl_metrics::metrics::{ComponentSortOrder, ConnectedComponentCalculator};
use serde::Serialize;

use super::InputArgs;
use crate::output::{OutputMode, pretty_rule, render_mode};

/// Arguments for `nodexl components`.
#[derive(Args, Debug)]
pub struct ComponentsArgs {
    #[command(flatten)]
    pub input: InputArgs,

    /// List the smallest components first.
    #[arg(long)]
    pub ascending: bool,
}

/// One connected component.
#[derive(Debug, Serialize)]
pub struct ComponentRow {
    /// 1-based position in the sorted list.
    pub component: usize,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub vertices: Vec<String>,
}

/// Report payload for `nodexl components`.
#[derive(Debug, Serialize)]
pub struct ComponentsReport {
    pub order: ComponentSortOrder,
    pub components: Vec<ComponentRow>,
}

/// Execute `nodexl components`.
pub fn run_components(
    args: &ComponentsArgs,
    config: &NodexlConfig,
    output: OutputMode,
) -> Result<()> {
    let graph = args.input.load()?;
    let order = ComponentSortOrder::from_descending(
        config.metrics.components_descending && !args.ascending,
    );
    let components = ConnectedComponentCalculator::new(order)
        .calculate_graph_metrics(&graph)
        .context("failed to calculate connected components")?;
    let edge_counts = component_edge_counts(&graph, &components);

    let rows = components
        .iter()
        .zip(edge_counts)
        .enumerate()
        .map(|(i, (members, edge_count))| ComponentRow {
            component: i + 1,
            vertex_count: members.len(),
            edge_count,
            vertices: members
                .iter()
                .filter_map(|&v| graph.vertex(v).map(|vertex| vertex.name.clone()))
                .collect(),
        })
        .collect();
    let report = ComponentsReport {
        order,
        components: rows,
    };

    render_mode(
        output,
        &report,
        render_components_text,
        render_components_pretty,
    )
}

fn render_components_text(report: &ComponentsReport, w: &mut dyn Write) -> std::io::Result<()> {
    writeln!(w, "component\tvertices\tedges\tmembers")?;
    for row in &report.components {
        writeln!(
            w,
            "{}\t{}\t{}\t{}",
            row.component,
            row.vertex_count,
            row.edge_count,
            row.vertices.join(",")
        )?;
    }
    Ok(())
}

fn render_components_pretty(
    report: &ComponentsReport,
    w: &mut dyn Write,
) -> std::io::Result<()> {
    writeln!(w, "{} connected component(s)", report.components.len())?;
    pretty_rule(w)?;
    for row in &report.components {
        writeln!(
            w,
            "#{:<4} {:>6} vertices {:>6} edges  {}",
            row.component,
            row.vertex_count,
            row.edge_count,
            row.vertices.join(", ")
        )?;
    }
    Ok(())
}
