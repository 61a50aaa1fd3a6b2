//! `nodexl convert`: rewrite a graph file in another format.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use nodexl_core::adapters::{GraphFormat, load_graph_file, save_graph_file};
use serde::Serialize;

use super::DirectednessArg;
use crate::output::{OutputMode, pretty_pairs, render_mode};

/// Arguments for `nodexl convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// File to read.
    #[arg(value_name = "IN")]
    pub input: PathBuf,

    /// File to write. Overwritten if it exists.
    #[arg(value_name = "OUT")]
    pub destination: PathBuf,

    /// Input format; inferred from the extension when omitted.
    #[arg(long)]
    pub from: Option<GraphFormat>,

    /// Output format; inferred from the extension when omitted.
    #[arg(long)]
    pub to: Option<GraphFormat>,

    /// Directedness for simple and UCINET input, which do not record it.
    #[arg(long, value_enum, default_value_t = DirectednessArg::Directed)]
    pub directedness: DirectednessArg,
}

/// Report payload for `nodexl convert`.
#[derive(Debug, Serialize)]
pub struct ConvertReport {
    pub input: String,
    pub output: String,
    pub vertices: usize,
    pub edges: usize,
}

/// Execute `nodexl convert`.
pub fn run_convert(args: &ConvertArgs, output: OutputMode) -> Result<()> {
    let graph = load_graph_file(&args.input, args.from, args.directedness.into())
        .with_context(|| format!("failed to load {}", args.input.display()))?;
    save_graph_file(&graph, &args.destination, args.to)
        .with_context(|| format!("failed to write {}", args.destination.display()))?;

    let report = ConvertReport {
        input: args.input.display().to_string(),
        output: args.destination.display().to_string(),
        vertices: graph.vertex_count(),
        edges: graph.edge_count(),
    };

    render_mode(
        output,
        &report,
        |r, w| writeln!(w, "{}\t{}\t{}\t{}", r.input, r.output, r.vertices, r.edges),
        |r, w| {
            pretty_pairs(
                w,
                &format!("{} -> {}", r.input, r.output),
                &[
                    ("Vertices", r.vertices.to_string()),
                    ("Edges", r.edges.to_string()),
                ],
            )
        },
    )
}
