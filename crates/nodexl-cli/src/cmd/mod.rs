pub mod completions;
pub mod components;
pub mod convert;
pub mod metrics;
pub mod overall;

use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, ValueEnum};
use nodexl_core::adapters::{GraphFormat, load_graph_file};
use nodexl_core::config::{NodexlConfig, SnapBackendKind};
use nodexl_core::{Directedness, Graph};
use nodexl_metrics::snap::{InProcessPageRank, SnapBackend, SnapExecutable};
use tracing::info;

/// Directedness for formats that do not record their own.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectednessArg {
    Directed,
    Undirected,
}

impl From<DirectednessArg> for Directedness {
    fn from(arg: DirectednessArg) -> Self {
        match arg {
            DirectednessArg::Directed => Self::Directed,
            DirectednessArg::Undirected => Self::Undirected,
        }
    }
}

/// Input file arguments shared by every command that reads a graph.
#[derive(Args, Debug, Clone)]
pub struct InputArgs {
    /// Graph file to read.
    #[arg(value_name = "FILE")]
    pub file: PathBuf,

    /// Input format (graphml, pajek, ucinet, simple); inferred from the
    /// extension when omitted.
    #[arg(long)]
    pub format: Option<GraphFormat>,

    /// Directedness for simple and UCINET files, which do not record it.
    #[arg(long, value_enum, default_value_t = DirectednessArg::Directed)]
    pub directedness: DirectednessArg,
}

impl InputArgs {
    /// Load the graph named by these arguments.
    pub fn load(&self) -> anyhow::Result<Graph> {
        let graph = load_graph_file(&self.file, self.format, self.directedness.into())
            .with_context(|| format!("failed to load {}", self.file.display()))?;
        info!(
            file = %self.file.display(),
            vertices = graph.vertex_count(),
            edges = graph.edge_count(),
            directedness = %graph.directedness(),
            "graph loaded"
        );
        Ok(graph)
    }
}

/// The PageRank backend selected by configuration.
pub fn snap_backend(config: &NodexlConfig) -> anyhow::Result<Box<dyn SnapBackend>> {
    match config.snap.backend {
        SnapBackendKind::InProcess => Ok(Box::new(InProcessPageRank::default())),
        SnapBackendKind::Executable => {
            let exe = SnapExecutable::from_config(&config.snap)
                .context("snap.backend is \"executable\"")?;
            Ok(Box::new(exe))
        }
    }
}

/// Format a metric value with `precision` decimal places.
pub fn format_value(value: f64, precision: usize) -> String {
    format!("{value:.precision$}")
}
