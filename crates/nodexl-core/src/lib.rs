#![forbid(unsafe_code)]
//! nodexl-core library.
//!
//! Graph model, duplicate-edge detection, graph file adapters, and the
//! TOML configuration shared by the metrics engine and the CLI.
//!
//! # Conventions
//!
//! - **Errors**: Each module exposes a `thiserror` enum; binaries wrap them
//!   in `anyhow`.
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod adapters;
pub mod config;
pub mod error;
pub mod graph;

pub use graph::{
    Directedness, DuplicateEdgeDetector, Edge, EdgeId, EdgeView, Graph, GraphError, Vertex,
    VertexId,
};
