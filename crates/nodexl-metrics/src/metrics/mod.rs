//! Graph metric calculators.
//!
//! # Overview
//!
//! Every calculator implements [`crate::calculator::GraphMetricCalculator`]
//! and answers one question about the graph:
//!
//! - **Shortest paths** (`shortest_path`): how many hops separate each pair
//!   of vertices? (Floyd–Warshall)
//! - **Betweenness** (`betweenness`): which vertices sit on the most
//!   shortest paths? (Brandes)
//! - **Closeness** (`closeness`): how far, on average, is each vertex from
//!   the vertices it can reach?
//! - **Clustering coefficient** (`clustering`): how close is each vertex's
//!   neighbourhood to a clique?
//! - **Connected components** (`components`): which vertices are joined by
//!   some path, ignoring direction? (Tarjan)
//! - **Eigenvector centrality** (`eigenvector`): which vertices connect to
//!   other well-connected vertices? (power iteration)
//! - **Degree** (`degree`): in, out and total degree per vertex.
//! - **Overall metrics** (`overall`): graph-wide counts, density, component
//!   and geodesic statistics.
//! - **PageRank** (`pagerank`): delegated to a [`crate::snap::SnapBackend`].
//!
//! # Usage
//!
//! ```rust,ignore
//! use nodexl_metrics::calculator::GraphMetricCalculator;
//! use nodexl_metrics::metrics::BetweennessCentralityCalculator;
//!
//! let graph: Graph = /* load or build */;
//! let scores = BetweennessCentralityCalculator.calculate_graph_metrics(&graph)?;
//! ```

pub mod betweenness;
pub mod closeness;
pub mod clustering;
pub mod components;
pub mod degree;
pub mod eigenvector;
pub mod overall;
pub mod pagerank;
pub mod shortest_path;

use std::collections::BTreeMap;

use nodexl_core::VertexId;

pub use betweenness::BetweennessCentralityCalculator;
pub use closeness::ClosenessCentralityCalculator;
pub use clustering::ClusteringCoefficientCalculator;
pub use components::{ComponentSortOrder, ConnectedComponentCalculator};
pub use degree::{VertexDegreeCalculator, VertexDegrees};
pub use eigenvector::{EigenvectorCentralityCalculator, EigenvectorResult};
pub use overall::{OverallMetricCalculator, OverallMetrics};
pub use pagerank::PageRankCalculator;
pub use shortest_path::{AllPairsShortestPathCalculator, NO_PATH, ShortestPathMatrix};

/// One value per vertex.
pub type VertexMetrics = BTreeMap<VertexId, f64>;
