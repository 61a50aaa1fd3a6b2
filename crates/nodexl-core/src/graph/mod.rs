//! Graph model shared by the adapters and the metrics engine.
//!
//! # Overview
//!
//! A [`Graph`] is a multigraph: it may contain self-loops and parallel
//! (duplicate) edges. Every edge carries its own directed/undirected flag and
//! the graph as a whole has a [`Directedness`]. A `Mixed` graph accepts both
//! kinds of edge; `Directed` and `Undirected` graphs reject edges of the other
//! kind.
//!
//! Storage is a `petgraph` [`StableGraph`] with every edge stored as
//! `back → front`. Undirected edges keep the orientation they were added with
//! but are traversed both ways by [`Graph::successors`].
//!
//! ## Identity and ordering
//!
//! [`VertexId`] and [`EdgeId`] stay valid for the lifetime of the graph, even
//! across removals of other vertices or edges. The slot of a removed vertex
//! is vacated and handed to the next vertex added, so that vertex takes the
//! removed id and its enumeration position. [`Graph::vertex_ids`]
//! enumerates vertices in index order: insertion order for a graph without
//! removals, and identical across passes over an unmodified graph. The metrics engine relies on this: the all-pairs
//! shortest path matrix is indexed by enumeration position, not by id.

pub mod duplicates;

use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;

use petgraph::Direction;
use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableGraph};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

pub use duplicates::DuplicateEdgeDetector;

// ---------------------------------------------------------------------------
// Identities
// ---------------------------------------------------------------------------

/// Stable identity of a vertex within one [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VertexId(u32);

impl VertexId {
    /// Raw integer value of the id.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_node(node: NodeIndex) -> Self {
        Self(node.index() as u32)
    }

    fn node(self) -> NodeIndex {
        NodeIndex::new(self.0 as usize)
    }
}

impl fmt::Display for VertexId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Stable identity of an edge within one [`Graph`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EdgeId(u32);

impl EdgeId {
    /// Raw integer value of the id.
    #[must_use]
    pub const fn value(self) -> u32 {
        self.0
    }

    #[allow(clippy::cast_possible_truncation)]
    fn from_edge(edge: EdgeIndex) -> Self {
        Self(edge.index() as u32)
    }

    fn edge(self) -> EdgeIndex {
        EdgeIndex::new(self.0 as usize)
    }
}

// ---------------------------------------------------------------------------
// Directedness
// ---------------------------------------------------------------------------

/// Directedness of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Directedness {
    /// Every edge is directed.
    #[default]
    Directed,
    /// Every edge is undirected.
    Undirected,
    /// Directed and undirected edges may coexist.
    Mixed,
}

impl Directedness {
    /// Whether an edge with the given flag may be added to a graph of this
    /// directedness.
    #[must_use]
    pub const fn accepts(self, edge_is_directed: bool) -> bool {
        match self {
            Self::Directed => edge_is_directed,
            Self::Undirected => !edge_is_directed,
            Self::Mixed => true,
        }
    }

    /// Directedness for newly created edges when the caller does not say.
    ///
    /// `Mixed` graphs default to directed edges.
    #[must_use]
    pub const fn default_edge_is_directed(self) -> bool {
        !matches!(self, Self::Undirected)
    }
}

impl fmt::Display for Directedness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Directed => "directed",
            Self::Undirected => "undirected",
            Self::Mixed => "mixed",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Vertex and edge payloads
// ---------------------------------------------------------------------------

/// Payload stored for each vertex.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Vertex {
    /// Name, unique within the graph. Adapters use it to resolve endpoints.
    pub name: String,
    /// Externally supplied layout order. Used to break ties when sorting
    /// connected components.
    pub layout_sort_order: Option<f32>,
    /// Free-form metadata (GraphML `<data>` values, for instance).
    pub attributes: BTreeMap<String, String>,
}

impl Vertex {
    /// Create a vertex with a name and no metadata.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Payload stored for each edge. Endpoints live in the graph.
#[derive(Debug, Clone, PartialEq)]
pub struct Edge {
    /// Whether the edge runs only from its back vertex to its front vertex.
    pub is_directed: bool,
    /// Optional weight.
    pub weight: Option<f64>,
    /// Free-form metadata.
    pub attributes: BTreeMap<String, String>,
}

impl Edge {
    /// Create an edge payload without weight or metadata.
    #[must_use]
    pub const fn new(is_directed: bool) -> Self {
        Self {
            is_directed,
            weight: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Builder-style weight setter.
    #[must_use]
    pub fn with_weight(mut self, weight: f64) -> Self {
        self.weight = Some(weight);
        self
    }
}

/// Borrowed view of an edge together with its endpoints.
#[derive(Debug, Clone, Copy)]
pub struct EdgeView<'a> {
    /// Edge identity.
    pub id: EdgeId,
    /// Back (source) vertex.
    pub back: VertexId,
    /// Front (target) vertex.
    pub front: VertexId,
    /// Edge payload.
    pub data: &'a Edge,
}

impl EdgeView<'_> {
    /// Whether both endpoints are the same vertex.
    #[must_use]
    pub fn is_self_loop(&self) -> bool {
        self.back == self.front
    }

    /// Whether the edge is directed.
    #[must_use]
    pub const fn is_directed(&self) -> bool {
        self.data.is_directed
    }

    /// The endpoint opposite `vertex`. For a self-loop this is `vertex`.
    #[must_use]
    pub fn opposite(&self, vertex: VertexId) -> VertexId {
        if self.back == vertex {
            self.front
        } else {
            self.back
        }
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Errors raised by graph mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GraphError {
    /// The vertex id does not belong to this graph (or was removed).
    #[error("vertex {0} is not in the graph")]
    UnknownVertex(VertexId),

    /// A vertex with this name already exists.
    #[error("a vertex named {0:?} already exists")]
    DuplicateVertexName(String),

    /// The edge's directedness is not allowed in this graph.
    #[error("cannot add a {} edge to a {graph} graph", edge_kind(.edge_is_directed))]
    DirectednessMismatch {
        /// The graph's directedness.
        graph: Directedness,
        /// The rejected edge's flag.
        edge_is_directed: bool,
    },
}

const fn edge_kind(is_directed: &bool) -> &'static str {
    if *is_directed { "directed" } else { "undirected" }
}

// ---------------------------------------------------------------------------
// Graph
// ---------------------------------------------------------------------------

/// A graph of named vertices and (possibly parallel) edges.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    directedness: Directedness,
    inner: StableGraph<Vertex, Edge>,
    names: HashMap<String, VertexId>,
}

impl Graph {
    /// Create an empty graph.
    #[must_use]
    pub fn new(directedness: Directedness) -> Self {
        Self {
            directedness,
            inner: StableGraph::new(),
            names: HashMap::new(),
        }
    }

    /// The graph's directedness.
    #[must_use]
    pub const fn directedness(&self) -> Directedness {
        self.directedness
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.inner.node_count()
    }

    /// Number of edges, duplicates and self-loops included.
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.inner.edge_count()
    }

    /// Return `true` if the graph has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertex_count() == 0
    }

    // -- vertices -----------------------------------------------------------

    /// Add a vertex with the given name.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateVertexName`] if the name is taken.
    pub fn add_vertex(&mut self, name: impl Into<String>) -> Result<VertexId, GraphError> {
        self.insert_vertex(Vertex::new(name))
    }

    /// Add a fully populated vertex.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::DuplicateVertexName`] if the name is taken.
    pub fn insert_vertex(&mut self, vertex: Vertex) -> Result<VertexId, GraphError> {
        if self.names.contains_key(&vertex.name) {
            return Err(GraphError::DuplicateVertexName(vertex.name));
        }
        let name = vertex.name.clone();
        let id = VertexId::from_node(self.inner.add_node(vertex));
        self.names.insert(name, id);
        Ok(id)
    }

    /// Return the vertex with `name`, adding it first if necessary.
    pub fn get_or_add_vertex(&mut self, name: &str) -> VertexId {
        if let Some(&id) = self.names.get(name) {
            return id;
        }
        let id = VertexId::from_node(self.inner.add_node(Vertex::new(name)));
        self.names.insert(name.to_string(), id);
        id
    }

    /// Look a vertex up by name.
    #[must_use]
    pub fn vertex_by_name(&self, name: &str) -> Option<VertexId> {
        self.names.get(name).copied()
    }

    /// Borrow a vertex payload.
    #[must_use]
    pub fn vertex(&self, id: VertexId) -> Option<&Vertex> {
        self.inner.node_weight(id.node())
    }

    /// Mutably borrow a vertex payload.
    ///
    /// Renaming through this reference is not tracked by the name index; use
    /// it for metadata only.
    pub fn vertex_mut(&mut self, id: VertexId) -> Option<&mut Vertex> {
        self.inner.node_weight_mut(id.node())
    }

    /// Whether `id` refers to a live vertex.
    #[must_use]
    pub fn contains_vertex(&self, id: VertexId) -> bool {
        self.inner.contains_node(id.node())
    }

    /// Remove a vertex and all of its incident edges.
    ///
    /// The next vertex added reuses the removed id and enumeration slot.
    pub fn remove_vertex(&mut self, id: VertexId) -> Option<Vertex> {
        let vertex = self.inner.remove_node(id.node())?;
        self.names.remove(&vertex.name);
        Some(vertex)
    }

    /// Vertex ids in enumeration order.
    pub fn vertex_ids(&self) -> impl Iterator<Item = VertexId> + '_ {
        self.inner.node_indices().map(VertexId::from_node)
    }

    /// Vertices with their ids, in enumeration order.
    pub fn vertices(&self) -> impl Iterator<Item = (VertexId, &Vertex)> + '_ {
        self.inner
            .node_indices()
            .filter_map(|n| self.inner.node_weight(n).map(|v| (VertexId::from_node(n), v)))
    }

    /// Position of every vertex in enumeration order.
    #[must_use]
    pub fn vertex_positions(&self) -> HashMap<VertexId, usize> {
        self.vertex_ids()
            .enumerate()
            .map(|(i, id)| (id, i))
            .collect()
    }

    /// Whether at least one vertex carries a layout sort order.
    #[must_use]
    pub fn has_layout_sort_order(&self) -> bool {
        self.vertices().any(|(_, v)| v.layout_sort_order.is_some())
    }

    // -- edges --------------------------------------------------------------

    /// Add an edge using the graph's default edge directedness.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVertex`] if either endpoint is missing.
    pub fn connect(&mut self, back: VertexId, front: VertexId) -> Result<EdgeId, GraphError> {
        let is_directed = self.directedness.default_edge_is_directed();
        self.add_edge(back, front, Edge::new(is_directed))
    }

    /// Add an edge `back → front` with the given payload.
    ///
    /// # Errors
    ///
    /// Returns [`GraphError::UnknownVertex`] if either endpoint is missing and
    /// [`GraphError::DirectednessMismatch`] if the edge's flag is not allowed
    /// in this graph.
    pub fn add_edge(
        &mut self,
        back: VertexId,
        front: VertexId,
        edge: Edge,
    ) -> Result<EdgeId, GraphError> {
        for id in [back, front] {
            if !self.contains_vertex(id) {
                return Err(GraphError::UnknownVertex(id));
            }
        }
        if !self.directedness.accepts(edge.is_directed) {
            return Err(GraphError::DirectednessMismatch {
                graph: self.directedness,
                edge_is_directed: edge.is_directed,
            });
        }
        Ok(EdgeId::from_edge(
            self.inner.add_edge(back.node(), front.node(), edge),
        ))
    }

    /// Remove an edge.
    pub fn remove_edge(&mut self, id: EdgeId) -> Option<Edge> {
        self.inner.remove_edge(id.edge())
    }

    /// Borrow an edge with its endpoints.
    #[must_use]
    pub fn edge(&self, id: EdgeId) -> Option<EdgeView<'_>> {
        let (back, front) = self.inner.edge_endpoints(id.edge())?;
        let data = self.inner.edge_weight(id.edge())?;
        Some(EdgeView {
            id,
            back: VertexId::from_node(back),
            front: VertexId::from_node(front),
            data,
        })
    }

    /// All edges in index order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeView<'_>> + '_ {
        self.inner.edge_indices().filter_map(|e| self.edge(EdgeId::from_edge(e)))
    }

    /// Number of self-loops.
    #[must_use]
    pub fn self_loop_count(&self) -> usize {
        self.edges().filter(EdgeView::is_self_loop).count()
    }

    /// Every edge touching `vertex`, each reported once.
    #[must_use]
    pub fn incident_edges(&self, vertex: VertexId) -> Vec<EdgeView<'_>> {
        let node = vertex.node();
        if !self.inner.contains_node(node) {
            return Vec::new();
        }

        let outgoing = self.inner.edges_directed(node, Direction::Outgoing);
        // A self-loop sits on both the outgoing and incoming lists.
        let incoming = self
            .inner
            .edges_directed(node, Direction::Incoming)
            .filter(|e| e.source() != e.target());

        outgoing
            .chain(incoming)
            .map(|e| EdgeView {
                id: EdgeId::from_edge(e.id()),
                back: VertexId::from_node(e.source()),
                front: VertexId::from_node(e.target()),
                data: e.weight(),
            })
            .collect()
    }

    /// Distinct vertices one step away from `vertex` along edge direction.
    ///
    /// Directed edges are followed from back to front; undirected edges are
    /// followed either way. `vertex` itself appears only if it has a
    /// self-loop.
    #[must_use]
    pub fn successors(&self, vertex: VertexId) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for edge in self.incident_edges(vertex) {
            let next = if edge.is_directed() {
                if edge.back != vertex {
                    continue;
                }
                edge.front
            } else {
                edge.opposite(vertex)
            };
            if seen.insert(next) {
                out.push(next);
            }
        }
        out
    }

    /// Distinct vertices joined to `vertex` by any incident edge, direction
    /// ignored. `vertex` itself appears only if it has a self-loop.
    #[must_use]
    pub fn adjacent_vertices(&self, vertex: VertexId) -> Vec<VertexId> {
        let mut seen = HashSet::new();
        let mut out = Vec::new();
        for edge in self.incident_edges(vertex) {
            let other = edge.opposite(vertex);
            if seen.insert(other) {
                out.push(other);
            }
        }
        out
    }

    /// Whether an edge connects `back` to `front` along edge direction.
    #[must_use]
    pub fn has_edge_toward(&self, back: VertexId, front: VertexId) -> bool {
        self.successors(back).contains(&front)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
