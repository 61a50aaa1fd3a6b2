//! GraphML.
//!
//! # Reading
//!
//! `<key>` declarations map `<data key="…">` children of `<node>` and
//! `<edge>` elements to attribute names (`attr.name`, falling back to the key
//! id). Two attribute names are special:
//!
//! - an edge attribute named `weight` (any case) fills [`Edge::weight`],
//! - a node attribute named `layout_sort_order` fills
//!   [`Vertex::layout_sort_order`].
//!
//! Key `<default>` values apply to elements that omit the data. The graph's
//! `edgedefault` together with per-edge `directed` overrides decides the
//! [`Directedness`]: any override that disagrees with the default makes the
//! graph `Mixed`. Only the first `<graph>` in a file is read.
//!
//! # Writing
//!
//! Every attribute name used by any vertex or edge gets a `string` key, plus
//! `double` keys for weights and layout order when present. Mixed graphs are
//! written with `edgedefault="directed"` and `directed="false"` on their
//! undirected edges.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::io::{BufRead, Write};

use quick_xml::events::attributes::Attributes;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{AdapterError, GraphAdapter};
use crate::graph::{Directedness, Edge, EdgeView, Graph, Vertex, VertexId};

const GRAPHML_NS: &str = "http://graphml.graphdrawing.org/xmlns";
const WEIGHT_ATTRIBUTE: &str = "weight";
const LAYOUT_ATTRIBUTE: &str = "layout_sort_order";

/// Reads and writes GraphML.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphMlGraphAdapter;

// ---------------------------------------------------------------------------
// Reading
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum KeyDomain {
    Node,
    Edge,
    Any,
}

#[derive(Debug)]
struct KeyDecl {
    domain: KeyDomain,
    name: String,
    default: Option<String>,
}

#[derive(Debug)]
struct PendingNode {
    id: String,
    data: BTreeMap<String, String>,
}

#[derive(Debug)]
struct PendingEdge {
    source: String,
    target: String,
    directed: Option<bool>,
    data: BTreeMap<String, String>,
}

/// Where the reader currently is.
#[derive(Debug, Default)]
enum Scope {
    #[default]
    Outside,
    Key(String),
    KeyDefault(String),
    Node(PendingNode),
    Edge(PendingEdge),
    NodeData(PendingNode, String),
    EdgeData(PendingEdge, String),
}

#[derive(Debug, Default)]
struct Document {
    keys: HashMap<String, KeyDecl>,
    edge_default_directed: Option<bool>,
    graphs_seen: usize,
    nodes: Vec<PendingNode>,
    edges: Vec<PendingEdge>,
}

fn invalid(message: impl Into<String>) -> AdapterError {
    AdapterError::GraphMl(message.into())
}

fn attributes_of(attributes: Attributes<'_>) -> Result<HashMap<String, String>, AdapterError> {
    let mut out = HashMap::new();
    for attr in attributes {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        out.insert(key, value);
    }
    Ok(out)
}

fn required(
    attrs: &mut HashMap<String, String>,
    element: &str,
    name: &str,
) -> Result<String, AdapterError> {
    attrs
        .remove(name)
        .ok_or_else(|| invalid(format!("<{element}> is missing the {name} attribute")))
}

fn parse_bool(value: &str, what: &str) -> Result<bool, AdapterError> {
    match value {
        "true" | "directed" => Ok(true),
        "false" | "undirected" => Ok(false),
        other => Err(invalid(format!("invalid {what} value {other:?}"))),
    }
}

impl Document {
    /// Handle an opening (or self-closing) tag. Returns the new scope.
    fn open(&mut self, scope: Scope, tag: &BytesStart<'_>) -> Result<Scope, AdapterError> {
        let name = String::from_utf8_lossy(tag.local_name().as_ref()).into_owned();
        let mut attrs = attributes_of(tag.attributes())?;

        let next = match (scope, name.as_str()) {
            (Scope::Outside, "key") => {
                let id = required(&mut attrs, "key", "id")?;
                let domain = match attrs.get("for").map(String::as_str) {
                    Some("node") => KeyDomain::Node,
                    Some("edge") => KeyDomain::Edge,
                    _ => KeyDomain::Any,
                };
                let name = attrs.remove("attr.name").unwrap_or_else(|| id.clone());
                self.keys.insert(
                    id.clone(),
                    KeyDecl {
                        domain,
                        name,
                        default: None,
                    },
                );
                Scope::Key(id)
            }
            (Scope::Key(id), "default") => Scope::KeyDefault(id),
            (Scope::Outside, "graph") => {
                self.graphs_seen += 1;
                if self.graphs_seen == 1 {
                    let default = attrs
                        .get("edgedefault")
                        .ok_or_else(|| invalid("<graph> is missing the edgedefault attribute"))?;
                    self.edge_default_directed = Some(parse_bool(default, "edgedefault")?);
                }
                Scope::Outside
            }
            (Scope::Outside, "node") if self.graphs_seen == 1 => Scope::Node(PendingNode {
                id: required(&mut attrs, "node", "id")?,
                data: BTreeMap::new(),
            }),
            (Scope::Outside, "edge") if self.graphs_seen == 1 => {
                let directed = match attrs.get("directed") {
                    Some(v) => Some(parse_bool(v, "directed")?),
                    None => None,
                };
                Scope::Edge(PendingEdge {
                    source: required(&mut attrs, "edge", "source")?,
                    target: required(&mut attrs, "edge", "target")?,
                    directed,
                    data: BTreeMap::new(),
                })
            }
            (Scope::Node(node), "data") => {
                let key = required(&mut attrs, "data", "key")?;
                Scope::NodeData(node, key)
            }
            (Scope::Edge(edge), "data") => {
                let key = required(&mut attrs, "data", "key")?;
                Scope::EdgeData(edge, key)
            }
            // Anything else (desc, ports, nested graphs, extension elements)
            // is skipped without changing scope.
            (scope, _) => scope,
        };
        Ok(next)
    }

    /// Handle a closing tag (or the implicit close of a self-closing tag).
    fn close(&mut self, scope: Scope, name: &[u8]) -> Scope {
        match (scope, name) {
            (Scope::Key(_), b"key") => Scope::Outside,
            (Scope::KeyDefault(id), b"default") => Scope::Key(id),
            (Scope::Node(node), b"node") => {
                self.nodes.push(node);
                Scope::Outside
            }
            (Scope::Edge(edge), b"edge") => {
                self.edges.push(edge);
                Scope::Outside
            }
            (Scope::NodeData(node, _), b"data") => Scope::Node(node),
            (Scope::EdgeData(edge, _), b"data") => Scope::Edge(edge),
            (scope, _) => scope,
        }
    }

    fn text(&mut self, scope: &mut Scope, value: &str) {
        match scope {
            Scope::KeyDefault(id) => {
                if let Some(key) = self.keys.get_mut(id.as_str()) {
                    key.default.get_or_insert_with(String::new).push_str(value);
                }
            }
            Scope::NodeData(node, key) => {
                node.data.entry(key.clone()).or_default().push_str(value);
            }
            Scope::EdgeData(edge, key) => {
                edge.data.entry(key.clone()).or_default().push_str(value);
            }
            _ => {}
        }
    }

    /// Resolve `<data>` key ids to attribute names and apply key defaults.
    fn resolve(
        &self,
        data: BTreeMap<String, String>,
        domain: KeyDomain,
    ) -> BTreeMap<String, String> {
        let mut out = BTreeMap::new();
        for key in self.keys.values() {
            if key.domain != KeyDomain::Any && key.domain != domain {
                continue;
            }
            if let Some(default) = &key.default {
                out.insert(key.name.clone(), default.clone());
            }
        }
        for (key_id, value) in data {
            let name = self
                .keys
                .get(&key_id)
                .map_or(key_id, |key| key.name.clone());
            out.insert(name, value);
        }
        out
    }

    fn into_graph(mut self) -> Result<Graph, AdapterError> {
        let default_directed = self
            .edge_default_directed
            .ok_or_else(|| invalid("no <graph> element"))?;
        let mixed = self
            .edges
            .iter()
            .any(|e| e.directed.is_some_and(|d| d != default_directed));
        let directedness = match (mixed, default_directed) {
            (true, _) => Directedness::Mixed,
            (false, true) => Directedness::Directed,
            (false, false) => Directedness::Undirected,
        };

        let mut graph = Graph::new(directedness);
        let mut ids: HashMap<String, VertexId> = HashMap::new();

        for node in &self.nodes {
            let mut attributes = self.resolve(node.data.clone(), KeyDomain::Node);
            let layout_sort_order = match attributes.remove(LAYOUT_ATTRIBUTE) {
                Some(v) => Some(v.trim().parse::<f32>().map_err(|_| {
                    invalid(format!("node {:?} has a non-numeric {LAYOUT_ATTRIBUTE}", node.id))
                })?),
                None => None,
            };
            let id = graph.insert_vertex(Vertex {
                name: node.id.clone(),
                layout_sort_order,
                attributes,
            })?;
            ids.insert(node.id.clone(), id);
        }

        let edges = std::mem::take(&mut self.edges);
        for edge in edges {
            let endpoint = |name: &str| {
                ids.get(name)
                    .copied()
                    .ok_or_else(|| invalid(format!("edge refers to unknown node {name:?}")))
            };
            let back = endpoint(&edge.source)?;
            let front = endpoint(&edge.target)?;

            let mut attributes = self.resolve(edge.data, KeyDomain::Edge);
            let weight_key = attributes
                .keys()
                .find(|k| k.eq_ignore_ascii_case(WEIGHT_ATTRIBUTE))
                .cloned();
            let weight = match weight_key.and_then(|k| attributes.remove(&k)) {
                Some(v) => Some(
                    v.trim()
                        .parse::<f64>()
                        .map_err(|_| invalid(format!("non-numeric edge weight {v:?}")))?,
                ),
                None => None,
            };

            graph.add_edge(
                back,
                front,
                Edge {
                    is_directed: edge.directed.unwrap_or(default_directed),
                    weight,
                    attributes,
                },
            )?;
        }

        Ok(graph)
    }
}

impl GraphAdapter for GraphMlGraphAdapter {
    fn load(&self, reader: &mut dyn BufRead) -> Result<Graph, AdapterError> {
        let mut xml = Reader::from_reader(reader);
        xml.trim_text(true);

        let mut doc = Document::default();
        let mut scope = Scope::Outside;
        let mut saw_root = false;
        let mut buf = Vec::new();

        loop {
            match xml.read_event_into(&mut buf)? {
                Event::Start(tag) => {
                    saw_root |= tag.local_name().as_ref() == b"graphml";
                    scope = doc.open(std::mem::take(&mut scope), &tag)?;
                }
                Event::Empty(tag) => {
                    scope = doc.open(std::mem::take(&mut scope), &tag)?;
                    scope = doc.close(scope, tag.local_name().as_ref());
                }
                Event::End(tag) => {
                    scope = doc.close(std::mem::take(&mut scope), tag.local_name().as_ref());
                }
                Event::Text(text) => {
                    let value = text.unescape()?;
                    doc.text(&mut scope, &value);
                }
                Event::CData(data) => {
                    let value = String::from_utf8_lossy(&data);
                    doc.text(&mut scope, &value);
                }
                Event::Eof => break,
                _ => {}
            }
            buf.clear();
        }

        if !saw_root {
            return Err(invalid("missing <graphml> root element"));
        }
        doc.into_graph()
    }

    fn save(&self, graph: &Graph, writer: &mut dyn Write) -> Result<(), AdapterError> {
        {
            let mut xml = Writer::new_with_indent(&mut *writer, b' ', 2);
            write_document(&mut xml, graph)?;
        }
        writer.write_all(b"\n")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Writing
// ---------------------------------------------------------------------------

fn node_key(name: &str) -> String {
    format!("v_{name}")
}

fn edge_key(name: &str) -> String {
    format!("e_{name}")
}

fn vertex_name(graph: &Graph, id: VertexId) -> &str {
    graph.vertex(id).map_or("", |v| v.name.as_str())
}

fn write_key<W: Write>(
    xml: &mut Writer<W>,
    id: &str,
    domain: &str,
    name: &str,
    kind: &str,
) -> quick_xml::Result<()> {
    let mut key = BytesStart::new("key");
    key.push_attribute(("id", id));
    key.push_attribute(("for", domain));
    key.push_attribute(("attr.name", name));
    key.push_attribute(("attr.type", kind));
    xml.write_event(Event::Empty(key))
}

fn write_data<W: Write>(xml: &mut Writer<W>, key: &str, value: &str) -> quick_xml::Result<()> {
    let mut data = BytesStart::new("data");
    data.push_attribute(("key", key));
    xml.write_event(Event::Start(data))?;
    xml.write_event(Event::Text(BytesText::new(value)))?;
    xml.write_event(Event::End(BytesEnd::new("data")))
}

fn write_edge<W: Write>(
    xml: &mut Writer<W>,
    graph: &Graph,
    edge: &EdgeView<'_>,
) -> Result<(), AdapterError> {
    let mut tag = BytesStart::new("edge");
    tag.push_attribute(("source", vertex_name(graph, edge.back)));
    tag.push_attribute(("target", vertex_name(graph, edge.front)));
    if graph.directedness() == Directedness::Mixed && !edge.is_directed() {
        tag.push_attribute(("directed", "false"));
    }

    if edge.data.weight.is_none() && edge.data.attributes.is_empty() {
        xml.write_event(Event::Empty(tag))?;
        return Ok(());
    }

    xml.write_event(Event::Start(tag))?;
    if let Some(weight) = edge.data.weight {
        write_data(xml, &edge_key(WEIGHT_ATTRIBUTE), &weight.to_string())?;
    }
    for (k, v) in &edge.data.attributes {
        write_data(xml, &edge_key(k), v)?;
    }
    xml.write_event(Event::End(BytesEnd::new("edge")))?;
    Ok(())
}

fn write_document<W: Write>(xml: &mut Writer<W>, graph: &Graph) -> Result<(), AdapterError> {
    xml.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
    let mut root = BytesStart::new("graphml");
    root.push_attribute(("xmlns", GRAPHML_NS));
    xml.write_event(Event::Start(root))?;

    let node_attrs: BTreeSet<&str> = graph
        .vertices()
        .flat_map(|(_, v)| v.attributes.keys().map(String::as_str))
        .filter(|k| *k != LAYOUT_ATTRIBUTE)
        .collect();
    let edge_attrs: BTreeSet<&str> = graph
        .edges()
        .flat_map(|e| e.data.attributes.keys().map(String::as_str))
        .filter(|k| !k.eq_ignore_ascii_case(WEIGHT_ATTRIBUTE))
        .collect();

    if graph.has_layout_sort_order() {
        write_key(xml, &node_key(LAYOUT_ATTRIBUTE), "node", LAYOUT_ATTRIBUTE, "double")?;
    }
    for name in &node_attrs {
        write_key(xml, &node_key(name), "node", name, "string")?;
    }
    if graph.edges().any(|e| e.data.weight.is_some()) {
        write_key(xml, &edge_key(WEIGHT_ATTRIBUTE), "edge", WEIGHT_ATTRIBUTE, "double")?;
    }
    for name in &edge_attrs {
        write_key(xml, &edge_key(name), "edge", name, "string")?;
    }

    let mut tag = BytesStart::new("graph");
    let edge_default = if graph.directedness() == Directedness::Undirected {
        "undirected"
    } else {
        "directed"
    };
    tag.push_attribute(("edgedefault", edge_default));
    xml.write_event(Event::Start(tag))?;

    for (_, vertex) in graph.vertices() {
        let mut node = BytesStart::new("node");
        node.push_attribute(("id", vertex.name.as_str()));
        let data: Vec<(&str, &str)> = vertex
            .attributes
            .iter()
            .filter(|(k, _)| k.as_str() != LAYOUT_ATTRIBUTE)
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        if vertex.layout_sort_order.is_none() && data.is_empty() {
            xml.write_event(Event::Empty(node))?;
            continue;
        }
        xml.write_event(Event::Start(node))?;
        if let Some(order) = vertex.layout_sort_order {
            write_data(xml, &node_key(LAYOUT_ATTRIBUTE), &order.to_string())?;
        }
        for (k, v) in data {
            write_data(xml, &node_key(k), v)?;
        }
        xml.write_event(Event::End(BytesEnd::new("node")))?;
    }

    for edge in graph.edges() {
        write_edge(xml, graph, &edge)?;
    }

    xml.write_event(Event::End(BytesEnd::new("graph")))?;
    xml.write_event(Event::End(BytesEnd::new("graphml")))?;
    Ok(())
}
