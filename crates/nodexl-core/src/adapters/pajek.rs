//! Pajek `.net` subset.
//!
//! ```text
//! *Vertices 3
//! 1 "Alice" 0.1 0.2
//! 2 "Bob"
//! 3
//! *Arcs
//! 1 2 2.5
//! *Edgeslist
//! 2 1 3
//! ```
//!
//! Recognised sections are `*Vertices`, `*Edges`, `*Arcs`, `*Edgeslist` and
//! `*Arcslist`. A `*Network` line is accepted and ignored, as are lines
//! starting with `%`. Vertex labels default to the vertex number. Optional
//! coordinates after the label are kept as `x` and `y` attributes.
//!
//! The graph is `Directed` if only arcs appear, `Undirected` if only edges
//! appear, and `Mixed` if both do.

use std::collections::HashSet;
use std::io::{BufRead, Write};

use super::{AdapterError, GraphAdapter, GraphFormat, numbered_lines};
use crate::graph::{Directedness, Edge, Graph, Vertex, VertexId};

/// Largest `*Vertices` count a [`Graph`] can index.
const MAX_VERTICES: usize = u32::MAX as usize - 1;

/// Reads and writes Pajek network files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PajekGraphAdapter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Vertices,
    Pairs { directed: bool },
    Lists { directed: bool },
}

#[derive(Debug)]
struct PendingEdge {
    back: usize,
    front: usize,
    directed: bool,
    weight: Option<f64>,
}

/// Parse state accumulated before the graph is built.
#[derive(Debug, Default)]
struct Parsed {
    vertex_count: Option<usize>,
    vertices: Vec<Option<Vertex>>,
    edges: Vec<PendingEdge>,
    saw_arcs: bool,
    saw_edges: bool,
}

impl Parsed {
    fn vertex_number(&self, token: &str, line_no: usize, line: &str) -> Result<usize, AdapterError> {
        let n = self.vertex_count.unwrap_or(0);
        match token.parse::<usize>() {
            Ok(v) if (1..=n).contains(&v) => Ok(v),
            Ok(_) => Err(AdapterError::format(
                line_no,
                format!("vertex number must be between 1 and {n}"),
                line,
            )),
            Err(_) => Err(AdapterError::format(line_no, "expected a vertex number", line)),
        }
    }

    fn parse_vertex(&mut self, line_no: usize, line: &str) -> Result<(), AdapterError> {
        let tokens = tokenize(line)
            .ok_or_else(|| AdapterError::format(line_no, "unterminated quoted label", line))?;
        let Some((first, rest)) = tokens.split_first() else {
            return Ok(());
        };
        let number = self.vertex_number(first, line_no, line)?;

        let mut vertex = Vertex::new(rest.first().map_or_else(|| number.to_string(), Clone::clone));
        for (key, value) in ["x", "y"].iter().zip(rest.iter().skip(1)) {
            if value.parse::<f64>().is_ok() {
                vertex.attributes.insert((*key).to_string(), value.clone());
            }
        }

        let slot = &mut self.vertices[number - 1];
        if slot.is_some() {
            return Err(AdapterError::format(line_no, "vertex listed twice", line));
        }
        *slot = Some(vertex);
        Ok(())
    }

    fn parse_pair(&mut self, line_no: usize, line: &str, directed: bool) -> Result<(), AdapterError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let [back, front, rest @ ..] = tokens.as_slice() else {
            return Err(AdapterError::format(line_no, "expected two vertex numbers", line));
        };
        let back = self.vertex_number(back, line_no, line)?;
        let front = self.vertex_number(front, line_no, line)?;
        let weight = match rest.first() {
            Some(w) => Some(
                w.parse::<f64>()
                    .map_err(|_| AdapterError::format(line_no, "invalid edge weight", line))?,
            ),
            None => None,
        };
        self.push_edge(back, front, directed, weight);
        Ok(())
    }

    fn parse_list(&mut self, line_no: usize, line: &str, directed: bool) -> Result<(), AdapterError> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let Some((back, fronts)) = tokens.split_first() else {
            return Ok(());
        };
        let back = self.vertex_number(back, line_no, line)?;
        for front in fronts {
            let front = self.vertex_number(front, line_no, line)?;
            self.push_edge(back, front, directed, None);
        }
        Ok(())
    }

    fn push_edge(&mut self, back: usize, front: usize, directed: bool, weight: Option<f64>) {
        if directed {
            self.saw_arcs = true;
        } else {
            self.saw_edges = true;
        }
        self.edges.push(PendingEdge {
            back,
            front,
            directed,
            weight,
        });
    }

    const fn directedness(&self) -> Directedness {
        match (self.saw_arcs, self.saw_edges) {
            (true, true) => Directedness::Mixed,
            (false, true) => Directedness::Undirected,
            _ => Directedness::Directed,
        }
    }

    fn into_graph(self) -> Result<Graph, AdapterError> {
        let mut graph = Graph::new(self.directedness());
        let mut ids: Vec<VertexId> = Vec::with_capacity(self.vertices.len());
        for (i, vertex) in self.vertices.into_iter().enumerate() {
            let vertex = vertex.unwrap_or_else(|| Vertex::new((i + 1).to_string()));
            ids.push(graph.insert_vertex(vertex)?);
        }
        for edge in self.edges {
            let mut payload = Edge::new(edge.directed);
            payload.weight = edge.weight;
            graph.add_edge(ids[edge.back - 1], ids[edge.front - 1], payload)?;
        }
        Ok(graph)
    }
}

/// Split a line on whitespace, keeping double-quoted runs together.
/// Returns `None` for an unterminated quote.
fn tokenize(line: &str) -> Option<Vec<String>> {
    let mut tokens = Vec::new();
    let mut chars = line.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '"' {
            chars.next();
            let mut token = String::new();
            loop {
                match chars.next() {
                    Some('"') => break,
                    Some(ch) => token.push(ch),
                    None => return None,
                }
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&ch) = chars.peek() {
                if ch.is_whitespace() {
                    break;
                }
                token.push(ch);
                chars.next();
            }
            tokens.push(token);
        }
    }
    Some(tokens)
}

fn parse_section_header(line_no: usize, line: &str) -> Result<(Section, Option<&str>), AdapterError> {
    let mut parts = line.split_whitespace();
    let keyword = parts.next().unwrap_or_default().to_ascii_lowercase();
    let section = match keyword.as_str() {
        "*network" => Section::Preamble,
        "*vertices" => Section::Vertices,
        "*edges" => Section::Pairs { directed: false },
        "*arcs" => Section::Pairs { directed: true },
        "*edgeslist" => Section::Lists { directed: false },
        "*arcslist" => Section::Lists { directed: true },
        _ => {
            return Err(AdapterError::format(
                line_no,
                "unsupported Pajek section",
                line,
            ));
        }
    };
    Ok((section, parts.next()))
}

impl GraphAdapter for PajekGraphAdapter {
    fn load(&self, reader: &mut dyn BufRead) -> Result<Graph, AdapterError> {
        let mut parsed = Parsed::default();
        let mut section = Section::Preamble;

        for entry in numbered_lines(reader) {
            let (line_no, line) = entry?;
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('%') {
                continue;
            }

            if trimmed.starts_with('*') {
                let (next, argument) = parse_section_header(line_no, trimmed)?;
                if next == Section::Vertices {
                    if parsed.vertex_count.is_some() {
                        return Err(AdapterError::format(line_no, "second *Vertices section", &line));
                    }
                    let n = argument
                        .and_then(|a| a.parse::<usize>().ok())
                        .ok_or_else(|| {
                            AdapterError::format(line_no, "*Vertices needs a vertex count", &line)
                        })?;
                    if n > MAX_VERTICES || parsed.vertices.try_reserve_exact(n).is_err() {
                        return Err(AdapterError::format(
                            line_no,
                            "*Vertices count too large",
                            &line,
                        ));
                    }
                    parsed.vertex_count = Some(n);
                    parsed.vertices.resize_with(n, || None);
                } else if next != Section::Preamble && parsed.vertex_count.is_none() {
                    return Err(AdapterError::format(
                        line_no,
                        "edge section before *Vertices",
                        &line,
                    ));
                }
                section = next;
                continue;
            }

            match section {
                Section::Preamble => {
                    return Err(AdapterError::format(
                        line_no,
                        "expected a *Vertices section",
                        &line,
                    ));
                }
                Section::Vertices => parsed.parse_vertex(line_no, trimmed)?,
                Section::Pairs { directed } => parsed.parse_pair(line_no, trimmed, directed)?,
                Section::Lists { directed } => parsed.parse_list(line_no, trimmed, directed)?,
            }
        }

        if parsed.vertex_count.is_none() {
            return Err(AdapterError::format(0, "missing *Vertices section", ""));
        }
        parsed.into_graph()
    }

    fn save(&self, graph: &Graph, writer: &mut dyn Write) -> Result<(), AdapterError> {
        let positions = graph.vertex_positions();

        writeln!(writer, "*Vertices {}", graph.vertex_count())?;
        for (i, (_, vertex)) in graph.vertices().enumerate() {
            if vertex.name.contains(['"', '\n', '\r']) {
                return Err(AdapterError::Unsupported {
                    format: GraphFormat::Pajek,
                    reason: format!("vertex name {:?} cannot be quoted", vertex.name),
                });
            }
            write!(writer, "{} \"{}\"", i + 1, vertex.name)?;
            if let (Some(x), Some(y)) = (vertex.attributes.get("x"), vertex.attributes.get("y")) {
                write!(writer, " {x} {y}")?;
            }
            writeln!(writer)?;
        }

        let mut written_headers = HashSet::new();
        for directed in [false, true] {
            for edge in graph.edges().filter(|e| e.is_directed() == directed) {
                if written_headers.insert(directed) {
                    writeln!(writer, "{}", if directed { "*Arcs" } else { "*Edges" })?;
                }
                write!(
                    writer,
                    "{} {}",
                    positions[&edge.back] + 1,
                    positions[&edge.front] + 1
                )?;
                if let Some(w) = edge.data.weight {
                    write!(writer, " {w}")?;
                }
                writeln!(writer)?;
            }
        }

        Ok(())
    }
}
