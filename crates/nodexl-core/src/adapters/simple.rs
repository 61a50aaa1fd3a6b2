//! Tab-delimited two-column edge list.
//!
//! Each non-empty line is either `vertex1<TAB>vertex2` (an edge) or a single
//! `vertex` (an isolated vertex). The format has no header and no way to
//! record directedness, so the adapter is configured with one.

use std::io::{BufRead, Write};

use super::{AdapterError, GraphAdapter, GraphFormat, numbered_lines};
use crate::graph::{Directedness, Graph, GraphError, VertexId};

/// Reads and writes the simple tab-delimited format.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleGraphAdapter {
    directedness: Directedness,
}

impl SimpleGraphAdapter {
    /// Adapter that loads graphs with the given directedness.
    #[must_use]
    pub const fn new(directedness: Directedness) -> Self {
        Self { directedness }
    }
}

impl GraphAdapter for SimpleGraphAdapter {
    fn load(&self, reader: &mut dyn BufRead) -> Result<Graph, AdapterError> {
        let mut graph = Graph::new(self.directedness);

        for entry in numbered_lines(reader) {
            let (line_no, line) = entry?;
            if line.trim().is_empty() {
                continue;
            }

            let fields: Vec<&str> = line.split('\t').map(str::trim).collect();
            if fields.iter().any(|f| f.is_empty()) {
                return Err(AdapterError::format(line_no, "empty vertex name", &line));
            }

            match fields.as_slice() {
                [name] => {
                    graph.get_or_add_vertex(name);
                }
                [back, front] => {
                    let back = graph.get_or_add_vertex(back);
                    let front = graph.get_or_add_vertex(front);
                    graph.connect(back, front)?;
                }
                _ => {
                    return Err(AdapterError::format(
                        line_no,
                        "expected one or two tab-separated vertex names",
                        &line,
                    ));
                }
            }
        }

        Ok(graph)
    }

    fn save(&self, graph: &Graph, writer: &mut dyn Write) -> Result<(), AdapterError> {
        for edge in graph.edges() {
            writeln!(
                writer,
                "{}\t{}",
                writable_name(graph, edge.back)?,
                writable_name(graph, edge.front)?
            )?;
        }

        for id in graph.vertex_ids() {
            if graph.incident_edges(id).is_empty() {
                writeln!(writer, "{}", writable_name(graph, id)?)?;
            }
        }

        Ok(())
    }
}

fn writable_name(graph: &Graph, id: VertexId) -> Result<&str, AdapterError> {
    let vertex = graph.vertex(id).ok_or(GraphError::UnknownVertex(id))?;
    if vertex.name.contains(['\t', '\n', '\r']) || vertex.name.trim().is_empty() {
        return Err(AdapterError::Unsupported {
            format: GraphFormat::Simple,
            reason: format!("vertex name {:?} cannot be written", vertex.name),
        });
    }
    Ok(&vertex.name)
}
