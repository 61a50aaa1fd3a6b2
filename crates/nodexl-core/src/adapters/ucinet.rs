//! UCINET full-matrix DL files.
//!
//! ```text
//! DL N=3
//! FORMAT = FULLMATRIX
//! LABELS EMBEDDED
//! DATA:
//! A B C
//! A 0 1 0
//! B 1 0 1
//! C 0 1 0
//! ```
//!
//! Only the full-matrix layout is supported. Without `LABELS EMBEDDED` the
//! data section is `n` rows of `n` numbers and vertices are named `1..=n`.
//! Every non-zero cell becomes an edge from the row vertex to the column
//! vertex; a weight other than 1 is kept on the edge.

use std::io::{BufRead, Write};

use tracing::debug;

use super::{AdapterError, GraphAdapter, GraphFormat, numbered_lines};
use crate::graph::{Directedness, Edge, Graph, GraphError};

/// Reads and writes UCINET DL full matrices.
#[derive(Debug, Clone, Copy, Default)]
pub struct UcinetGraphAdapter {
    directedness: Directedness,
}

impl UcinetGraphAdapter {
    /// Adapter that loads graphs with the given directedness.
    ///
    /// `Undirected` requires a symmetric matrix and reads only its upper
    /// triangle. `Mixed` is treated as `Directed`.
    #[must_use]
    pub const fn new(directedness: Directedness) -> Self {
        Self { directedness }
    }
}

#[derive(Debug, Default)]
struct Header {
    n: Option<usize>,
    labels_embedded: bool,
}

/// Parse the accumulated header text (everything before `DATA:`).
fn parse_header(text: &str, line_no: usize) -> Result<Header, AdapterError> {
    let spaced = text.replace('=', " = ").replace(',', " ");
    let tokens: Vec<String> = spaced
        .split_whitespace()
        .map(str::to_ascii_uppercase)
        .collect();

    let mut header = Header::default();
    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i].as_str();
        let value = if tokens.get(i + 1).map(String::as_str) == Some("=") {
            tokens.get(i + 2).map(String::as_str)
        } else {
            None
        };
        match (token, value) {
            ("DL", _) => i += 1,
            ("N", Some(v)) => {
                let n = v.parse::<usize>().map_err(|_| {
                    AdapterError::format(line_no, "N must be a non-negative integer", text)
                })?;
                header.n = Some(n);
                i += 3;
            }
            ("FORMAT", Some(v)) => {
                if v != "FULLMATRIX" {
                    return Err(AdapterError::format(
                        line_no,
                        "only FORMAT = FULLMATRIX is supported",
                        text,
                    ));
                }
                i += 3;
            }
            ("LABELS", _) if tokens.get(i + 1).map(String::as_str) == Some("EMBEDDED") => {
                header.labels_embedded = true;
                i += 2;
            }
            ("DIAGONAL", _) if tokens.get(i + 1).map(String::as_str) == Some("PRESENT") => {
                i += 2;
            }
            _ => {
                return Err(AdapterError::format(
                    line_no,
                    format!("unsupported UCINET header keyword {token}"),
                    text,
                ));
            }
        }
    }
    Ok(header)
}

fn parse_cell(token: &str, line_no: usize, line: &str) -> Result<f64, AdapterError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| AdapterError::format(line_no, "matrix cell is not a number", line))
}

impl GraphAdapter for UcinetGraphAdapter {
    #[allow(clippy::float_cmp, clippy::too_many_lines)]
    fn load(&self, reader: &mut dyn BufRead) -> Result<Graph, AdapterError> {
        let mut header_text = String::new();
        let mut header: Option<Header> = None;
        let mut labels: Vec<String> = Vec::new();
        let mut rows: Vec<Vec<f64>> = Vec::new();
        let mut last_line = 0;

        for entry in numbered_lines(reader) {
            let (line_no, line) = entry?;
            last_line = line_no;
            let trimmed = line.trim();

            let Some(h) = header.as_ref() else {
                let upper = trimmed.to_ascii_uppercase();
                if let Some(pos) = upper.find("DATA:") {
                    header_text.push(' ');
                    header_text.push_str(&trimmed[..pos]);
                    let parsed = parse_header(&header_text, line_no)?;
                    if parsed.n.is_none() {
                        return Err(AdapterError::format(line_no, "header has no N", &header_text));
                    }
                    header = Some(parsed);
                    if !trimmed[pos + 5..].trim().is_empty() {
                        return Err(AdapterError::format(
                            line_no,
                            "matrix data must start on the line after DATA:",
                            &line,
                        ));
                    }
                } else {
                    header_text.push(' ');
                    header_text.push_str(trimmed);
                }
                continue;
            };

            if trimmed.is_empty() {
                continue;
            }
            let n = h.n.unwrap_or(0);
            let tokens: Vec<&str> = trimmed.split_whitespace().collect();

            if h.labels_embedded && labels.is_empty() && n > 0 {
                if tokens.len() != n {
                    return Err(AdapterError::format(
                        line_no,
                        format!("expected {n} column labels"),
                        &line,
                    ));
                }
                labels = tokens.iter().map(|t| (*t).to_string()).collect();
                continue;
            }

            if rows.len() == n {
                return Err(AdapterError::format(line_no, "more rows than N", &line));
            }

            let cells = if h.labels_embedded {
                let Some((label, cells)) = tokens.split_first() else {
                    continue;
                };
                if *label != labels[rows.len()] {
                    return Err(AdapterError::format(
                        line_no,
                        format!("row label does not match column label {}", labels[rows.len()]),
                        &line,
                    ));
                }
                cells
            } else {
                tokens.as_slice()
            };

            if cells.len() != n {
                return Err(AdapterError::format(
                    line_no,
                    format!("expected {n} matrix cells"),
                    &line,
                ));
            }
            let row = cells
                .iter()
                .map(|c| parse_cell(c, line_no, &line))
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let Some(header) = header else {
            return Err(AdapterError::format(last_line, "missing DATA: section", &header_text));
        };
        let n = header.n.unwrap_or(0);
        if rows.len() != n {
            return Err(AdapterError::format(
                last_line,
                format!("expected {n} matrix rows, found {}", rows.len()),
                "",
            ));
        }
        if labels.is_empty() {
            labels = (1..=n).map(|i| i.to_string()).collect();
        }

        let undirected = self.directedness == Directedness::Undirected;
        if undirected {
            for (i, row) in rows.iter().enumerate() {
                for (j, &cell) in row.iter().enumerate().skip(i + 1) {
                    if cell != rows[j][i] {
                        return Err(AdapterError::format(
                            0,
                            format!(
                                "matrix is not symmetric at ({}, {}); load it as directed",
                                labels[i], labels[j]
                            ),
                            "",
                        ));
                    }
                }
            }
        }

        let mut graph = Graph::new(if undirected {
            Directedness::Undirected
        } else {
            Directedness::Directed
        });
        let ids = labels
            .iter()
            .map(|l| graph.add_vertex(l.clone()))
            .collect::<Result<Vec<_>, GraphError>>()?;

        for (i, row) in rows.iter().enumerate() {
            let first = if undirected { i } else { 0 };
            for (j, &cell) in row.iter().enumerate().skip(first) {
                if cell == 0.0 {
                    continue;
                }
                let mut edge = Edge::new(!undirected);
                if cell != 1.0 {
                    edge.weight = Some(cell);
                }
                graph.add_edge(ids[i], ids[j], edge)?;
            }
        }

        debug!(n, edges = graph.edge_count(), "ucinet matrix loaded");
        Ok(graph)
    }

    fn save(&self, graph: &Graph, writer: &mut dyn Write) -> Result<(), AdapterError> {
        if graph.directedness() == Directedness::Mixed {
            return Err(AdapterError::Unsupported {
                format: GraphFormat::Ucinet,
                reason: "a full matrix cannot mix directed and undirected edges".to_string(),
            });
        }

        let n = graph.vertex_count();
        let positions = graph.vertex_positions();
        let mut matrix = vec![vec![0.0_f64; n]; n];
        for edge in graph.edges() {
            let i = positions[&edge.back];
            let j = positions[&edge.front];
            let w = edge.data.weight.unwrap_or(1.0);
            matrix[i][j] += w;
            if !edge.is_directed() && i != j {
                matrix[j][i] += w;
            }
        }

        let names: Vec<&str> = graph.vertices().map(|(_, v)| v.name.as_str()).collect();
        if let Some(bad) = names
            .iter()
            .find(|name| name.is_empty() || name.contains(char::is_whitespace))
        {
            return Err(AdapterError::Unsupported {
                format: GraphFormat::Ucinet,
                reason: format!("embedded label {bad:?} is empty or contains whitespace"),
            });
        }

        writeln!(writer, "DL N={n}")?;
        writeln!(writer, "FORMAT = FULLMATRIX")?;
        writeln!(writer, "LABELS EMBEDDED")?;
        writeln!(writer, "DATA:")?;
        writeln!(writer, "{}", names.join(" "))?;
        for (name, row) in names.iter().zip(&matrix) {
            write!(writer, "{name}")?;
            for cell in row {
                write!(writer, " {cell}")?;
            }
            writeln!(writer)?;
        }
        Ok(())
    }
}
