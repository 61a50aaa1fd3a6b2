//! How command reports reach the terminal.
//!
//! Each command builds one serializable report (a metric table, the overall
//! metrics, a component list) and hands it to [`render_mode`] with a text and
//! a pretty renderer. JSON needs no renderer: the report's `Serialize` impl is
//! the schema.
//!
//! The mode comes from, in order: `--output`, `--json`, `NODEXL_OUTPUT`
//! (`pretty`, `text` or `json`, any case), and finally whether stdout is a
//! terminal.

use std::io::{self, IsTerminal, Write};

use clap::ValueEnum;
use nodexl_core::adapters::AdapterError;
use nodexl_core::config::ConfigError;
use nodexl_core::error::ErrorCode;
use nodexl_metrics::MetricError;
use nodexl_metrics::snap::SnapError;
use serde::Serialize;

const RULE_WIDTH: usize = 72;

/// Horizontal rule under a table header.
pub fn pretty_rule(w: &mut dyn Write) -> io::Result<()> {
    writeln!(w, "{:-<width$}", "", width = RULE_WIDTH)
}

/// A titled block of `label: value` lines with the values in one column.
pub fn pretty_pairs(
    w: &mut dyn Write,
    title: &str,
    pairs: &[(&str, String)],
) -> io::Result<()> {
    writeln!(w, "{title}")?;
    pretty_rule(w)?;
    let width = pairs.iter().map(|(label, _)| label.len() + 1).max().unwrap_or(0);
    for (label, value) in pairs {
        writeln!(w, "{:<width$} {value}", format!("{label}:"))?;
    }
    Ok(())
}

/// Report formats accepted by `--output` and `NODEXL_OUTPUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputMode {
    /// Aligned columns and headings.
    Pretty,
    /// Tab-separated rows, one per vertex or metric.
    Text,
    /// The report serialized as pretty-printed JSON.
    Json,
}

impl OutputMode {
    /// Parse a `NODEXL_OUTPUT` value. Unknown values yield `None`.
    fn from_env_value(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value.trim(), true).ok()
    }
}

fn pick_output_mode(
    output_flag: Option<OutputMode>,
    json_flag: bool,
    output_env: Option<&str>,
    stdout_is_tty: bool,
) -> OutputMode {
    output_flag
        .or_else(|| json_flag.then_some(OutputMode::Json))
        .or_else(|| output_env.and_then(OutputMode::from_env_value))
        .unwrap_or(if stdout_is_tty {
            OutputMode::Pretty
        } else {
            OutputMode::Text
        })
}

/// Output mode for this invocation.
pub fn resolve_output_mode(output_flag: Option<OutputMode>, json_flag: bool) -> OutputMode {
    let env = std::env::var("NODEXL_OUTPUT").ok();
    pick_output_mode(
        output_flag,
        json_flag,
        env.as_deref(),
        io::stdout().is_terminal(),
    )
}

/// Write `report` to stdout in `mode`.
pub fn render_mode<T: Serialize>(
    mode: OutputMode,
    report: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    let stdout = io::stdout();
    render_to(&mut stdout.lock(), mode, report, text_fn, pretty_fn)
}

fn render_to<T: Serialize>(
    w: &mut dyn Write,
    mode: OutputMode,
    report: &T,
    text_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
    pretty_fn: impl FnOnce(&T, &mut dyn Write) -> io::Result<()>,
) -> anyhow::Result<()> {
    match mode {
        OutputMode::Json => {
            serde_json::to_writer_pretty(&mut *w, report)?;
            writeln!(w)?;
        }
        OutputMode::Text => text_fn(report, w)?,
        OutputMode::Pretty => pretty_fn(report, w)?,
    }
    w.flush()?;
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// A structured error with optional suggestion and error code.
#[derive(Debug, Serialize)]
pub struct CliError {
    /// Human-readable error message, including its causes.
    pub message: String,
    /// Optional suggestion for how to fix the error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Machine-readable error code (e.g. "E2002").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_code: Option<String>,
}

/// First library error code found in the chain of `err`.
fn error_code(err: &anyhow::Error) -> Option<ErrorCode> {
    err.chain().find_map(|cause| {
        if let Some(e) = cause.downcast_ref::<AdapterError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<MetricError>() {
            Some(e.code())
        } else if let Some(e) = cause.downcast_ref::<SnapError>() {
            Some(e.code())
        } else if cause.downcast_ref::<ConfigError>().is_some() {
            Some(ErrorCode::ConfigParseError)
        } else {
            None
        }
    })
}

impl From<&anyhow::Error> for CliError {
    fn from(err: &anyhow::Error) -> Self {
        let code = error_code(err);
        Self {
            message: format!("{err:#}"),
            suggestion: code.and_then(ErrorCode::hint).map(str::to_string),
            error_code: code.map(|c| c.code().to_string()),
        }
    }
}

/// Render an error to stderr in the requested format.
pub fn render_error(mode: OutputMode, error: &CliError) -> anyhow::Result<()> {
    let stderr = io::stderr();
    let mut out = stderr.lock();
    match mode {
        OutputMode::Json => {
            let wrapper = serde_json::json!({
                "error": error,
            });
            serde_json::to_writer_pretty(&mut out, &wrapper)?;
            writeln!(out)?;
        }
        OutputMode::Pretty | OutputMode::Text => {
            match &error.error_code {
                Some(code) => writeln!(out, "error[{code}]: {}", error.message)?,
                None => writeln!(out, "error: {}", error.message)?,
            }
            if let Some(ref suggestion) = error.suggestion {
                writeln!(out, "  suggestion: {suggestion}")?;
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use anyhow::Context;

    use super::*;

    #[test]
    fn output_flag_wins_over_json_and_env() {
        let mode = pick_output_mode(Some(OutputMode::Text), true, Some("pretty"), true);
        assert_eq!(mode, OutputMode::Text);
    }

    #[test]
    fn json_flag_wins_over_env() {
        let mode = pick_output_mode(None, true, Some("text"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn env_is_case_insensitive() {
        let mode = pick_output_mode(None, false, Some("JSON"), true);
        assert_eq!(mode, OutputMode::Json);
    }

    #[test]
    fn unknown_env_falls_back_to_tty_detection() {
        assert_eq!(
            pick_output_mode(None, false, Some("yaml"), true),
            OutputMode::Pretty
        );
        assert_eq!(
            pick_output_mode(None, false, None, false),
            OutputMode::Text
        );
    }

    #[test]
    fn env_value_is_trimmed() {
        assert_eq!(OutputMode::from_env_value(" text\n"), Some(OutputMode::Text));
        assert_eq!(OutputMode::from_env_value("csv"), None);
    }

    #[derive(Serialize)]
    struct Degree {
        vertex: &'static str,
        degree: u32,
    }

    fn render_degree(mode: OutputMode) -> String {
        let mut buf = Vec::new();
        render_to(
            &mut buf,
            mode,
            &Degree {
                vertex: "hub",
                degree: 3,
            },
            |d, w| writeln!(w, "{}\t{}", d.vertex, d.degree),
            |d, w| {
                pretty_pairs(
                    w,
                    "Degree",
                    &[
                        ("Vertex", d.vertex.to_string()),
                        ("Degree", d.degree.to_string()),
                    ],
                )
            },
        )
        .expect("render");
        String::from_utf8(buf).expect("utf8")
    }

    #[test]
    fn each_mode_uses_its_renderer() {
        assert_eq!(render_degree(OutputMode::Text), "hub\t3\n");

        let json: serde_json::Value =
            serde_json::from_str(&render_degree(OutputMode::Json)).expect("json");
        assert_eq!(json["degree"], 3);

        let pretty = render_degree(OutputMode::Pretty);
        assert!(pretty.starts_with("Degree\n---"));
        assert!(pretty.contains("Vertex: hub\n"));
        assert!(pretty.contains("Degree: 3\n"));
    }

    #[test]
    fn cli_error_carries_code_and_hint_from_chain() {
        let err = Err::<(), _>(AdapterError::format(4, "bad vertex", "x"))
            .context("failed to load graph.net")
            .expect_err("error");
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code.as_deref(), Some("E2002"));
        assert!(cli.message.starts_with("failed to load graph.net: line 4"));
        assert!(cli.suggestion.is_some());
    }

    #[test]
    fn cli_error_without_library_cause() {
        let err = anyhow::anyhow!("plain failure");
        let cli = CliError::from(&err);
        assert_eq!(cli.error_code, None);
        assert_eq!(cli.message, "plain failure");
    }
}
