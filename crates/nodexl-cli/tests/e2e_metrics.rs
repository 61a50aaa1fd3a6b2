//! E2E tests for the metric commands:
//! `nodexl metrics`, `nodexl overall`, `nodexl components`.
//!
//! Covers: JSON shape, configured defaults, component ordering, text output,
//! and structured errors for malformed graph files.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Test harness helpers
// ---------------------------------------------------------------------------

fn nodexl_cmd(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("nodexl"));
    cmd.current_dir(dir);
    cmd.env("NODEXL_LOG", "error");
    cmd.env_remove("NODEXL_OUTPUT");
    cmd.env_remove("NODEXL_SNAP_PATH");
    cmd
}

fn write_graph(dir: &Path, name: &str, contents: &str) {
    std::fs::write(dir.join(name), contents).expect("write graph file");
}

fn run_json(dir: &Path, args: &[&str]) -> Value {
    let output = nodexl_cmd(dir)
        .args(args)
        .arg("--json")
        .output()
        .expect("nodexl should not crash");
    assert!(
        output.status.success(),
        "nodexl {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("valid JSON on stdout")
}

fn row<'a>(report: &'a Value, vertex: &str) -> &'a Value {
    report["vertices"]
        .as_array()
        .expect("vertices array")
        .iter()
        .find(|r| r["vertex"] == vertex)
        .unwrap_or_else(|| panic!("no row for {vertex}"))
}

const STAR: &str = "hub\ta\nhub\tb\nhub\tc\n";
const TWO_TRIANGLES_AND_LONER: &str = "a\tb\nb\tc\nc\ta\nx\ty\ny\tz\nz\tx\nloner\n";

// ---------------------------------------------------------------------------
// nodexl metrics
// ---------------------------------------------------------------------------

#[test]
fn metrics_json_has_a_row_per_vertex() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "star.txt", STAR);

    let report = run_json(
        dir.path(),
        &[
            "metrics",
            "star.txt",
            "--directedness",
            "undirected",
            "-m",
            "betweenness",
            "-m",
            "degree",
        ],
    );

    assert_eq!(
        report["columns"],
        serde_json::json!(["in_degree", "out_degree", "degree", "betweenness"])
    );
    assert_eq!(report["vertices"].as_array().unwrap().len(), 4);

    let hub = row(&report, "hub");
    assert_eq!(hub["degree"].as_f64(), Some(3.0));
    assert!((hub["betweenness"].as_f64().unwrap() - 1.0).abs() < 1e-10);

    let leaf = row(&report, "a");
    assert_eq!(leaf["degree"].as_f64(), Some(1.0));
    assert!(leaf["betweenness"].as_f64().unwrap().abs() < 1e-10);
}

#[test]
fn metrics_defaults_come_from_config_file() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "star.txt", STAR);
    std::fs::write(
        dir.path().join("nodexl.toml"),
        "[metrics]\ndefault_metrics = [\"clustering\"]\n",
    )
    .unwrap();

    let report = run_json(dir.path(), &["metrics", "star.txt"]);
    assert_eq!(report["columns"], serde_json::json!(["clustering"]));
}

#[test]
fn explicit_config_flag_is_used() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "star.txt", STAR);
    std::fs::write(
        dir.path().join("custom.toml"),
        "[metrics]\ndefault_metrics = [\"closeness\", \"pagerank\"]\n",
    )
    .unwrap();

    let report = run_json(
        dir.path(),
        &["metrics", "star.txt", "--config", "custom.toml"],
    );
    assert_eq!(
        report["columns"],
        serde_json::json!(["closeness", "pagerank"])
    );

    let total: f64 = report["vertices"]
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["pagerank"].as_f64().unwrap())
        .sum();
    assert!((total - 1.0).abs() < 1e-6, "pagerank sums to {total}");
}

#[test]
fn metrics_text_output_is_tab_separated() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "star.txt", STAR);

    nodexl_cmd(dir.path())
        .args(["metrics", "star.txt", "-m", "clustering", "--output", "text"])
        .assert()
        .success()
        .stdout(predicate::str::starts_with("vertex\tclustering\n"))
        .stdout(predicate::str::contains("hub\t0.0000\n"));
}

#[test]
fn components_metric_numbers_largest_first() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "g.txt", TWO_TRIANGLES_AND_LONER);

    let report = run_json(dir.path(), &["metrics", "g.txt", "-m", "components"]);
    assert_eq!(row(&report, "a")["component"].as_f64(), Some(1.0));
    assert_eq!(row(&report, "x")["component"].as_f64(), Some(2.0));
    assert_eq!(row(&report, "loner")["component"].as_f64(), Some(3.0));
}

#[test]
fn unknown_configured_metric_fails() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "star.txt", STAR);
    std::fs::write(
        dir.path().join("nodexl.toml"),
        "[metrics]\ndefault_metrics = [\"katz\"]\n",
    )
    .unwrap();

    nodexl_cmd(dir.path())
        .args(["metrics", "star.txt"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("katz"));
}

#[test]
fn executable_backend_without_path_fails_with_snap_code() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "star.txt", STAR);
    std::fs::write(
        dir.path().join("nodexl.toml"),
        "[snap]\nbackend = \"executable\"\n",
    )
    .unwrap();

    nodexl_cmd(dir.path())
        .args(["metrics", "star.txt", "-m", "pagerank"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E4001"));
}

// ---------------------------------------------------------------------------
// nodexl overall
// ---------------------------------------------------------------------------

#[test]
fn overall_json_for_triangle() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tri.txt", "a\tb\nb\tc\nc\ta\n");

    let report = run_json(
        dir.path(),
        &[
            "overall",
            "tri.txt",
            "--directedness",
            "undirected",
            "--geodesics",
        ],
    );
    assert_eq!(report["vertices"], 3);
    assert_eq!(report["total_edges"], 3);
    assert_eq!(report["self_loops"], 0);
    assert_eq!(report["connected_components"], 1);
    assert_eq!(report["maximum_geodesic_distance"], 1);
    assert!((report["graph_density"].as_f64().unwrap() - 1.0).abs() < 1e-10);
}

#[test]
fn overall_skips_geodesics_unless_asked() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "tri.txt", "a\tb\nb\tc\nc\ta\n");

    let report = run_json(dir.path(), &["overall", "tri.txt"]);
    assert!(report["maximum_geodesic_distance"].is_null());
    assert!(report["average_geodesic_distance"].is_null());
    assert_eq!(report["connected_components"], 1);
    assert!(report["graph_density"].as_f64().is_some());
}

#[test]
fn overall_density_is_null_for_single_vertex() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "one.txt", "solo\n");

    let report = run_json(dir.path(), &["overall", "one.txt"]);
    assert_eq!(report["vertices"], 1);
    assert!(report["graph_density"].is_null());
}

#[test]
fn overall_reads_pajek() {
    let dir = TempDir::new().unwrap();
    write_graph(
        dir.path(),
        "g.net",
        "*Vertices 3\n1 \"A\"\n2 \"B\"\n3 \"C\"\n*Arcs\n1 2\n2 3\n",
    );

    let report = run_json(dir.path(), &["overall", "g.net", "--geodesics"]);
    assert_eq!(report["directedness"], "directed");
    assert_eq!(report["total_edges"], 2);
    assert_eq!(report["maximum_geodesic_distance"], 2);
}

// ---------------------------------------------------------------------------
// nodexl components
// ---------------------------------------------------------------------------

#[test]
fn components_listed_largest_first() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "g.txt", TWO_TRIANGLES_AND_LONER);

    let report = run_json(dir.path(), &["components", "g.txt"]);
    let components = report["components"].as_array().unwrap();
    assert_eq!(components.len(), 3);
    assert_eq!(components[0]["vertex_count"], 3);
    assert_eq!(components[0]["edge_count"], 3);
    assert_eq!(components[0]["vertices"], serde_json::json!(["a", "b", "c"]));
    assert_eq!(components[2]["vertex_count"], 1);
    assert_eq!(components[2]["vertices"], serde_json::json!(["loner"]));
}

#[test]
fn components_ascending_flag_reverses_order() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "g.txt", TWO_TRIANGLES_AND_LONER);

    let report = run_json(dir.path(), &["components", "g.txt", "--ascending"]);
    assert_eq!(report["order"], "ascending");
    let components = report["components"].as_array().unwrap();
    assert_eq!(components[0]["vertices"], serde_json::json!(["loner"]));
    assert_eq!(components[1]["vertices"], serde_json::json!(["a", "b", "c"]));
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[test]
fn malformed_file_reports_code_and_line() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "bad.txt", "a\tb\na\tb\tc\n");

    nodexl_cmd(dir.path())
        .args(["overall", "bad.txt", "--output", "text"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("error[E2002]"))
        .stderr(predicate::str::contains("line 2"));
}

#[test]
fn malformed_file_json_error_on_stderr() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "bad.txt", "a\tb\tc\n");

    let output = nodexl_cmd(dir.path())
        .args(["metrics", "bad.txt", "--json"])
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    let err: Value = serde_json::from_slice(&output.stderr).expect("JSON error");
    assert_eq!(err["error"]["error_code"], "E2002");
}

#[test]
fn unknown_extension_needs_format_flag() {
    let dir = TempDir::new().unwrap();
    write_graph(dir.path(), "edges.dat", STAR);

    nodexl_cmd(dir.path())
        .args(["overall", "edges.dat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));

    nodexl_cmd(dir.path())
        .args(["overall", "edges.dat", "--format", "simple"])
        .assert()
        .success();
}
