//! Known-topology regression tests across every calculator.
//!
//! Each test builds a small graph whose metrics can be worked out by hand and
//! checks the calculators against them.

use nodexl_core::adapters::{GraphAdapter, SimpleGraphAdapter};
use nodexl_core::{Directedness, Graph, VertexId};
use nodexl_metrics::metrics::{
    BetweennessCentralityCalculator, ClosenessCentralityCalculator,
    ClusteringCoefficientCalculator, ConnectedComponentCalculator, EigenvectorCentralityCalculator,
    OverallMetricCalculator, PageRankCalculator, VertexDegreeCalculator, VertexMetrics,
};
use nodexl_metrics::snap::InProcessPageRank;
use nodexl_metrics::{CalculationContext, CancellationToken, GraphMetricCalculator};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn load(directedness: Directedness, text: &str) -> Graph {
    SimpleGraphAdapter::new(directedness)
        .load_str(text)
        .expect("valid edge list")
}

fn id(graph: &Graph, name: &str) -> VertexId {
    graph.vertex_by_name(name).expect("vertex exists")
}

fn value(graph: &Graph, metrics: &VertexMetrics, name: &str) -> f64 {
    metrics[&id(graph, name)]
}

fn star() -> Graph {
    load(
        Directedness::Undirected,
        "hub\ta\nhub\tb\nhub\tc\nhub\td\nhub\te\n",
    )
}

// ---------------------------------------------------------------------------
// Centralities
// ---------------------------------------------------------------------------

#[test]
fn star_betweenness_centre_one_leaves_zero() {
    let g = star();
    let scores = BetweennessCentralityCalculator
        .calculate_graph_metrics(&g)
        .expect("betweenness");

    assert!((value(&g, &scores, "hub") - 1.0).abs() < 1e-10);
    for leaf in ["a", "b", "c", "d", "e"] {
        assert!(value(&g, &scores, leaf).abs() < 1e-10, "leaf {leaf}");
    }
}

#[test]
fn star_closeness() {
    let g = star();
    let scores = ClosenessCentralityCalculator
        .calculate_graph_metrics(&g)
        .expect("closeness");

    // Hub reaches all five leaves in one hop; a leaf reaches the hub in one
    // and four leaves in two: 9 / 5.
    assert!((value(&g, &scores, "hub") - 1.0).abs() < 1e-10);
    assert!((value(&g, &scores, "a") - 9.0 / 5.0).abs() < 1e-10);
}

#[test]
fn isolated_vertex_closeness_is_zero() {
    let g = load(Directedness::Undirected, "a\tb\nalone\n");
    let scores = ClosenessCentralityCalculator
        .calculate_graph_metrics(&g)
        .expect("closeness");
    assert!(value(&g, &scores, "alone").abs() < 1e-10);
}

#[test]
fn complete_graph_clustering_is_one() {
    let g = load(
        Directedness::Undirected,
        "a\tb\na\tc\na\td\nb\tc\nb\td\nc\td\n",
    );
    let scores = ClusteringCoefficientCalculator
        .calculate_graph_metrics(&g)
        .expect("clustering");
    for (v, c) in &scores {
        assert!((c - 1.0).abs() < 1e-10, "vertex {v}: {c}");
    }
}

#[test]
fn eigenvector_path_middle_outscores_ends() {
    // a - b - c - d - e with a chord c - e to break bipartiteness.
    let g = load(
        Directedness::Undirected,
        "a\tb\nb\tc\nc\td\nd\te\nc\te\n",
    );
    let result = EigenvectorCentralityCalculator
        .calculate_graph_metrics(&g)
        .expect("eigenvector");
    assert!(value(&g, &result.scores, "c") > value(&g, &result.scores, "a"));
}

#[test]
fn pagerank_through_in_process_backend() {
    let g = load(Directedness::Directed, "a\tc\nb\tc\nc\ta\n");
    let ranks = PageRankCalculator::new(InProcessPageRank::default())
        .calculate_graph_metrics(&g)
        .expect("page rank");

    let total: f64 = ranks.values().sum();
    assert!((total - 1.0).abs() < 1e-6);
    assert!(value(&g, &ranks, "c") > value(&g, &ranks, "b"));
}

// ---------------------------------------------------------------------------
// Structure
// ---------------------------------------------------------------------------

#[test]
fn two_disjoint_triangles_are_two_components_of_three() {
    let g = load(
        Directedness::Undirected,
        "a\tb\nb\tc\nc\ta\nx\ty\ny\tz\nz\tx\n",
    );
    let components = ConnectedComponentCalculator::default()
        .calculate_graph_metrics(&g)
        .expect("components");

    assert_eq!(components.len(), 2);
    for component in &components {
        assert_eq!(component.len(), 3);
    }
}

#[test]
fn self_loop_vertex_degrees() {
    let g = load(Directedness::Directed, "v\tv\n");
    let degrees = VertexDegreeCalculator
        .calculate_graph_metrics(&g)
        .expect("degrees");
    let d = degrees[&id(&g, "v")];
    assert_eq!((d.in_degree, d.out_degree, d.degree), (1, 1, 2));
}

#[test]
fn density_undefined_for_tiny_graphs() {
    for text in ["", "solo\n"] {
        let g = load(Directedness::Undirected, text);
        let overall = OverallMetricCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("overall");
        assert_eq!(overall.graph_density, None, "graph {text:?}");
    }
}

#[test]
fn overall_metrics_for_star() {
    let overall = OverallMetricCalculator::with_geodesics(true)
        .calculate_graph_metrics(&star())
        .expect("overall");

    assert_eq!(overall.vertices, 6);
    assert_eq!(overall.total_edges, 5);
    assert_eq!(overall.unique_edges, 5);
    assert_eq!(overall.connected_components, 1);
    assert_eq!(overall.maximum_geodesic_distance, Some(2));
    // 5 / 15 distinct pairs are joined.
    let density = overall.graph_density.expect("density");
    assert!((density - 1.0 / 3.0).abs() < 1e-10);
}

// ---------------------------------------------------------------------------
// Cancellation
// ---------------------------------------------------------------------------

#[test]
fn every_calculator_honours_cancellation() {
    let g = star();
    let token = CancellationToken::new();
    token.cancel();
    let ctx = CalculationContext::with_token(token);

    assert!(
        BetweennessCentralityCalculator
            .try_calculate_graph_metrics(&g, &ctx)
            .expect("no error")
            .is_cancelled()
    );
    assert!(
        ClosenessCentralityCalculator
            .try_calculate_graph_metrics(&g, &ctx)
            .expect("no error")
            .is_cancelled()
    );
    assert!(
        ClusteringCoefficientCalculator
            .try_calculate_graph_metrics(&g, &ctx)
            .expect("no error")
            .is_cancelled()
    );
    assert!(
        ConnectedComponentCalculator::default()
            .try_calculate_graph_metrics(&g, &ctx)
            .expect("no error")
            .is_cancelled()
    );
    assert!(
        EigenvectorCentralityCalculator
            .try_calculate_graph_metrics(&g, &ctx)
            .expect("no error")
            .is_cancelled()
    );
    assert!(
        VertexDegreeCalculator
            .try_calculate_graph_metrics(&g, &ctx)
            .expect("no error")
            .is_cancelled()
    );
    assert!(
        OverallMetricCalculator::with_geodesics(true)
            .try_calculate_graph_metrics(&g, &ctx)
            .expect("no error")
            .is_cancelled()
    );
    assert!(
        PageRankCalculator::new(InProcessPageRank::default())
            .try_calculate_graph_metrics(&g, &ctx)
            .expect("no error")
            .is_cancelled()
    );
}
