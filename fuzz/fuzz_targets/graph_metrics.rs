#![no_main]

use libfuzzer_sys::fuzz_target;
use nodexl_core::Directedness;
use nodexl_core::adapters::{GraphAdapter, SimpleGraphAdapter};
use nodexl_metrics::GraphMetricCalculator;
use nodexl_metrics::metrics::{
    BetweennessCentralityCalculator, ClusteringCoefficientCalculator,
    EigenvectorCentralityCalculator, OverallMetricCalculator,
};

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };
    let Ok(graph) = SimpleGraphAdapter::new(Directedness::Directed).load_str(text) else {
        return;
    };
    if graph.vertex_count() > 64 {
        return;
    }

    let betweenness = BetweennessCentralityCalculator
        .calculate_graph_metrics(&graph)
        .expect("betweenness");
    assert!(betweenness.values().all(|b| (0.0..=1.0 + 1e-9).contains(b)));

    let clustering = ClusteringCoefficientCalculator
        .calculate_graph_metrics(&graph)
        .expect("clustering");
    assert!(clustering.values().all(|c| (0.0..=1.0).contains(c)));

    let _ = EigenvectorCentralityCalculator.calculate_graph_metrics(&graph);
    let overall = OverallMetricCalculator::with_geodesics(true)
        .calculate_graph_metrics(&graph)
        .expect("overall");
    assert_eq!(overall.vertices, graph.vertex_count());
});
