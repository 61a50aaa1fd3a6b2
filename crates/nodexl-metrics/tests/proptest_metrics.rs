use std::collections::BTreeSet;

use nodexl_core::{Directedness, Graph, VertexId};
use nodexl_metrics::GraphMetricCalculator;
use nodexl_metrics::metrics::{
    AllPairsShortestPathCalculator, ClusteringCoefficientCalculator, ConnectedComponentCalculator,
    NO_PATH, VertexDegreeCalculator,
};
use proptest::prelude::*;

/// Graphs with vertices `v0..vN` and up to 40 edges, self-loops and
/// duplicates included.
fn arb_graph(directedness: Directedness) -> impl Strategy<Value = Graph> {
    (1_usize..16).prop_flat_map(move |n| {
        proptest::collection::vec((0..n, 0..n), 0..40).prop_map(move |pairs| {
            let mut g = Graph::new(directedness);
            let ids: Vec<_> = (0..n)
                .map(|i| g.get_or_add_vertex(&format!("v{i}")))
                .collect();
            for (a, b) in pairs {
                g.connect(ids[a], ids[b]).expect("both endpoints exist");
            }
            g
        })
    })
}

fn arb_any_graph() -> impl Strategy<Value = Graph> {
    prop_oneof![
        arb_graph(Directedness::Directed),
        arb_graph(Directedness::Undirected),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn undirected_shortest_paths_are_symmetric(g in arb_graph(Directedness::Undirected)) {
        let m = AllPairsShortestPathCalculator
            .calculate_graph_metrics(&g)
            .expect("matrix");
        for i in 0..m.len() {
            prop_assert_eq!(m.distance(i, i), 0);
            for j in 0..m.len() {
                prop_assert_eq!(m.distance(i, j), m.distance(j, i));
            }
        }
    }

    #[test]
    fn shortest_paths_obey_triangle_inequality(g in arb_any_graph()) {
        let m = AllPairsShortestPathCalculator
            .calculate_graph_metrics(&g)
            .expect("matrix");
        let n = m.len();
        for i in 0..n {
            for j in 0..n {
                for k in 0..n {
                    let (ik, kj) = (m.distance(i, k), m.distance(k, j));
                    if ik != NO_PATH && kj != NO_PATH {
                        prop_assert!(
                            u32::from(m.distance(i, j)) <= u32::from(ik) + u32::from(kj),
                            "d({}, {}) > d({}, {}) + d({}, {})", i, j, i, k, k, j
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn degree_sums_match_edge_count(g in arb_any_graph()) {
        let degrees = VertexDegreeCalculator
            .calculate_graph_metrics(&g)
            .expect("degrees");
        let total_in: usize = degrees.values().map(|d| d.in_degree).sum();
        let total_out: usize = degrees.values().map(|d| d.out_degree).sum();
        let total: usize = degrees.values().map(|d| d.degree).sum();

        prop_assert_eq!(total_in, g.edge_count());
        prop_assert_eq!(total_out, g.edge_count());
        prop_assert_eq!(total, 2 * g.edge_count());
    }

    #[test]
    fn components_partition_the_vertices(g in arb_any_graph()) {
        let components = ConnectedComponentCalculator::default()
            .calculate_graph_metrics(&g)
            .expect("components");

        let mut seen: BTreeSet<VertexId> = BTreeSet::new();
        for component in &components {
            prop_assert!(!component.is_empty());
            for &v in component {
                prop_assert!(seen.insert(v), "vertex {} in two components", v);
            }
        }
        prop_assert_eq!(seen.len(), g.vertex_count());

        for pair in components.windows(2) {
            prop_assert!(pair[0].len() >= pair[1].len());
        }

        // No edge crosses a component boundary.
        for edge in g.edges() {
            let holder = components.iter().position(|c| c.contains(&edge.back));
            prop_assert_eq!(holder, components.iter().position(|c| c.contains(&edge.front)));
        }
    }

    #[test]
    fn clustering_is_a_fraction(g in arb_any_graph()) {
        let scores = ClusteringCoefficientCalculator
            .calculate_graph_metrics(&g)
            .expect("clustering");
        for c in scores.values() {
            prop_assert!((0.0..=1.0).contains(c), "coefficient {}", c);
        }
    }
}
