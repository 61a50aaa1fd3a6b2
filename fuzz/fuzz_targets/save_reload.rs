#![no_main]

use libfuzzer_sys::fuzz_target;
use nodexl_core::Directedness;
use nodexl_core::adapters::{GraphAdapter, GraphFormat};

// Anything a format loads, it must be able to save and load again with the
// same vertex and edge counts.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let format = GraphFormat::ALL[usize::from(selector) % GraphFormat::ALL.len()];
    let adapter = format.adapter(Directedness::Undirected);
    let Ok(graph) = adapter.load_str(text) else {
        return;
    };
    let Ok(saved) = adapter.save_to_string(&graph) else {
        return;
    };
    let reloaded = format
        .adapter(graph.directedness())
        .load_str(&saved)
        .expect("saved graph must reload");
    assert_eq!(reloaded.vertex_count(), graph.vertex_count());
    assert_eq!(reloaded.edge_count(), graph.edge_count());
});
