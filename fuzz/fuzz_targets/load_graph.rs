#![no_main]

use libfuzzer_sys::fuzz_target;
use nodexl_core::Directedness;
use nodexl_core::adapters::{GraphAdapter, GraphFormat};

// First byte picks the format, the rest is the file. Loading must fail
// cleanly, never panic.
fuzz_target!(|data: &[u8]| {
    let Some((&selector, rest)) = data.split_first() else {
        return;
    };
    let Ok(text) = std::str::from_utf8(rest) else {
        return;
    };
    let format = GraphFormat::ALL[usize::from(selector) % GraphFormat::ALL.len()];
    let _ = format.adapter(Directedness::Directed).load_str(text);
});
