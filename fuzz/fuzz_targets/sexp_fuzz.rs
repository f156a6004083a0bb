#![no_main]

use keyprotect::{build_shadow, classify, read_shadow_info};
use libfuzzer_sys::fuzz_target;

// Exercises the canonical s-expression reader through every public entry
// point that walks arbitrary, untrusted bytes: classify() only parses the
// outer header, read_shadow_info() walks a full sibling-list scan, and
// build_shadow() additionally splices two independently-arbitrary buffers
// together. None of these should ever panic, allocate unboundedly, or
// read out of bounds, regardless of what garbage the fuzzer produces.
fuzz_target!(|data: &[u8]| {
    let _ = classify(data);
    let _ = read_shadow_info(data);

    if data.len() >= 2 {
        let split = data.len() / 2;
        let _ = build_shadow(&data[..split], &data[split..]);
    }
});
