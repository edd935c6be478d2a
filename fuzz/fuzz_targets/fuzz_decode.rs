#![no_main]
use libfuzzer_sys::fuzz_target;
use zenqoi::*;

fuzz_target!(|data: &[u8]| {
    // Bound allocations so huge headers fail fast instead of OOMing
    let limits = Limits {
        max_pixels: Some(1 << 22),
        ..Default::default()
    };

    // Every strictness level must never panic
    for strictness in [Strictness::Strict, Strictness::Standard, Strictness::Permissive] {
        let _ = DecodeRequest::new(data)
            .with_limits(&limits)
            .with_strictness(strictness)
            .decode(enough::Unstoppable);
    }
    let _ = analyze_with_limits(data, Some(&limits), enough::Unstoppable);
    let _ = probe(data);
});
