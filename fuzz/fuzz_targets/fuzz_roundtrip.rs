#![no_main]
use libfuzzer_sys::fuzz_target;
use zenqoi::*;

fuzz_target!(|data: &[u8]| {
    let limits = Limits {
        max_pixels: Some(1 << 22),
        ..Default::default()
    };
    // If we can decode it, re-encoding and decoding again must produce identical pixels
    let Ok(decoded) = DecodeRequest::new(data)
        .with_limits(&limits)
        .with_strictness(Strictness::Permissive)
        .decode(enough::Unstoppable)
    else {
        return;
    };

    let reencoded = EncodeRequest::new()
        .with_colorspace(decoded.colorspace)
        .encode(
            decoded.pixels(),
            decoded.width,
            decoded.height,
            PixelLayout::Rgba8,
            enough::Unstoppable,
        )
        .expect("decoded pixels must re-encode");
    let Ok(decoded2) = decode(&reencoded, enough::Unstoppable) else {
        panic!("re-encoded data failed to decode");
    };

    assert_eq!(decoded.pixels(), decoded2.pixels(), "roundtrip pixel mismatch");
    assert_eq!(decoded.width, decoded2.width);
    assert_eq!(decoded.height, decoded2.height);
    assert_eq!(decoded.colorspace, decoded2.colorspace);

    // The analysis walk must agree with the decoder on what the file holds
    let analysis = analyze(&reencoded, enough::Unstoppable).unwrap();
    assert_eq!(analysis.file_len(), reencoded.len() as u64);
});
