use enough::Unstoppable;
use zenqoi::*;

#[test]
fn qoi_roundtrip_rgba8() {
    let w = 2;
    let h = 2;
    let pixels = vec![
        255, 0, 0, 255, // red
        0, 255, 0, 128, // green semi-transparent
        0, 0, 255, 0, // blue transparent
        128, 128, 128, 255, // gray
    ];

    let encoded = EncodeRequest::new()
        .encode(&pixels, w, h, PixelLayout::Rgba8, Unstoppable)
        .unwrap();

    let decoded = DecodeRequest::new(&encoded).decode(Unstoppable).unwrap();
    assert_eq!(decoded.width, w);
    assert_eq!(decoded.height, h);
    assert_eq!(decoded.channels, Channels::Rgba);
    assert_eq!(decoded.colorspace, ColorSpace::Srgb);
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn qoi_roundtrip_rgb8_gains_opaque_alpha() {
    let w = 4;
    let h = 3;
    let mut pixels = vec![0u8; (w * h * 3) as usize];
    for (i, px) in pixels.chunks_exact_mut(3).enumerate() {
        if i % 2 == 0 {
            px.copy_from_slice(&[255, 0, 128]);
        } else {
            px.copy_from_slice(&[0, 200, 50]);
        }
    }

    let encoded = encode(&pixels, w, h, PixelLayout::Rgb8, Unstoppable).unwrap();
    let decoded = decode(&encoded, Unstoppable).unwrap();
    for (rgba, rgb) in decoded.pixels().chunks_exact(4).zip(pixels.chunks_exact(3)) {
        assert_eq!(&rgba[..3], rgb);
        assert_eq!(rgba[3], 255);
    }
}

#[test]
fn bgra_matches_rgba_output() {
    let rgba = [10u8, 20, 30, 40, 50, 60, 70, 80];
    let bgra = [30u8, 20, 10, 40, 70, 60, 50, 80];
    let a = encode(&rgba, 2, 1, PixelLayout::Rgba8, Unstoppable).unwrap();
    let b = encode(&bgra, 2, 1, PixelLayout::Bgra8, Unstoppable).unwrap();
    assert_eq!(a, b);
}

#[test]
fn premultiplied_input_is_unpremultiplied() {
    // half-transparent white, premultiplied
    let premul = [128u8, 128, 128, 128];
    let encoded = encode(&premul, 1, 1, PixelLayout::Rgba8Premultiplied, Unstoppable).unwrap();
    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &[255, 255, 255, 128]);
}

#[test]
fn linear_flag_passes_through() {
    let encoded = EncodeRequest::new()
        .with_colorspace(ColorSpace::Linear)
        .encode(&[1, 2, 3, 4], 1, 1, PixelLayout::Rgba8, Unstoppable)
        .unwrap();
    assert_eq!(probe(&encoded).unwrap().colorspace, ColorSpace::Linear);
    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.colorspace, ColorSpace::Linear);
    // no conversion applied
    assert_eq!(decoded.pixels(), &[1, 2, 3, 4]);
}

#[test]
fn writer_and_reader_paths_agree() {
    let pixels: Vec<u8> = (0..300u32).flat_map(|i| [i as u8, (i / 3) as u8, 7, 255]).collect();
    let in_memory = encode(&pixels, 20, 15, PixelLayout::Rgba8, Unstoppable).unwrap();

    let mut streamed = Vec::new();
    let n = EncodeRequest::new()
        .encode_to_writer(&mut streamed, &pixels, 20, 15, PixelLayout::Rgba8, Unstoppable)
        .unwrap();
    assert_eq!(n, streamed.len());
    assert_eq!(streamed, in_memory);

    let decoded = decode_from_reader(std::io::Cursor::new(&streamed), None, Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn reader_decoder_honors_strictness() {
    let mut encoded = encode(&[9, 8, 7, 255], 1, 1, PixelLayout::Rgba8, Unstoppable).unwrap();
    let last = encoded.len() - 1;
    encoded[last] = 2;

    // the default mode never reads the end marker
    assert!(decode_from_reader(&encoded[..], None, Unstoppable).is_ok());
    assert!(matches!(
        Decoder::new(IoReader(&encoded[..]))
            .with_strictness(Strictness::Strict)
            .decode(None, Unstoppable),
        Err(QoiError::InvalidData(_))
    ));

    encoded[last] = 1;
    encoded[12] = 0;
    assert!(decode_from_reader(&encoded[..], None, Unstoppable).is_err());
    let decoded = Decoder::new(IoReader(&encoded[..]))
        .with_strictness(Strictness::Permissive)
        .decode(None, Unstoppable)
        .unwrap();
    assert_eq!(decoded.channels, Channels::Unspecified);
    assert_eq!(decoded.pixels(), &[9, 8, 7, 255]);
}

#[test]
fn probe_reads_header_only() {
    let encoded = encode(&[0u8; 3 * 5 * 3], 3, 5, PixelLayout::Rgb8, Unstoppable).unwrap();
    let header = probe(&encoded[..HEADER_LEN]).unwrap();
    assert_eq!((header.width, header.height), (3, 5));
    assert_eq!(header.channels, Channels::Rgba);

    assert!(matches!(
        probe(b"qoif\0\0"),
        Err(QoiError::UnexpectedEof)
    ));
    assert!(matches!(
        probe(b"PNG\x0d\0\0\0\x01\0\0\0\x01\x04\x00"),
        Err(QoiError::InvalidHeader(HeaderError::BadMagic { .. }))
    ));
}

#[test]
fn probe_accepts_unspecified_channels() {
    let mut data = encode_header(1, 1).to_vec();
    data[12] = 0;
    assert_eq!(probe(&data).unwrap().channels, Channels::Unspecified);
    assert!(matches!(
        decode_header(&data),
        Err(QoiError::InvalidHeader(HeaderError::BadChannels(0)))
    ));
}

// ── Cross-checks against rapid-qoi ──────────────────────────────────

fn rapid_decode(data: &[u8]) -> Vec<u8> {
    rapid_qoi::Qoi::decode_alloc(data).unwrap().1
}

#[test]
fn rapid_qoi_decodes_our_output() {
    let mut state: u32 = 0x1234_5678;
    let mut pixels = Vec::new();
    for i in 0..(64 * 48) {
        state ^= state << 13;
        state ^= state >> 17;
        state ^= state << 5;
        // mix noise, small deltas and runs so every op shows up
        let px = match i % 16 {
            0..=3 => [state as u8, (state >> 8) as u8, (state >> 16) as u8, (state >> 24) as u8],
            4..=9 => [i as u8, (i / 2) as u8, 100, 255],
            _ => [40, 40, 40, 255],
        };
        pixels.extend_from_slice(&px);
    }
    let encoded = encode(&pixels, 64, 48, PixelLayout::Rgba8, Unstoppable).unwrap();
    assert_eq!(rapid_decode(&encoded), pixels);
}

#[test]
fn we_decode_rapid_qoi_output() {
    let pixels: Vec<u8> = (0..32 * 32u32)
        .flat_map(|i| {
            let a = if i % 5 == 0 { 64 } else { 255 };
            [(i % 32) as u8 * 8, (i / 32) as u8 * 8, (i % 7) as u8, a]
        })
        .collect();
    let qoi = rapid_qoi::Qoi {
        width: 32,
        height: 32,
        colors: rapid_qoi::Colors::SrgbLinA,
    };
    let encoded = qoi.encode_alloc(&pixels).unwrap();
    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.pixels(), &pixels[..]);
}

#[test]
fn we_decode_rapid_qoi_three_channel_output() {
    let rgb: Vec<u8> = (0..16 * 8u32)
        .flat_map(|i| [(i * 3) as u8, (i * 5) as u8, (i * 7) as u8])
        .collect();
    let qoi = rapid_qoi::Qoi {
        width: 16,
        height: 8,
        colors: rapid_qoi::Colors::Srgb,
    };
    let encoded = qoi.encode_alloc(&rgb).unwrap();
    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.channels, Channels::Rgb);
    for (rgba, px) in decoded.pixels().chunks_exact(4).zip(rgb.chunks_exact(3)) {
        assert_eq!(&rgba[..3], px);
        assert_eq!(rgba[3], 255);
    }
}

#[cfg(feature = "imgref")]
#[test]
fn imgvec_roundtrip() {
    use rgb::RGBA8;

    let buf: Vec<RGBA8> = (0..12u8).map(|i| RGBA8::new(i, i * 2, i * 3, 255)).collect();
    let img = imgref::ImgVec::new(buf.clone(), 4, 3);
    let encoded = EncodeRequest::new()
        .encode_imgref(img.as_ref(), Unstoppable)
        .unwrap();
    let decoded = decode(&encoded, Unstoppable).unwrap();
    assert_eq!(decoded.to_imgvec().buf(), &buf);
}
