#!/usr/bin/env -S cargo +nightly -Zscript
//! Generate seed corpus files for fuzzing.
//! Run: cargo +nightly -Zscript fuzz/generate_seeds.rs

fn header(width: u32, height: u32, channels: u8, colorspace: u8) -> Vec<u8> {
    let mut out = b"qoif".to_vec();
    out.extend_from_slice(&width.to_be_bytes());
    out.extend_from_slice(&height.to_be_bytes());
    out.push(channels);
    out.push(colorspace);
    out
}

const END: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

fn main() {
    use std::fs;
    let dir = "fuzz/corpus/fuzz_decode";
    fs::create_dir_all(dir).unwrap();

    // 2x2: RGB literal, DIFF, LUMA, INDEX
    let mut every_op = header(2, 2, 4, 0);
    every_op.extend_from_slice(&[0xFE, 0x80, 0x40, 0x20]);
    every_op.push(0x40 | (3 << 4) | (2 << 2) | 1);
    every_op.extend_from_slice(&[0x80 | 40, 0x97]);
    every_op.push(0x00);
    every_op.extend_from_slice(&END);
    fs::write(format!("{dir}/every_op_2x2.qoi"), every_op).unwrap();

    // 10x10 opaque black: two runs
    let mut runs = header(10, 10, 3, 0);
    runs.extend_from_slice(&[0xC0 | 61, 0xC0 | 37]);
    runs.extend_from_slice(&END);
    fs::write(format!("{dir}/runs_10x10.qoi"), runs).unwrap();

    // RGBA literal, linear colorspace
    let mut rgba = header(1, 1, 4, 1);
    rgba.extend_from_slice(&[0xFF, 1, 2, 3, 4]);
    rgba.extend_from_slice(&END);
    fs::write(format!("{dir}/rgba_linear_1x1.qoi"), rgba).unwrap();

    // 0x0 image
    let mut empty_image = header(0, 0, 4, 0);
    empty_image.extend_from_slice(&END);
    fs::write(format!("{dir}/empty_0x0.qoi"), empty_image).unwrap();

    // Truncated/malformed seeds for edge coverage
    fs::write(format!("{dir}/empty.bin"), b"").unwrap();
    fs::write(format!("{dir}/just_magic.bin"), b"qoif").unwrap();
    fs::write(format!("{dir}/channels_zero.bin"), header(1, 1, 0, 0)).unwrap();
    fs::write(format!("{dir}/huge_dims.bin"), header(u32::MAX, u32::MAX, 4, 0)).unwrap();
    let mut overshoot = header(1, 1, 4, 0);
    overshoot.push(0xFD);
    fs::write(format!("{dir}/run_overshoot.bin"), overshoot).unwrap();

    println!("Generated seed corpus in {dir}/");
}
