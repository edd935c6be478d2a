//! Per-chunk statistics and heat maps for QOI files.
//!
//! [`analyze`] walks the chunk stream with the regular decoder and records
//! which op produced every pixel. The heat map colors each pixel by that op,
//! and the [`Display`](core::fmt::Display) impl prints a fixed-order report.

use alloc::vec;
use alloc::vec::Vec;
use core::fmt;

use enough::Stop;

use crate::chunk::{END_MARKER, OpKind};
use crate::decode::Decoder;
use crate::error::QoiError;
use crate::header::{HEADER_LEN, QoiHeader, Strictness};
use crate::io::SliceReader;
use crate::limits::{Limits, output_bytes};
use crate::log::debug;
use crate::pixel::{Pixel, PixelSink, RGBA_BYTES};

const STOP_INTERVAL: u32 = 4096;

impl OpKind {
    /// Heat map color for pixels produced by this op.
    pub const fn heat_color(self) -> Pixel {
        match self {
            OpKind::Rgb => Pixel::new(255, 0, 0, 255),
            OpKind::Rgba => Pixel::new(255, 0, 255, 255),
            OpKind::Index => Pixel::new(0, 255, 0, 255),
            OpKind::Diff => Pixel::new(255, 255, 0, 255),
            OpKind::Luma => Pixel::new(0, 0, 255, 255),
            OpKind::Run => Pixel::new(0, 255, 255, 255),
        }
    }
}

/// Pixels produced and bytes consumed by one op kind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OpStats {
    /// Chunks of this kind.
    pub chunks: u64,
    pub pixels: u64,
    /// Chunk bytes, tag included.
    pub bytes: u64,
}

/// Result of [`analyze`].
#[derive(Clone, Debug)]
pub struct EncodingAnalysis {
    pub header: QoiHeader,
    stats: [OpStats; 6],
    heat_map: Vec<u8>,
}

impl EncodingAnalysis {
    pub fn stats(&self, kind: OpKind) -> OpStats {
        self.stats[kind.ordinal()]
    }

    /// Heat map as interleaved RGBA, `width * height * 4` bytes.
    pub fn heat_map(&self) -> &[u8] {
        &self.heat_map
    }

    pub fn into_heat_map(self) -> Vec<u8> {
        self.heat_map
    }

    pub fn total_pixels(&self) -> u64 {
        self.stats.iter().map(|s| s.pixels).sum()
    }

    /// Bytes of chunk data, header and end marker excluded.
    pub fn total_chunk_bytes(&self) -> u64 {
        self.stats.iter().map(|s| s.bytes).sum()
    }

    /// Fraction of all pixels produced by `kind`, 0.0 for an empty image.
    pub fn pixel_share(&self, kind: OpKind) -> f64 {
        ratio(self.stats(kind).pixels, self.total_pixels())
    }

    /// Fraction of all chunk bytes spent on `kind`.
    pub fn byte_share(&self, kind: OpKind) -> f64 {
        ratio(self.stats(kind).bytes, self.total_chunk_bytes())
    }

    pub fn pixels_per_byte(&self, kind: OpKind) -> f64 {
        let s = self.stats(kind);
        ratio(s.pixels, s.bytes)
    }

    /// Chunk bytes over raw RGBA bytes. Below 1.0 means the file is smaller.
    pub fn compression_ratio(&self) -> f64 {
        ratio(
            self.total_chunk_bytes(),
            self.total_pixels() * RGBA_BYTES as u64,
        )
    }

    /// Size of the file these statistics came from.
    pub fn file_len(&self) -> u64 {
        self.total_chunk_bytes() + (HEADER_LEN + END_MARKER.len()) as u64
    }
}

fn ratio(num: u64, den: u64) -> f64 {
    if den == 0 { 0.0 } else { num as f64 / den as f64 }
}

impl fmt::Display for EncodingAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}x{} {:?} {:?}",
            self.header.width, self.header.height, self.header.channels, self.header.colorspace
        )?;
        writeln!(
            f,
            "{:<13} {:>10} {:>7} {:>10} {:>7} {:>8}",
            "op", "pixels", "pix%", "bytes", "byte%", "pix/byte"
        )?;
        for kind in OpKind::ALL {
            let s = self.stats(kind);
            writeln!(
                f,
                "{:<13} {:>10} {:>6.2}% {:>10} {:>6.2}% {:>8.2}",
                kind.name(),
                s.pixels,
                self.pixel_share(kind) * 100.0,
                s.bytes,
                self.byte_share(kind) * 100.0,
                self.pixels_per_byte(kind),
            )?;
        }
        write!(
            f,
            "total: {} pixels, {} chunk bytes, {:.2}% of raw RGBA",
            self.total_pixels(),
            self.total_chunk_bytes(),
            self.compression_ratio() * 100.0
        )
    }
}

/// Analyze a QOI file with no resource limits.
pub fn analyze(data: &[u8], stop: impl Stop) -> Result<EncodingAnalysis, QoiError> {
    analyze_with_limits(data, None, stop)
}

/// Analyze a QOI file, checking the header against `limits` first.
///
/// The header is parsed permissively, so files with channel byte 0 are
/// analyzed too. The end marker is not checked.
pub fn analyze_with_limits(
    data: &[u8],
    limits: Option<&Limits>,
    stop: impl Stop,
) -> Result<EncodingAnalysis, QoiError> {
    let mut decoder =
        Decoder::new(SliceReader::new(data)).with_strictness(Strictness::Permissive);
    let header = decoder.read_header()?;
    let heat_bytes = match limits {
        Some(limits) => limits.check_image(header.width, header.height)?,
        None => output_bytes(header.width, header.height)?,
    };
    stop.check()?;

    let mut heat_map = vec![0u8; heat_bytes];
    let mut stats = [OpStats::default(); 6];
    let mut pos = 0usize;
    let mut chunks = 0u32;

    while let Some(chunk) = decoder.next_chunk()? {
        if chunks % STOP_INTERVAL == 0 {
            stop.check()?;
        }
        chunks = chunks.wrapping_add(1);

        let s = &mut stats[chunk.kind.ordinal()];
        s.chunks += 1;
        s.pixels += u64::from(chunk.run);
        s.bytes += chunk.bytes as u64;

        let run = chunk.run as usize;
        heat_map[..].put_run(pos, run, chunk.kind.heat_color());
        pos += run;
    }
    debug!("Analyzed {pos} pixels");

    Ok(EncodingAnalysis {
        header,
        stats,
        heat_map,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode;
    use crate::pixel::PixelLayout;
    use alloc::string::ToString;
    use enough::Unstoppable;

    fn gradient(width: u32, height: u32) -> Vec<u8> {
        let mut out = Vec::new();
        for y in 0..height {
            for x in 0..width {
                let a = if x % 7 == 0 { 128 } else { 255 };
                out.extend_from_slice(&[(x * 3) as u8, (y * 5) as u8, ((x ^ y) * 40) as u8, a]);
            }
        }
        out
    }

    #[test]
    fn totals_match_image_and_file() {
        let pixels = gradient(23, 17);
        let encoded = encode(&pixels, 23, 17, PixelLayout::Rgba8, Unstoppable).unwrap();
        let analysis = analyze(&encoded, Unstoppable).unwrap();

        assert_eq!(analysis.total_pixels(), 23 * 17);
        assert_eq!(analysis.file_len(), encoded.len() as u64);
        assert_eq!(analysis.heat_map().len(), 23 * 17 * 4);

        let share: f64 = OpKind::ALL.iter().map(|&k| analysis.pixel_share(k)).sum();
        assert!((share - 1.0).abs() < 1e-9);
    }

    #[test]
    fn heat_map_colors_each_op() {
        // opaque black (RUN), red literal (RGB), translucent (RGBA), red again (INDEX)
        let pixels = [0, 0, 0, 255, 200, 0, 0, 255, 9, 9, 9, 9, 200, 0, 0, 255];
        let encoded = encode(&pixels, 4, 1, PixelLayout::Rgba8, Unstoppable).unwrap();
        let analysis = analyze(&encoded, Unstoppable).unwrap();

        let colors: Vec<Pixel> = analysis
            .heat_map()
            .chunks_exact(4)
            .map(|px| Pixel::from_rgba([px[0], px[1], px[2], px[3]]))
            .collect();
        assert_eq!(
            colors,
            [
                OpKind::Run.heat_color(),
                OpKind::Rgb.heat_color(),
                OpKind::Rgba.heat_color(),
                OpKind::Index.heat_color(),
            ]
        );
        assert_eq!(analysis.stats(OpKind::Rgb).bytes, 4);
        assert_eq!(analysis.stats(OpKind::Rgba).bytes, 5);
        assert_eq!(analysis.total_chunk_bytes(), 1 + 4 + 5 + 1);
    }

    #[test]
    fn runs_count_pixels_not_chunks() {
        let pixels = [0u8, 0, 0, 255].repeat(100);
        let encoded = encode(&pixels, 10, 10, PixelLayout::Rgba8, Unstoppable).unwrap();
        let analysis = analyze(&encoded, Unstoppable).unwrap();
        let run = analysis.stats(OpKind::Run);
        assert_eq!(run.pixels, 100);
        assert_eq!(run.chunks, 2);
        assert_eq!(run.bytes, 2);
        assert_eq!(analysis.pixels_per_byte(OpKind::Run), 50.0);
        assert_eq!(analysis.compression_ratio(), 2.0 / 400.0);
    }

    #[test]
    fn report_lists_ops_in_order() {
        let encoded = encode(&gradient(5, 5), 5, 5, PixelLayout::Rgba8, Unstoppable).unwrap();
        let report = analyze(&encoded, Unstoppable).unwrap().to_string();
        let positions: Vec<usize> = OpKind::ALL
            .iter()
            .map(|k| report.find(&alloc::format!("{} ", k.name())).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(report.starts_with("5x5 "));
    }

    #[test]
    fn unspecified_channels_are_analyzed() {
        let mut encoded = encode(&[200, 0, 0, 255], 1, 1, PixelLayout::Rgba8, Unstoppable).unwrap();
        encoded[12] = 0;
        let analysis = analyze(&encoded, Unstoppable).unwrap();
        assert_eq!(analysis.header.channels, crate::header::Channels::Unspecified);
        assert_eq!(analysis.stats(OpKind::Rgb).pixels, 1);
    }

    #[test]
    fn limits_are_checked_before_allocation() {
        let mut data = crate::header::encode_header(100_000, 100_000).to_vec();
        data.extend_from_slice(&END_MARKER);
        let limits = Limits {
            max_pixels: Some(1_000_000),
            ..Limits::default()
        };
        assert!(matches!(
            analyze_with_limits(&data, Some(&limits), Unstoppable),
            Err(QoiError::LimitExceeded(_))
        ));
    }
}
