//! Chunk encoder and encode requests.

use alloc::vec::Vec;

use enough::Stop;

use crate::cache::HistoryCache;
use crate::chunk::{Chunk, END_MARKER, MAX_RUN};
use crate::error::QoiError;
use crate::header::{ColorSpace, HEADER_LEN, QoiHeader};
use crate::io::ByteSink;
use crate::log::{debug, trace};
use crate::pixel::{Pixel, PixelLayout, PixelSource, RawPixels};

/// Pixels between cancellation checks.
const STOP_INTERVAL: usize = 4096;

/// Everything a selector needs to decide on a chunk for one pixel.
struct Candidate {
    px: Pixel,
    hash: u8,
    cached: Pixel,
    prev: Pixel,
    /// Wrapping channel differences `px - prev`.
    vr: u8,
    vg: u8,
    vb: u8,
}

impl Candidate {
    fn new(px: Pixel, prev: Pixel, cache: &HistoryCache) -> Self {
        let hash = px.hash();
        Self {
            px,
            hash,
            cached: cache.get(hash),
            prev,
            vr: px.r.wrapping_sub(prev.r),
            vg: px.g.wrapping_sub(prev.g),
            vb: px.b.wrapping_sub(prev.b),
        }
    }

    fn same_alpha(&self) -> bool {
        self.px.a == self.prev.a
    }
}

type Selector = fn(&Candidate) -> Option<Chunk>;

/// Chunk selection for a pixel that does not continue a run. First match wins.
const SELECTORS: [Selector; 5] = [index_chunk, diff_chunk, luma_chunk, rgb_chunk, rgba_chunk];

fn index_chunk(c: &Candidate) -> Option<Chunk> {
    (c.cached == c.px).then_some(Chunk::Index(c.hash))
}

fn diff_chunk(c: &Candidate) -> Option<Chunk> {
    let dr = c.vr.wrapping_add(2);
    let dg = c.vg.wrapping_add(2);
    let db = c.vb.wrapping_add(2);
    (c.same_alpha() && dr < 4 && dg < 4 && db < 4).then_some(Chunk::Diff { dr, dg, db })
}

fn luma_chunk(c: &Candidate) -> Option<Chunk> {
    let dg = c.vg.wrapping_add(32);
    let dr_dg = c.vr.wrapping_sub(c.vg).wrapping_add(8);
    let db_dg = c.vb.wrapping_sub(c.vg).wrapping_add(8);
    (c.same_alpha() && dg < 64 && dr_dg < 16 && db_dg < 16).then_some(Chunk::Luma {
        dg,
        dr_dg,
        db_dg,
    })
}

fn rgb_chunk(c: &Candidate) -> Option<Chunk> {
    c.same_alpha().then_some(Chunk::Rgb {
        r: c.px.r,
        g: c.px.g,
        b: c.px.b,
    })
}

fn rgba_chunk(c: &Candidate) -> Option<Chunk> {
    Some(Chunk::Rgba(c.px))
}

/// Worst-case encoded size: header, 5 bytes per pixel, end marker.
pub fn max_encoded_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(5)?
        .checked_add(HEADER_LEN + END_MARKER.len())
}

/// Stateful QOI encoder over any [`PixelSource`].
///
/// One instance encodes one image; previous pixel and history cache start
/// fresh in [`Encoder::new`].
pub struct Encoder<'a, P: ?Sized> {
    source: &'a P,
    colorspace: ColorSpace,
    prev: Pixel,
    cache: HistoryCache,
}

impl<'a, P: PixelSource + ?Sized> Encoder<'a, P> {
    pub fn new(source: &'a P) -> Self {
        Self {
            source,
            colorspace: ColorSpace::Srgb,
            prev: Pixel::OPAQUE_BLACK,
            cache: HistoryCache::new(),
        }
    }

    /// Colorspace flag written to the header. Pixels are not transformed.
    pub fn with_colorspace(mut self, colorspace: ColorSpace) -> Self {
        self.colorspace = colorspace;
        self
    }

    /// Pick the chunk for `px`, which does not repeat the previous pixel, and
    /// record it as seen.
    fn select(&mut self, px: Pixel) -> Chunk {
        let candidate = Candidate::new(px, self.prev, &self.cache);
        let chunk = SELECTORS
            .iter()
            .find_map(|select| select(&candidate))
            .unwrap_or(Chunk::Rgba(px));
        self.remember(px);
        chunk
    }

    fn remember(&mut self, px: Pixel) {
        self.cache.insert(px);
        self.prev = px;
    }

    /// Encode the whole image into `sink`, returning the bytes written.
    pub fn encode_to<S: ByteSink + ?Sized>(
        self,
        sink: &mut S,
        stop: impl Stop,
    ) -> Result<usize, QoiError> {
        self.encode_dyn(sink, &stop)
    }

    fn encode_dyn<S: ByteSink + ?Sized>(
        mut self,
        sink: &mut S,
        stop: &dyn Stop,
    ) -> Result<usize, QoiError> {
        let width = self.source.width();
        let height = self.source.height();
        let total = (width as usize)
            .checked_mul(height as usize)
            .ok_or(QoiError::DimensionsTooLarge { width, height })?;

        let header = QoiHeader {
            colorspace: self.colorspace,
            ..QoiHeader::new(width, height)
        };
        sink.write_all(&header.to_bytes())?;
        let mut written = HEADER_LEN;
        trace!("Encoding {width}x{height} image, {total} pixels");

        let mut pos = 0;
        let mut next_check = 0;
        while pos < total {
            if pos >= next_check {
                stop.check()?;
                next_check = pos + STOP_INTERVAL;
            }

            let px = self.source.pixel(pos);
            let (chunk, consumed) = if px == self.prev {
                let run = self.run_length(px, pos, total);
                self.remember(px);
                (Chunk::Run(run as u8), run)
            } else {
                (self.select(px), 1)
            };

            written += chunk.write_to(sink)?;
            pos += consumed;
        }

        sink.write_all(&END_MARKER)?;
        written += END_MARKER.len();
        debug!("Encoded {total} pixels into {written} bytes");
        Ok(written)
    }

    /// Length of the run of `px` starting at `pos`, capped at [`MAX_RUN`].
    fn run_length(&self, px: Pixel, pos: usize, total: usize) -> usize {
        let limit = usize::from(MAX_RUN).min(total - pos);
        let mut run = 1;
        while run < limit && self.source.pixel(pos + run) == px {
            run += 1;
        }
        run
    }
}

/// Encode request builder.
///
/// ```
/// use zenqoi::{EncodeRequest, PixelLayout, Unstoppable};
///
/// let pixels = vec![255u8, 0, 0, 255, 0, 255, 0, 255]; // 2x1 RGBA
/// let encoded = EncodeRequest::new()
///     .encode(&pixels, 2, 1, PixelLayout::Rgba8, Unstoppable)?;
/// assert_eq!(&encoded[..4], b"qoif");
/// # Ok::<(), zenqoi::QoiError>(())
/// ```
#[derive(Clone, Debug, Default)]
pub struct EncodeRequest {
    colorspace: ColorSpace,
}

impl EncodeRequest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Colorspace flag for the header (default sRGB). Passed through as-is.
    pub fn with_colorspace(mut self, colorspace: ColorSpace) -> Self {
        self.colorspace = colorspace;
        self
    }

    /// Encode a raw interleaved buffer.
    pub fn encode(
        &self,
        pixels: &[u8],
        width: u32,
        height: u32,
        layout: PixelLayout,
        stop: impl Stop,
    ) -> Result<Vec<u8>, QoiError> {
        let source = RawPixels::new(pixels, width, height, layout)?;
        self.encode_source(&source, stop)
    }

    /// Encode from any [`PixelSource`].
    pub fn encode_source<P: PixelSource + ?Sized>(
        &self,
        source: &P,
        stop: impl Stop,
    ) -> Result<Vec<u8>, QoiError> {
        // Typical images land well under 1 byte per pixel; grow from there.
        let hint = (source.width() as usize).saturating_mul(source.height() as usize);
        let mut out = Vec::with_capacity(hint.saturating_add(HEADER_LEN + END_MARKER.len()));
        Encoder::new(source)
            .with_colorspace(self.colorspace)
            .encode_to(&mut out, stop)?;
        Ok(out)
    }

    /// Encode a raw interleaved buffer into a writer, returning bytes written.
    #[cfg(feature = "std")]
    pub fn encode_to_writer<W: std::io::Write>(
        &self,
        writer: W,
        pixels: &[u8],
        width: u32,
        height: u32,
        layout: PixelLayout,
        stop: impl Stop,
    ) -> Result<usize, QoiError> {
        let source = RawPixels::new(pixels, width, height, layout)?;
        let mut sink = crate::io::IoWriter(writer);
        Encoder::new(&source)
            .with_colorspace(self.colorspace)
            .encode_to(&mut sink, stop)
    }

    /// Encode an [`imgref::ImgRef`] of RGBA pixels.
    #[cfg(feature = "imgref")]
    pub fn encode_imgref(
        &self,
        img: imgref::ImgRef<'_, rgb::RGBA8>,
        stop: impl Stop,
    ) -> Result<Vec<u8>, QoiError> {
        crate::typed::header_dims(imgref::Img::width(&img), imgref::Img::height(&img))?;
        self.encode_source(&img, stop)
    }
}

/// Encode a raw interleaved buffer with default settings.
pub fn encode(
    pixels: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
    stop: impl Stop,
) -> Result<Vec<u8>, QoiError> {
    EncodeRequest::new().encode(pixels, width, height, layout, stop)
}
