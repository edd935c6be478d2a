//! Chunk decoder and decode requests.

use alloc::vec;
use alloc::vec::Vec;

use enough::Stop;

#[cfg(feature = "rgb")]
use rgb::AsPixels as _;

use crate::cache::HistoryCache;
use crate::chunk::{END_MARKER, MASK_6, OpKind};
use crate::error::QoiError;
use crate::header::{ColorSpace, Channels, HEADER_LEN, QoiHeader, Strictness};
use crate::io::{ByteSource, SliceReader};
use crate::limits::{Limits, output_bytes};
use crate::log::{debug, trace, warn};
use crate::pixel::{Pixel, PixelSink, RGBA_BYTES};

/// Chunks between cancellation checks.
const STOP_INTERVAL: u32 = 4096;

/// What one chunk of the stream did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkInfo {
    pub kind: OpKind,
    /// Reconstructed pixel.
    pub pixel: Pixel,
    /// Output pixels produced (1 except for RUN).
    pub run: u32,
    /// Input bytes consumed, tag included.
    pub bytes: usize,
}

/// Stateful QOI chunk decoder over any [`ByteSource`].
///
/// Holds the previous pixel and history cache of one decode session.
/// [`Decoder::next_chunk`] exposes each chunk as it is reconstructed;
/// [`Decoder::decode_into`] is built on it.
#[derive(Debug)]
pub struct Decoder<S> {
    source: S,
    strictness: Strictness,
    header: Option<QoiHeader>,
    prev: Pixel,
    cache: HistoryCache,
    remaining: u64,
}

impl<S: ByteSource> Decoder<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            strictness: Strictness::default(),
            header: None,
            prev: Pixel::OPAQUE_BLACK,
            cache: HistoryCache::new(),
            remaining: 0,
        }
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Read and validate the header. Idempotent.
    pub fn read_header(&mut self) -> Result<QoiHeader, QoiError> {
        if let Some(header) = self.header {
            return Ok(header);
        }
        let bytes = self.source.read_array::<HEADER_LEN>()?;
        let header = QoiHeader::parse(&bytes, self.strictness)?;
        trace!("Image width: {}", header.width);
        trace!("Image height: {}", header.height);
        trace!("Image channels: {:?}, colorspace: {:?}", header.channels, header.colorspace);
        self.remaining = header.pixel_count();
        self.header = Some(header);
        Ok(header)
    }

    /// Header, if it has been read.
    pub fn header(&self) -> Option<&QoiHeader> {
        self.header.as_ref()
    }

    /// Pixels still to be produced.
    pub fn pixels_remaining(&self) -> u64 {
        self.remaining
    }

    /// Decode the next chunk, or `None` once every pixel has been produced.
    ///
    /// Reads the header first if needed. A RUN that overshoots the image is
    /// clamped to the pixels left.
    pub fn next_chunk(&mut self) -> Result<Option<ChunkInfo>, QoiError> {
        self.read_header()?;
        if self.remaining == 0 {
            return Ok(None);
        }

        let tag = self.source.read_u8()?;
        let kind = OpKind::from_tag(tag);
        let prev = self.prev;

        let (pixel, mut run) = match kind {
            OpKind::Rgb => {
                let [r, g, b] = self.source.read_array::<3>()?;
                (Pixel::new(r, g, b, prev.a), 1)
            }
            OpKind::Rgba => (Pixel::from_rgba(self.source.read_array::<4>()?), 1),
            OpKind::Index => (self.cache.get(tag & MASK_6), 1),
            OpKind::Diff => {
                let dr = ((tag >> 4) & 0x03).wrapping_sub(2);
                let dg = ((tag >> 2) & 0x03).wrapping_sub(2);
                let db = (tag & 0x03).wrapping_sub(2);
                (prev.offset(dr, dg, db), 1)
            }
            OpKind::Luma => {
                let second = self.source.read_u8()?;
                let dg = (tag & MASK_6).wrapping_sub(32);
                let dr = dg.wrapping_add((second >> 4).wrapping_sub(8));
                let db = dg.wrapping_add((second & 0x0F).wrapping_sub(8));
                (prev.offset(dr, dg, db), 1)
            }
            OpKind::Run => (prev, u32::from(tag & MASK_6) + 1),
        };

        if u64::from(run) > self.remaining {
            warn!("run of {run} overshoots the {} pixels left", self.remaining);
            run = self.remaining as u32;
        }

        self.cache.insert(pixel);
        self.prev = pixel;
        self.remaining -= u64::from(run);

        Ok(Some(ChunkInfo {
            kind,
            pixel,
            run,
            bytes: kind.encoded_len(),
        }))
    }

    /// Decode every remaining chunk into `sink`.
    ///
    /// `sink` must hold `width * height` pixels, otherwise `BufferTooSmall` is
    /// returned before any chunk is read. In [`Strictness::Strict`] the end
    /// marker is verified afterwards.
    pub fn decode_into<P: PixelSink + ?Sized>(
        &mut self,
        sink: &mut P,
        stop: impl Stop,
    ) -> Result<(), QoiError> {
        self.decode_into_dyn(sink, &stop)
    }

    fn decode_into_dyn<P: PixelSink + ?Sized>(
        &mut self,
        sink: &mut P,
        stop: &dyn Stop,
    ) -> Result<(), QoiError> {
        let header = self.read_header()?;
        let needed = usize::try_from(header.pixel_count()).unwrap_or(usize::MAX);
        if sink.capacity() < needed {
            return Err(QoiError::BufferTooSmall {
                needed: needed.saturating_mul(RGBA_BYTES),
                actual: sink.capacity().saturating_mul(RGBA_BYTES),
            });
        }
        let mut pos = (header.pixel_count() - self.remaining) as usize;
        let mut chunks = 0u32;

        while let Some(chunk) = self.next_chunk()? {
            if chunks % STOP_INTERVAL == 0 {
                stop.check()?;
            }
            chunks = chunks.wrapping_add(1);
            sink.put_run(pos, chunk.run as usize, chunk.pixel);
            pos += chunk.run as usize;
        }
        debug!("Decoded {chunks} chunks");

        if self.strictness == Strictness::Strict {
            self.finish()?;
        }
        Ok(())
    }

    /// Decode the whole image into a new RGBA buffer, checking `limits` after
    /// the header and before allocating.
    pub fn decode(
        self,
        limits: Option<&Limits>,
        stop: impl Stop,
    ) -> Result<DecodeOutput, QoiError> {
        decode_source(self, limits, &stop)
    }

    /// Read the 8 bytes after the last chunk and check they are the end marker.
    pub fn finish(&mut self) -> Result<(), QoiError> {
        let trailer = self.source.read_array::<8>()?;
        if trailer != END_MARKER {
            return Err(QoiError::InvalidData(alloc::format!(
                "end marker mismatch: found {trailer:02x?}"
            )));
        }
        Ok(())
    }

    /// Give back the byte source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

/// Decoded image. Pixels are always 8-bit straight-alpha RGBA.
#[derive(Clone, Debug)]
pub struct DecodeOutput {
    pixels: Vec<u8>,
    pub width: u32,
    pub height: u32,
    /// Channel count recorded in the header (informational).
    pub channels: Channels,
    /// Colorspace flag recorded in the header (passed through, not applied).
    pub colorspace: ColorSpace,
}

impl DecodeOutput {
    /// RGBA pixel data, row-major.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Take ownership of the pixel data.
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Pixel at `(x, y)`, or `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let off = (y as usize * self.width as usize + x as usize) * RGBA_BYTES;
        let px = self.pixels.get(off..off + RGBA_BYTES)?;
        Some(Pixel::new(px[0], px[1], px[2], px[3]))
    }

    /// Compare against a reference RGBA image.
    ///
    /// Bounds are compared first (`BoundsMismatch`). Returns the first
    /// differing `(x, y)` in row-major order, or `None` if identical.
    pub fn first_mismatch(
        &self,
        width: u32,
        height: u32,
        expected: &[u8],
    ) -> Result<Option<(u32, u32)>, QoiError> {
        if (width, height) != (self.width, self.height) {
            return Err(QoiError::BoundsMismatch {
                expected: (width, height),
                actual: (self.width, self.height),
            });
        }
        if expected.len() < self.pixels.len() {
            return Err(QoiError::BufferTooSmall {
                needed: self.pixels.len(),
                actual: expected.len(),
            });
        }
        let mismatch = self
            .pixels
            .chunks_exact(RGBA_BYTES)
            .zip(expected.chunks_exact(RGBA_BYTES))
            .position(|(got, want)| got != want);
        Ok(mismatch.map(|i| {
            let w = self.width as usize;
            ((i % w) as u32, (i / w) as u32)
        }))
    }

    /// Reinterpret pixel data as typed RGBA pixels.
    #[cfg(feature = "rgb")]
    pub fn as_rgba(&self) -> &[rgb::RGBA8] {
        self.pixels.as_pixels()
    }

    /// Copy into an [`imgref::ImgVec`] of RGBA pixels.
    #[cfg(feature = "imgref")]
    pub fn to_imgvec(&self) -> imgref::ImgVec<rgb::RGBA8> {
        imgref::ImgVec::new(
            self.as_rgba().to_vec(),
            self.width as usize,
            self.height as usize,
        )
    }
}

/// Decode request builder.
///
/// ```no_run
/// use zenqoi::{DecodeRequest, Limits, Strictness, Unstoppable};
///
/// let data: &[u8] = &[]; // your QOI bytes
/// let limits = Limits {
///     max_pixels: Some(100_000_000),
///     ..Default::default()
/// };
/// let decoded = DecodeRequest::new(data)
///     .with_limits(&limits)
///     .with_strictness(Strictness::Strict)
///     .decode(Unstoppable)?;
/// println!("{}x{}", decoded.width, decoded.height);
/// # Ok::<(), zenqoi::QoiError>(())
/// ```
#[derive(Clone, Debug)]
pub struct DecodeRequest<'a> {
    data: &'a [u8],
    limits: Option<&'a Limits>,
    strictness: Strictness,
}

impl<'a> DecodeRequest<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            limits: None,
            strictness: Strictness::default(),
        }
    }

    pub fn with_limits(mut self, limits: &'a Limits) -> Self {
        self.limits = Some(limits);
        self
    }

    pub fn with_strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = strictness;
        self
    }

    /// Decode the whole image.
    pub fn decode(self, stop: impl Stop) -> Result<DecodeOutput, QoiError> {
        let decoder = Decoder::new(SliceReader::new(self.data)).with_strictness(self.strictness);
        decode_source(decoder, self.limits, &stop)
    }
}

/// Decode QOI bytes with default settings.
pub fn decode(data: &[u8], stop: impl Stop) -> Result<DecodeOutput, QoiError> {
    DecodeRequest::new(data).decode(stop)
}

/// Decode from a reader. Unbuffered readers should be wrapped in a `BufReader`.
///
/// Uses [`Strictness::Standard`]. For another mode, build the decoder
/// directly:
///
/// ```no_run
/// use zenqoi::{Decoder, IoReader, Strictness, Unstoppable};
///
/// let file = std::io::BufReader::new(std::fs::File::open("image.qoi")?);
/// let decoded = Decoder::new(IoReader(file))
///     .with_strictness(Strictness::Strict)
///     .decode(None, Unstoppable)?;
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[cfg(feature = "std")]
pub fn decode_from_reader<R: std::io::Read>(
    reader: R,
    limits: Option<&Limits>,
    stop: impl Stop,
) -> Result<DecodeOutput, QoiError> {
    decode_source(Decoder::new(crate::io::IoReader(reader)), limits, &stop)
}

fn decode_source<S: ByteSource>(
    mut decoder: Decoder<S>,
    limits: Option<&Limits>,
    stop: &dyn Stop,
) -> Result<DecodeOutput, QoiError> {
    let header = decoder.read_header()?;
    let out_bytes = match limits {
        Some(limits) => limits.check_image(header.width, header.height)?,
        None => output_bytes(header.width, header.height)?,
    };
    stop.check()?;

    let mut pixels = vec![0u8; out_bytes];
    decoder.decode_into_dyn(&mut pixels[..], stop)?;

    Ok(DecodeOutput {
        pixels,
        width: header.width,
        height: header.height,
        channels: header.channels,
        colorspace: header.colorspace,
    })
}
