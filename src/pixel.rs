use crate::error::QoiError;

/// Bytes per decoded pixel. QOI always decodes to 4-channel RGBA.
pub const RGBA_BYTES: usize = 4;

/// A straight-alpha (non-premultiplied) 8-bit RGBA pixel.
///
/// Channel arithmetic used by the codec wraps modulo 256 on both the encode
/// and decode side.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Pixel {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Pixel {
    /// Initial value of every history cache slot.
    pub const ZERO: Pixel = Pixel::new(0, 0, 0, 0);
    /// Initial "previous pixel" of every encode/decode session.
    pub const OPAQUE_BLACK: Pixel = Pixel::new(0, 0, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn from_rgba(px: [u8; 4]) -> Self {
        Self::new(px[0], px[1], px[2], px[3])
    }

    pub const fn to_rgba(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }

    /// History cache slot for this pixel: `(3r + 5g + 7b + 11a) mod 64`.
    ///
    /// The sum is taken in `u32` so no term is truncated before the modulo.
    #[inline]
    pub const fn hash(self) -> u8 {
        ((self.r as u32 * 3 + self.g as u32 * 5 + self.b as u32 * 7 + self.a as u32 * 11) % 64)
            as u8
    }

    /// Add (wrapping) per-channel deltas to R, G and B. Alpha is kept.
    #[inline]
    pub(crate) const fn offset(self, dr: u8, dg: u8, db: u8) -> Self {
        Self::new(
            self.r.wrapping_add(dr),
            self.g.wrapping_add(dg),
            self.b.wrapping_add(db),
            self.a,
        )
    }

    /// Convert premultiplied RGBA to straight alpha.
    ///
    /// Channels are widened to 16 bits (`c * 0x101`), divided by alpha and
    /// narrowed back, so fully opaque pixels pass through untouched and fully
    /// transparent ones collapse to `(0, 0, 0, 0)`.
    pub fn unpremultiply(self) -> Self {
        match self.a {
            255 => self,
            0 => Self::ZERO,
            a => {
                let a16 = a as u32 * 0x101;
                let un = |c: u8| (((c as u32 * 0x101) * 0xFFFF / a16) >> 8).min(255) as u8;
                Self::new(un(self.r), un(self.g), un(self.b), a)
            }
        }
    }
}

impl From<[u8; 4]> for Pixel {
    fn from(px: [u8; 4]) -> Self {
        Self::from_rgba(px)
    }
}

impl From<Pixel> for [u8; 4] {
    fn from(px: Pixel) -> Self {
        px.to_rgba()
    }
}

/// Memory layout of raw 8-bit pixel buffers accepted by the encoder.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PixelLayout {
    /// 3 channels, 8-bit RGB. Alpha is taken as 255.
    Rgb8,
    /// 4 channels, 8-bit straight-alpha RGBA.
    Rgba8,
    /// 3 channels, 8-bit BGR. Alpha is taken as 255.
    Bgr8,
    /// 4 channels, 8-bit straight-alpha BGRA.
    Bgra8,
    /// 4 channels, 8-bit RGBA with color premultiplied by alpha.
    Rgba8Premultiplied,
}

impl PixelLayout {
    /// Bytes per pixel for this layout.
    pub fn bytes_per_pixel(&self) -> usize {
        match self {
            Self::Rgb8 | Self::Bgr8 => 3,
            Self::Rgba8 | Self::Bgra8 | Self::Rgba8Premultiplied => 4,
        }
    }

    /// Number of channels.
    pub fn channels(&self) -> usize {
        self.bytes_per_pixel()
    }

    /// Whether the layout carries an alpha channel.
    pub fn has_alpha(&self) -> bool {
        self.channels() == 4
    }

    /// Read one pixel from `px`, which holds exactly `bytes_per_pixel` bytes.
    #[inline]
    fn read(&self, px: &[u8]) -> Pixel {
        match self {
            Self::Rgb8 => Pixel::new(px[0], px[1], px[2], 255),
            Self::Rgba8 => Pixel::new(px[0], px[1], px[2], px[3]),
            Self::Bgr8 => Pixel::new(px[2], px[1], px[0], 255),
            Self::Bgra8 => Pixel::new(px[2], px[1], px[0], px[3]),
            Self::Rgba8Premultiplied => Pixel::new(px[0], px[1], px[2], px[3]).unpremultiply(),
        }
    }
}

/// Random-access source of straight-alpha RGBA pixels, row-major.
///
/// Implementations normalize whatever they wrap (other channel orders,
/// premultiplied alpha, strided rows) before handing pixels to the encoder.
pub trait PixelSource {
    fn width(&self) -> u32;
    fn height(&self) -> u32;
    /// Pixel at linear position `index` (`y * width + x`).
    ///
    /// Callers never pass an index at or beyond `width * height`.
    fn pixel(&self, index: usize) -> Pixel;
}

impl<P: PixelSource + ?Sized> PixelSource for &P {
    fn width(&self) -> u32 {
        (**self).width()
    }
    fn height(&self) -> u32 {
        (**self).height()
    }
    fn pixel(&self, index: usize) -> Pixel {
        (**self).pixel(index)
    }
}

/// Destination for decoded pixels over a pre-sized grid.
pub trait PixelSink {
    /// Number of pixels the sink holds.
    fn capacity(&self) -> usize;

    /// Write `px` at linear position `index`.
    ///
    /// Callers never pass an index at or beyond [`capacity`](Self::capacity).
    fn put(&mut self, index: usize, px: Pixel);

    /// Write `px` at `len` consecutive positions starting at `start`.
    fn put_run(&mut self, start: usize, len: usize, px: Pixel) {
        for index in start..start + len {
            self.put(index, px);
        }
    }
}

/// Interleaved RGBA bytes, 4 per pixel.
impl PixelSink for [u8] {
    fn capacity(&self) -> usize {
        self.len() / RGBA_BYTES
    }

    #[inline]
    fn put(&mut self, index: usize, px: Pixel) {
        let off = index * RGBA_BYTES;
        self[off..off + RGBA_BYTES].copy_from_slice(&px.to_rgba());
    }

    fn put_run(&mut self, start: usize, len: usize, px: Pixel) {
        let rgba = px.to_rgba();
        let span = &mut self[start * RGBA_BYTES..(start + len) * RGBA_BYTES];
        for dst in span.chunks_exact_mut(RGBA_BYTES) {
            dst.copy_from_slice(&rgba);
        }
    }
}

impl PixelSink for [Pixel] {
    fn capacity(&self) -> usize {
        self.len()
    }

    #[inline]
    fn put(&mut self, index: usize, px: Pixel) {
        self[index] = px;
    }

    fn put_run(&mut self, start: usize, len: usize, px: Pixel) {
        self[start..start + len].fill(px);
    }
}

/// A raw interleaved pixel buffer viewed as a [`PixelSource`].
#[derive(Clone, Copy, Debug)]
pub struct RawPixels<'a> {
    data: &'a [u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
}

impl<'a> RawPixels<'a> {
    /// Wrap `data`, checking it holds at least `width * height` pixels.
    pub fn new(
        data: &'a [u8],
        width: u32,
        height: u32,
        layout: PixelLayout,
    ) -> Result<Self, QoiError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|wh| wh.checked_mul(layout.bytes_per_pixel()))
            .ok_or(QoiError::DimensionsTooLarge { width, height })?;
        if data.len() < expected {
            return Err(QoiError::BufferTooSmall {
                needed: expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            data: &data[..expected],
            width,
            height,
            layout,
        })
    }

    pub fn layout(&self) -> PixelLayout {
        self.layout
    }
}

impl PixelSource for RawPixels<'_> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    fn pixel(&self, index: usize) -> Pixel {
        let bpp = self.layout.bytes_per_pixel();
        let off = index * bpp;
        self.layout.read(&self.data[off..off + bpp])
    }
}
