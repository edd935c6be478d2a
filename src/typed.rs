//! Interop with the `rgb` and `imgref` pixel types.

use rgb::RGBA8;

use crate::pixel::{Pixel, PixelSink};

impl From<RGBA8> for Pixel {
    fn from(px: RGBA8) -> Self {
        Pixel::new(px.r, px.g, px.b, px.a)
    }
}

impl From<Pixel> for RGBA8 {
    fn from(px: Pixel) -> Self {
        RGBA8::new(px.r, px.g, px.b, px.a)
    }
}

impl PixelSink for [RGBA8] {
    fn capacity(&self) -> usize {
        self.len()
    }

    #[inline]
    fn put(&mut self, index: usize, px: Pixel) {
        self[index] = px.into();
    }

    fn put_run(&mut self, start: usize, len: usize, px: Pixel) {
        self[start..start + len].fill(px.into());
    }
}

/// `usize` image dimensions as header dimensions.
#[cfg(feature = "imgref")]
pub(crate) fn header_dims(
    width: usize,
    height: usize,
) -> Result<(u32, u32), crate::error::QoiError> {
    match (u32::try_from(width), u32::try_from(height)) {
        (Ok(w), Ok(h)) => Ok((w, h)),
        _ => Err(crate::error::QoiError::DimensionsTooLarge {
            width: u32::try_from(width).unwrap_or(u32::MAX),
            height: u32::try_from(height).unwrap_or(u32::MAX),
        }),
    }
}

/// Strided RGBA image, read row-major with padding skipped.
///
/// Dimensions beyond `u32::MAX` saturate; [`EncodeRequest::encode_imgref`]
/// rejects them up front.
///
/// [`EncodeRequest::encode_imgref`]: crate::EncodeRequest::encode_imgref
#[cfg(feature = "imgref")]
impl crate::pixel::PixelSource for imgref::ImgRef<'_, RGBA8> {
    fn width(&self) -> u32 {
        u32::try_from(imgref::Img::width(self)).unwrap_or(u32::MAX)
    }

    fn height(&self) -> u32 {
        u32::try_from(imgref::Img::height(self)).unwrap_or(u32::MAX)
    }

    #[inline]
    fn pixel(&self, index: usize) -> Pixel {
        let w = imgref::Img::width(self);
        let (y, x) = (index / w, index % w);
        self.buf()[y * self.stride() + x].into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;
    use enough::Unstoppable;

    #[test]
    fn decode_into_rgba8_slice() {
        let encoded = crate::encode::encode(
            &[1, 2, 3, 4, 1, 2, 3, 4, 9, 9, 9, 255],
            3,
            1,
            crate::pixel::PixelLayout::Rgba8,
            Unstoppable,
        )
        .unwrap();
        let mut out = vec![RGBA8::default(); 3];
        let mut decoder = crate::decode::Decoder::new(crate::io::SliceReader::new(&encoded));
        decoder.decode_into(&mut out[..], Unstoppable).unwrap();
        assert_eq!(out, [
            RGBA8::new(1, 2, 3, 4),
            RGBA8::new(1, 2, 3, 4),
            RGBA8::new(9, 9, 9, 255)
        ]);
    }

    #[cfg(all(feature = "imgref", target_pointer_width = "64"))]
    #[test]
    fn oversized_dimensions_are_rejected() {
        assert_eq!(header_dims(640, 480).unwrap(), (640, 480));
        let wide = 1usize << 32;
        assert!(matches!(
            header_dims(wide, 1),
            Err(crate::error::QoiError::DimensionsTooLarge {
                width: u32::MAX,
                height: 1
            })
        ));
        assert!(header_dims(1, wide).is_err());
    }

    #[cfg(feature = "imgref")]
    #[test]
    fn strided_imgref_encodes_visible_pixels() {
        let red = RGBA8::new(255, 0, 0, 255);
        let pad = RGBA8::new(1, 1, 1, 1);
        // 2x2 visible, stride 3
        let buf = vec![red, red, pad, red, red, pad];
        let img = imgref::Img::new_stride(&buf[..], 2, 2, 3);
        let encoded = crate::EncodeRequest::new()
            .encode_imgref(img, Unstoppable)
            .unwrap();
        let decoded = crate::decode(&encoded, Unstoppable).unwrap();
        assert!(decoded.as_rgba().iter().all(|&px| px == red));
    }
}
