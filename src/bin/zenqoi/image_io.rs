//! Reference image I/O for the CLI: PNG through `zune-png`, binary netpbm
//! (P5, P6, P7) through `zune-ppm`.

use std::path::Path;

use zenqoi::PixelLayout;
use zune_core::bit_depth::BitDepth;
use zune_core::colorspace::ColorSpace;
use zune_core::options::{DecoderOptions, EncoderOptions};
use zune_core::result::DecodingResult;
use zune_png::{PngDecoder, PngEncoder};
use zune_ppm::{PPMDecoder, PPMEncoder};

use crate::CliError;

const PNG_MAGIC: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ImageFormat {
    Png,
    Pam,
}

impl ImageFormat {
    /// Sniff the magic bytes.
    pub fn guess(data: &[u8]) -> Option<Self> {
        if data.starts_with(&PNG_MAGIC) {
            return Some(Self::Png);
        }
        match data.get(..2) {
            Some(b"P5" | b"P6" | b"P7") => Some(Self::Pam),
            _ => None,
        }
    }

    /// Output format for `path`: PNG for a `.png` extension, PAM otherwise.
    pub fn for_output(path: &Path) -> Self {
        match path.extension() {
            Some(ext) if ext.eq_ignore_ascii_case("png") => Self::Png,
            _ => Self::Pam,
        }
    }
}

/// An 8-bit image in a layout the encoder accepts.
pub(crate) struct RefImage {
    pub width: u32,
    pub height: u32,
    pub layout: PixelLayout,
    pub pixels: Vec<u8>,
}

fn image_err(what: &str, e: impl std::fmt::Debug) -> CliError {
    CliError::Image(format!("{what}: {e:?}"))
}

pub(crate) fn read(data: &[u8]) -> Result<RefImage, CliError> {
    match ImageFormat::guess(data) {
        Some(ImageFormat::Png) => read_png(data),
        Some(ImageFormat::Pam) => read_ppm(data),
        None => Err(CliError::Image(
            "unrecognized image, expected PNG or binary netpbm".into(),
        )),
    }
}

fn read_png(data: &[u8]) -> Result<RefImage, CliError> {
    let options = DecoderOptions::default()
        .png_set_strip_to_8bit(true)
        .set_max_width(u32::MAX as usize)
        .set_max_height(u32::MAX as usize);
    let mut decoder = PngDecoder::new_with_options(data, options);
    let result = decoder.decode().map_err(|e| image_err("png", e))?;
    let (width, height) = decoder
        .get_dimensions()
        .ok_or_else(|| CliError::Image("png: missing dimensions".into()))?;
    let colorspace = decoder.get_colorspace().unwrap_or(ColorSpace::Unknown);
    normalize(width, height, colorspace, result)
}

fn read_ppm(data: &[u8]) -> Result<RefImage, CliError> {
    let mut decoder = PPMDecoder::new(data);
    let result = decoder.decode().map_err(|e| image_err("netpbm", e))?;
    let (width, height) = decoder
        .get_dimensions()
        .ok_or_else(|| CliError::Image("netpbm: missing dimensions".into()))?;
    let colorspace = decoder.get_colorspace().unwrap_or(ColorSpace::Unknown);
    normalize(width, height, colorspace, result)
}

/// Gray images are widened to RGB(A); 16-bit samples are rejected.
fn normalize(
    width: usize,
    height: usize,
    colorspace: ColorSpace,
    result: DecodingResult,
) -> Result<RefImage, CliError> {
    let DecodingResult::U8(pixels) = result else {
        return Err(CliError::Image("only 8-bit samples are supported".into()));
    };
    let (layout, pixels) = match colorspace {
        ColorSpace::RGB => (PixelLayout::Rgb8, pixels),
        ColorSpace::RGBA => (PixelLayout::Rgba8, pixels),
        ColorSpace::Luma => (
            PixelLayout::Rgb8,
            pixels.iter().flat_map(|&l| [l, l, l]).collect(),
        ),
        ColorSpace::LumaA => (
            PixelLayout::Rgba8,
            pixels
                .chunks_exact(2)
                .flat_map(|la| [la[0], la[0], la[0], la[1]])
                .collect(),
        ),
        other => {
            return Err(CliError::Image(format!("unsupported colorspace {other:?}")));
        }
    };
    let dims = |v: usize| u32::try_from(v).map_err(|_| image_err("dimension", v));
    Ok(RefImage {
        width: dims(width)?,
        height: dims(height)?,
        layout,
        pixels,
    })
}

/// Encode straight RGBA pixels as `format`.
pub(crate) fn write_rgba(
    format: ImageFormat,
    width: u32,
    height: u32,
    rgba: &[u8],
) -> Result<Vec<u8>, CliError> {
    let options = EncoderOptions::new(
        width as usize,
        height as usize,
        ColorSpace::RGBA,
        BitDepth::Eight,
    );
    match format {
        ImageFormat::Png => Ok(PngEncoder::new(rgba, options).encode()),
        ImageFormat::Pam => PPMEncoder::new(rgba, options)
            .encode()
            .map_err(|e| image_err("netpbm", e)),
    }
}
