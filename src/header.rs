//! The fixed 14-byte QOI header.

use crate::error::{HeaderError, QoiError};

/// Size of the encoded header in bytes.
pub const HEADER_LEN: usize = 14;

/// `"qoif"`.
pub const MAGIC: [u8; 4] = *b"qoif";

/// Channel count recorded in the header.
///
/// Informational only: the chunk stream always decodes to RGBA.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channels {
    /// Channel byte `0`, accepted only by [`Strictness::Permissive`].
    Unspecified,
    Rgb,
    Rgba,
}

impl Channels {
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Unspecified => 0,
            Self::Rgb => 3,
            Self::Rgba => 4,
        }
    }
}

/// Colorspace flag recorded in the header. Passed through, never applied.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ColorSpace {
    /// sRGB color channels with linear alpha (`0`).
    #[default]
    Srgb,
    /// All channels linear (`1`).
    Linear,
}

impl ColorSpace {
    pub fn to_u8(self) -> u8 {
        match self {
            Self::Srgb => 0,
            Self::Linear => 1,
        }
    }
}

/// Controls how strictly the decoder validates input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strictness {
    /// Like `Standard`, and additionally require the 8-byte end marker right
    /// after the last chunk.
    Strict,

    /// Default behavior. Channel byte must be 3 or 4, colorspace 0 or 1.
    /// Bytes after the last chunk are ignored.
    #[default]
    Standard,

    /// Also accept channel byte 0, as written by some older encoders.
    Permissive,
}

/// Parsed QOI header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct QoiHeader {
    pub width: u32,
    pub height: u32,
    pub channels: Channels,
    pub colorspace: ColorSpace,
}

impl QoiHeader {
    /// Header for a 4-channel sRGB image, the only kind the encoder writes.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            channels: Channels::Rgba,
            colorspace: ColorSpace::Srgb,
        }
    }

    /// Total number of pixels in the image.
    pub fn pixel_count(&self) -> u64 {
        u64::from(self.width) * u64::from(self.height)
    }

    /// Parse and validate a header.
    pub fn parse(bytes: &[u8; HEADER_LEN], strictness: Strictness) -> Result<Self, HeaderError> {
        let magic = [bytes[0], bytes[1], bytes[2], bytes[3]];
        if magic != MAGIC {
            return Err(HeaderError::BadMagic { found: magic });
        }
        let width = u32::from_be_bytes([bytes[4], bytes[5], bytes[6], bytes[7]]);
        let height = u32::from_be_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);

        let channels = match bytes[12] {
            3 => Channels::Rgb,
            4 => Channels::Rgba,
            0 if strictness == Strictness::Permissive => Channels::Unspecified,
            other => return Err(HeaderError::BadChannels(other)),
        };
        let colorspace = match bytes[13] {
            0 => ColorSpace::Srgb,
            1 => ColorSpace::Linear,
            other => return Err(HeaderError::BadColorspace(other)),
        };

        Ok(Self {
            width,
            height,
            channels,
            colorspace,
        })
    }

    /// Serialize to the 14-byte wire form.
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut out = [0u8; HEADER_LEN];
        out[0..4].copy_from_slice(&MAGIC);
        out[4..8].copy_from_slice(&self.width.to_be_bytes());
        out[8..12].copy_from_slice(&self.height.to_be_bytes());
        out[12] = self.channels.to_u8();
        out[13] = self.colorspace.to_u8();
        out
    }
}

/// Parse the header at the start of `data` with default strictness.
///
/// Fewer than 14 bytes is a truncation (`UnexpectedEof`), not an invalid
/// header.
pub fn decode_header(data: &[u8]) -> Result<QoiHeader, QoiError> {
    let bytes: &[u8; HEADER_LEN] = data
        .get(..HEADER_LEN)
        .and_then(|h| h.try_into().ok())
        .ok_or(QoiError::UnexpectedEof)?;
    Ok(QoiHeader::parse(bytes, Strictness::Standard)?)
}

/// Header bytes for a `width` x `height` image: 4 channels, sRGB.
pub fn encode_header(width: u32, height: u32) -> [u8; HEADER_LEN] {
    QoiHeader::new(width, height).to_bytes()
}
