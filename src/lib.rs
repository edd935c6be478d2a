//! # zenqoi
//!
//! Encoder and decoder for the QOI ("Quite OK Image") lossless format, plus
//! chunk-level analysis of existing files.
//!
//! ## Format
//!
//! A QOI file is a 14-byte header, a stream of chunks and an 8-byte end
//! marker. Each chunk describes one pixel (or a run of repeats) relative to
//! the previous pixel and a 64-slot history cache:
//!
//! - **RGB / RGBA** literals
//! - **INDEX** into the history cache
//! - **DIFF** small per-channel deltas
//! - **LUMA** green delta plus red/blue offsets from it
//! - **RUN** of 1 to 62 repeats of the previous pixel
//!
//! The encoder always writes 4-channel files. Decoding always produces
//! straight-alpha RGBA; the header's channel and colorspace fields are
//! reported but never applied.
//!
//! ## Non-Goals
//!
//! - Color management (the colorspace flag is passed through)
//! - Multithreaded or SIMD encoding
//! - Animation or container formats
//!
//! ## Usage
//!
//! ```
//! use zenqoi::{DecodeRequest, EncodeRequest, PixelLayout, Unstoppable};
//!
//! let rgb = [255u8, 0, 0, 255, 0, 0, 0, 0, 255];
//! let encoded = EncodeRequest::new()
//!     .encode(&rgb, 3, 1, PixelLayout::Rgb8, Unstoppable)?;
//!
//! // Probe without decoding
//! let header = zenqoi::probe(&encoded)?;
//! assert_eq!((header.width, header.height), (3, 1));
//!
//! let decoded = DecodeRequest::new(&encoded).decode(Unstoppable)?;
//! assert_eq!(&decoded.pixels()[..4], &[255, 0, 0, 255]);
//! # Ok::<(), zenqoi::QoiError>(())
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(feature = "log")]
pub(crate) use ::log;
#[cfg(not(feature = "log"))]
mod log;

mod analysis;
mod cache;
mod chunk;
mod decode;
mod encode;
mod error;
mod header;
mod io;
mod limits;
mod pixel;

#[cfg(feature = "rgb")]
mod typed;

// Re-exports
pub use analysis::{EncodingAnalysis, OpStats, analyze, analyze_with_limits};
pub use cache::{CACHE_SLOTS, HistoryCache};
pub use chunk::{Chunk, END_MARKER, MAX_RUN, OpKind};
pub use decode::{ChunkInfo, DecodeOutput, DecodeRequest, Decoder, decode};
#[cfg(feature = "std")]
pub use decode::decode_from_reader;
pub use encode::{EncodeRequest, Encoder, encode, max_encoded_len};
pub use enough::{Stop, StopReason, Unstoppable};
pub use error::{HeaderError, QoiError};
pub use header::{
    Channels, ColorSpace, HEADER_LEN, MAGIC, QoiHeader, Strictness, decode_header, encode_header,
};
#[cfg(feature = "std")]
pub use io::{IoReader, IoWriter};
pub use io::{ByteSink, ByteSource, SliceReader};
pub use limits::Limits;
pub use pixel::{Pixel, PixelLayout, PixelSink, PixelSource, RawPixels};

/// Parse the header of a QOI file without decoding any pixels.
///
/// Accepts every header a [`Strictness::Permissive`] decode would.
pub fn probe(data: &[u8]) -> Result<QoiHeader, QoiError> {
    let mut reader = SliceReader::new(data);
    let bytes = reader.read_array::<HEADER_LEN>()?;
    Ok(QoiHeader::parse(&bytes, Strictness::Permissive)?)
}
