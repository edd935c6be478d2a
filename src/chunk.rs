//! Chunk kinds, tag constants and chunk serialization.

use crate::error::QoiError;
use crate::io::ByteSink;
use crate::pixel::Pixel;

pub(crate) const OP_INDEX: u8 = 0b0000_0000;
pub(crate) const OP_DIFF: u8 = 0b0100_0000;
pub(crate) const OP_LUMA: u8 = 0b1000_0000;
pub(crate) const OP_RUN: u8 = 0b1100_0000;
pub(crate) const OP_RGB: u8 = 0b1111_1110;
pub(crate) const OP_RGBA: u8 = 0b1111_1111;

pub(crate) const MASK_2: u8 = 0b1100_0000;
pub(crate) const MASK_6: u8 = 0b0011_1111;

/// Longest run a single RUN chunk can carry. 63 and 64 would collide with
/// the RGB and RGBA tags.
pub const MAX_RUN: u8 = 62;

/// Trailer written after the last chunk.
pub const END_MARKER: [u8; 8] = [0, 0, 0, 0, 0, 0, 0, 1];

/// The six chunk kinds of the QOI stream.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpKind {
    Rgb,
    Rgba,
    Index,
    Diff,
    Luma,
    Run,
}

impl OpKind {
    /// All kinds, in report order.
    pub const ALL: [OpKind; 6] = [
        OpKind::Rgb,
        OpKind::Rgba,
        OpKind::Index,
        OpKind::Diff,
        OpKind::Luma,
        OpKind::Run,
    ];

    /// Classify a tag byte. 0xFE and 0xFF are matched before the 2-bit tag.
    #[inline]
    pub fn from_tag(tag: u8) -> OpKind {
        match tag {
            OP_RGB => OpKind::Rgb,
            OP_RGBA => OpKind::Rgba,
            t => match t & MASK_2 {
                OP_INDEX => OpKind::Index,
                OP_DIFF => OpKind::Diff,
                OP_LUMA => OpKind::Luma,
                OP_RUN => OpKind::Run,
                _ => unreachable!("two-bit tag {t:#04x} outside 0b00..=0b11"),
            },
        }
    }

    /// Payload bytes following the tag.
    pub const fn payload_len(self) -> usize {
        match self {
            OpKind::Rgb => 3,
            OpKind::Rgba => 4,
            OpKind::Luma => 1,
            OpKind::Index | OpKind::Diff | OpKind::Run => 0,
        }
    }

    /// Chunk size on the wire, tag included.
    pub const fn encoded_len(self) -> usize {
        1 + self.payload_len()
    }

    pub const fn name(self) -> &'static str {
        match self {
            OpKind::Rgb => "QOI_OP_RGB",
            OpKind::Rgba => "QOI_OP_RGBA",
            OpKind::Index => "QOI_OP_INDEX",
            OpKind::Diff => "QOI_OP_DIFF",
            OpKind::Luma => "QOI_OP_LUMA",
            OpKind::Run => "QOI_OP_RUN",
        }
    }

    /// Position in [`OpKind::ALL`].
    pub(crate) const fn ordinal(self) -> usize {
        match self {
            OpKind::Rgb => 0,
            OpKind::Rgba => 1,
            OpKind::Index => 2,
            OpKind::Diff => 3,
            OpKind::Luma => 4,
            OpKind::Run => 5,
        }
    }
}

/// One encoded chunk. Delta fields hold biased values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Chunk {
    Rgb { r: u8, g: u8, b: u8 },
    Rgba(Pixel),
    /// Cache slot, 0..=63.
    Index(u8),
    /// Each delta biased by +2, 0..=3.
    Diff { dr: u8, dg: u8, db: u8 },
    /// `dg` biased by +32 (0..=63), `dr_dg`/`db_dg` biased by +8 (0..=15).
    Luma { dg: u8, dr_dg: u8, db_dg: u8 },
    /// Repeat count, 1..=62.
    Run(u8),
}

impl Chunk {
    pub fn kind(&self) -> OpKind {
        match self {
            Chunk::Rgb { .. } => OpKind::Rgb,
            Chunk::Rgba(_) => OpKind::Rgba,
            Chunk::Index(_) => OpKind::Index,
            Chunk::Diff { .. } => OpKind::Diff,
            Chunk::Luma { .. } => OpKind::Luma,
            Chunk::Run(_) => OpKind::Run,
        }
    }

    /// Wire bytes of this chunk. Only the first `kind().encoded_len()` are used.
    pub fn to_bytes(&self) -> [u8; 5] {
        match *self {
            Chunk::Rgb { r, g, b } => [OP_RGB, r, g, b, 0],
            Chunk::Rgba(px) => [OP_RGBA, px.r, px.g, px.b, px.a],
            Chunk::Index(slot) => [OP_INDEX | (slot & MASK_6), 0, 0, 0, 0],
            Chunk::Diff { dr, dg, db } => [OP_DIFF | dr << 4 | dg << 2 | db, 0, 0, 0, 0],
            Chunk::Luma { dg, dr_dg, db_dg } => [OP_LUMA | dg, dr_dg << 4 | db_dg, 0, 0, 0],
            Chunk::Run(len) => {
                debug_assert!((1..=MAX_RUN).contains(&len));
                [OP_RUN | (len - 1), 0, 0, 0, 0]
            }
        }
    }

    /// Write to `sink`, returning the number of bytes written.
    pub fn write_to<S: ByteSink + ?Sized>(&self, sink: &mut S) -> Result<usize, QoiError> {
        let len = self.kind().encoded_len();
        sink.write_all(&self.to_bytes()[..len])?;
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;

    #[test]
    fn every_tag_byte_classifies() {
        let mut counts = [0usize; 6];
        for tag in 0..=255u8 {
            counts[OpKind::from_tag(tag).ordinal()] += 1;
        }
        // RUN loses 0xFE and 0xFF to the literals
        assert_eq!(counts, [1, 1, 64, 64, 64, 62]);
    }

    #[test]
    fn diff_tag_vector() {
        // (10,10,10) -> (11,9,10): +1,-1,0 biased to 3,1,2
        let chunk = Chunk::Diff {
            dr: 3,
            dg: 1,
            db: 2,
        };
        assert_eq!(chunk.to_bytes()[0], 0x76);
        assert_eq!(chunk.kind().encoded_len(), 1);
    }

    #[test]
    fn run_tags_stop_before_literals() {
        assert_eq!(Chunk::Run(1).to_bytes()[0], 0xC0);
        assert_eq!(Chunk::Run(MAX_RUN).to_bytes()[0], 0xFD);
        assert_eq!(OpKind::from_tag(0xFD), OpKind::Run);
    }

    #[test]
    fn write_to_emits_encoded_len() {
        let mut out = Vec::new();
        let n = Chunk::Luma {
            dg: 40,
            dr_dg: 9,
            db_dg: 7,
        }
        .write_to(&mut out)
        .unwrap();
        assert_eq!(n, 2);
        assert_eq!(out, [0x80 | 40, 0x97]);

        out.clear();
        let n = Chunk::Rgba(Pixel::new(1, 2, 3, 4)).write_to(&mut out).unwrap();
        assert_eq!(n, 5);
        assert_eq!(out, [0xFF, 1, 2, 3, 4]);
    }
}
