//! Byte sources and sinks the engines read from and write to.

use alloc::vec::Vec;

use crate::error::QoiError;

/// Sequential byte input. Running out of bytes is `UnexpectedEof`.
pub trait ByteSource {
    fn read_u8(&mut self) -> Result<u8, QoiError>;

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], QoiError> {
        let mut out = [0u8; N];
        for byte in out.iter_mut() {
            *byte = self.read_u8()?;
        }
        Ok(out)
    }
}

/// Sequential byte output.
pub trait ByteSink {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), QoiError>;
}

impl<S: ByteSink + ?Sized> ByteSink for &mut S {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), QoiError> {
        (**self).write_all(bytes)
    }
}

impl ByteSink for Vec<u8> {
    #[inline]
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), QoiError> {
        self.extend_from_slice(bytes);
        Ok(())
    }
}

/// Cursor over an in-memory buffer.
#[derive(Clone, Debug)]
pub struct SliceReader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Bytes consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Bytes not yet consumed.
    pub fn remaining(&self) -> &'a [u8] {
        &self.data[self.pos..]
    }
}

impl ByteSource for SliceReader<'_> {
    #[inline]
    fn read_u8(&mut self) -> Result<u8, QoiError> {
        let byte = *self.data.get(self.pos).ok_or(QoiError::UnexpectedEof)?;
        self.pos += 1;
        Ok(byte)
    }

    #[inline]
    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], QoiError> {
        let bytes: [u8; N] = self
            .data
            .get(self.pos..self.pos + N)
            .and_then(|s| s.try_into().ok())
            .ok_or(QoiError::UnexpectedEof)?;
        self.pos += N;
        Ok(bytes)
    }
}

/// [`ByteSource`] over any [`std::io::Read`].
///
/// Reads are byte-granular; wrap unbuffered readers in a `BufReader`.
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoReader<R>(pub R);

#[cfg(feature = "std")]
impl<R: std::io::Read> ByteSource for IoReader<R> {
    fn read_u8(&mut self) -> Result<u8, QoiError> {
        let [byte] = self.read_array::<1>()?;
        Ok(byte)
    }

    fn read_array<const N: usize>(&mut self) -> Result<[u8; N], QoiError> {
        let mut out = [0u8; N];
        self.0.read_exact(&mut out)?;
        Ok(out)
    }
}

/// [`ByteSink`] over any [`std::io::Write`]. Write errors pass through as
/// [`QoiError::Io`].
#[cfg(feature = "std")]
#[derive(Debug)]
pub struct IoWriter<W>(pub W);

#[cfg(feature = "std")]
impl<W: std::io::Write> ByteSink for IoWriter<W> {
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), QoiError> {
        self.0.write_all(bytes).map_err(QoiError::Io)
    }
}
