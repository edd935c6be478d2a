use alloc::string::String;
use enough::StopReason;

/// Errors from QOI decoding and encoding.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum QoiError {
    #[error("invalid header: {0}")]
    InvalidHeader(#[from] HeaderError),

    #[error("invalid chunk data: {0}")]
    InvalidData(String),

    #[error("unexpected end of input")]
    UnexpectedEof,

    #[error("image bounds mismatch: expected {expected:?}, got {actual:?}")]
    BoundsMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    #[error("dimensions too large: {width}x{height}")]
    DimensionsTooLarge { width: u32, height: u32 },

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("buffer too small: need {needed} bytes, got {actual}")]
    BufferTooSmall { needed: usize, actual: usize },

    #[error("operation cancelled")]
    Cancelled(StopReason),

    #[cfg(feature = "std")]
    #[error("I/O error: {0}")]
    Io(std::io::Error),
}

/// Why a 14-byte header was rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum HeaderError {
    #[error("bad magic bytes {found:02x?}, expected \"qoif\"")]
    BadMagic { found: [u8; 4] },

    #[error("unsupported channel count {0}")]
    BadChannels(u8),

    #[error("unsupported colorspace {0}, expected 0 or 1")]
    BadColorspace(u8),
}

impl From<StopReason> for QoiError {
    fn from(r: StopReason) -> Self {
        QoiError::Cancelled(r)
    }
}

#[cfg(feature = "std")]
impl From<std::io::Error> for QoiError {
    fn from(e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::UnexpectedEof {
            QoiError::UnexpectedEof
        } else {
            QoiError::Io(e)
        }
    }
}
