use crate::error::QoiError;
use crate::pixel::RGBA_BYTES;

/// Resource limits applied when decoding.
///
/// All fields default to `None` (no limit).
#[derive(Clone, Debug, Default)]
pub struct Limits {
    pub max_width: Option<u64>,
    pub max_height: Option<u64>,
    /// Maximum pixel count (width * height).
    pub max_pixels: Option<u64>,
    /// Maximum size of the decoded RGBA buffer, in bytes.
    pub max_memory_bytes: Option<u64>,
}

impl Limits {
    /// Validate header dimensions and return the RGBA output size in bytes.
    ///
    /// Runs before any pixel buffer is allocated.
    pub(crate) fn check_image(&self, width: u32, height: u32) -> Result<usize, QoiError> {
        check_one("width", u64::from(width), self.max_width)?;
        check_one("height", u64::from(height), self.max_height)?;
        check_one(
            "pixel count",
            u64::from(width) * u64::from(height),
            self.max_pixels,
        )?;

        let out_bytes = output_bytes(width, height)?;
        check_one("allocation", out_bytes as u64, self.max_memory_bytes)?;
        Ok(out_bytes)
    }
}

/// `width * height * 4`, or `DimensionsTooLarge` if that overflows `usize`.
pub(crate) fn output_bytes(width: u32, height: u32) -> Result<usize, QoiError> {
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|px| px.checked_mul(RGBA_BYTES))
        .ok_or(QoiError::DimensionsTooLarge { width, height })
}

fn check_one(what: &str, value: u64, limit: Option<u64>) -> Result<(), QoiError> {
    match limit {
        Some(max) if value > max => Err(QoiError::LimitExceeded(alloc::format!(
            "{what} {value} exceeds limit {max}"
        ))),
        _ => Ok(()),
    }
}
