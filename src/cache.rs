use crate::pixel::Pixel;

/// Number of slots in the history cache.
pub const CACHE_SLOTS: usize = 64;

/// Direct-mapped table of recently seen pixels, indexed by [`Pixel::hash`].
///
/// Fixed at 64 slots. A pixel whose hash collides with an occupied slot
/// replaces it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryCache {
    slots: [Pixel; CACHE_SLOTS],
}

impl Default for HistoryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryCache {
    /// All slots start as `(0, 0, 0, 0)`.
    pub const fn new() -> Self {
        Self {
            slots: [Pixel::ZERO; CACHE_SLOTS],
        }
    }

    /// Pixel stored at `index`. Only the low 6 bits are used.
    #[inline]
    pub fn get(&self, index: u8) -> Pixel {
        self.slots[usize::from(index & 0x3F)]
    }

    /// Store `px` in the slot for `px.hash()`.
    #[inline]
    pub fn insert(&mut self, px: Pixel) {
        self.slots[usize::from(px.hash())] = px;
    }

    pub fn slots(&self) -> &[Pixel; CACHE_SLOTS] {
        &self.slots
    }
}
