//! Color reduction from RGBA to single-byte hardware colors
//!
//! The reducer is a strategy object passed by the caller. [`Rgb332`] is the
//! default: it maps to the 256-color RRRGGGBB cube and reserves one index for
//! transparent pixels.

/// Transparent index used by the sprite hardware after reset (0xE3).
pub const DEFAULT_TRANSPARENT_INDEX: u8 = 227;

/// Maps one RGBA pixel to a hardware color byte.
pub trait ColorReducer {
    fn reduce(&self, rgba: [u8; 4]) -> u8;
}

impl<F> ColorReducer for F
where
    F: Fn([u8; 4]) -> u8,
{
    fn reduce(&self, rgba: [u8; 4]) -> u8 {
        self(rgba)
    }
}

/// RRRGGGBB color cube reducer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rgb332 {
    /// Index written for pixels with zero alpha
    pub transparent_index: u8,
}

impl Rgb332 {
    pub fn new(transparent_index: u8) -> Self {
        Self { transparent_index }
    }
}

impl Default for Rgb332 {
    fn default() -> Self {
        Self::new(DEFAULT_TRANSPARENT_INDEX)
    }
}

impl ColorReducer for Rgb332 {
    fn reduce(&self, rgba: [u8; 4]) -> u8 {
        let [r, g, b, a] = rgba;
        if a == 0 {
            return self.transparent_index;
        }
        (r & 0b1110_0000) | ((g & 0b1110_0000) >> 3) | ((b & 0b1100_0000) >> 6)
    }
}
