//! Anchor tile selection.
//!
//! The hardware stores the anchor's position as an absolute coordinate and
//! every other tile as a signed byte offset from it. Relative coordinates
//! range from -128 to 127 pixels, so for wide cels the anchor must sit close
//! enough to the right/bottom edge:
//!
//! ```text
//!  0  1  2  3  4  5  6  7  8  9 10 11 12 13 14 15
//!                          A
//! -8 -7 -6 -5 -4 -3 -2 -1 -0 +1 +2 +3 +4 +5 +6 +7
//! ```

use crate::error::CelError;
use crate::models::{Cel, TileRef};

/// Largest grid dimension, in tiles, that a unified sprite supports.
pub const MAX_GRID: u32 = 16;

/// Pick the anchor tile of a cel.
///
/// Returns the first populated tile in raster order with
/// `x >= max(0, width - 8)` and `y >= max(0, height - 8)`.
///
/// # Errors
///
/// * [`CelError::OversizedTilemap`] if either grid dimension exceeds 16
/// * [`CelError::NoAnchorAvailable`] if no populated tile qualifies
pub fn resolve_anchor(cel: &Cel) -> Result<TileRef, CelError> {
    if cel.width > MAX_GRID || cel.height > MAX_GRID {
        return Err(CelError::OversizedTilemap { width: cel.width, height: cel.height });
    }

    let min_x = cel.width.saturating_sub(8) as i32;
    let min_y = cel.height.saturating_sub(8) as i32;

    cel.tilemap
        .iter()
        .filter(|t| t.x >= min_x && t.y >= min_y)
        .min_by_key(|t| (t.y, t.x))
        .copied()
        .ok_or(CelError::NoAnchorAvailable)
}
