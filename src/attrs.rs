//! Hardware sprite attribute records.
//!
//! Each tile of a unified sprite becomes a 5-byte record:
//!
//! | Byte | Anchor | Relative tile |
//! |------|--------|---------------|
//! | 0 | X low 8 bits | signed X offset |
//! | 1 | Y low 8 bits | signed Y offset |
//! | 2 | `PPPP XYR` + X bit 8 | `PPPP XYR` + 1 (relative palette) |
//! | 3 | `11` + pattern (6 bits) | `11` + pattern (6 bits) |
//! | 4 | `0 0 1 0000` + Y bit 8 (composite anchor) | `0 1 0 0000 0` (no collision) |

use tracing::debug;

use crate::dedup::RemappedCel;
use crate::models::TileRef;

/// Bytes per attribute record.
pub const ATTR_SIZE: usize = 5;

/// Pixels per tile along each axis.
pub const TILE_PIXELS: i32 = 16;

const ROTATE: u8 = 0x02;
const Y_MIRROR: u8 = 0x04;
const X_MIRROR: u8 = 0x08;
const VISIBLE_WITH_ATTR4: u8 = 0xC0;
const PATTERN_MASK: u32 = 0x3F;
const COMPOSITE_ANCHOR: u8 = 0x20;
const NO_COLLISION: u8 = 0x40;

/// Palette offset written into attribute 2. All tiles share one palette for now.
const PALETTE_INDEX: u8 = 0;

/// One encoded attribute record.
pub type AttrRecord = [u8; ATTR_SIZE];

/// Encode one tile's attribute record.
///
/// `tile_ref.x`/`y` are grid units relative to the anchor (or absolute for
/// the anchor itself); `tile_ref.tile` is the pattern index already offset
/// into pattern memory. Out-of-range coordinates wrap; callers validate with
/// [`relative_offset_fits`].
pub fn encode_attrs(tile_ref: &TileRef, is_anchor: bool) -> AttrRecord {
    let x = tile_ref.x * TILE_PIXELS;
    let y = tile_ref.y * TILE_PIXELS;

    let flags = (if tile_ref.rotation { ROTATE } else { 0 })
        | (if tile_ref.y_flip { Y_MIRROR } else { 0 })
        | (if tile_ref.x_flip { X_MIRROR } else { 0 });

    // X MSB for the anchor, relative palette for the others
    let attr2_bit0 = if is_anchor { ((x & 0x100) >> 8) as u8 } else { 1 };
    let attr2 = (PALETTE_INDEX << 4) | flags | attr2_bit0;

    let attr3 = (tile_ref.tile & PATTERN_MASK) as u8 | VISIBLE_WITH_ATTR4;

    // Y MSB for the anchor; bits 1-4 are the scale, always 1x
    let attr4 = if is_anchor { ((y & 0x100) >> 8) as u8 | COMPOSITE_ANCHOR } else { NO_COLLISION };

    // `as u8` keeps the low byte: unsigned for the anchor, two's complement otherwise
    [x as u8, y as u8, attr2, attr3, attr4]
}

/// Whether a relative tile position fits the signed byte offset in pixels.
pub fn relative_offset_fits(tile_ref: &TileRef) -> bool {
    let range = i8::MIN as i32..=i8::MAX as i32;
    range.contains(&(tile_ref.x * TILE_PIXELS)) && range.contains(&(tile_ref.y * TILE_PIXELS))
}

/// Encode every tile of a remapped cel, anchor first.
///
/// `pattern_base` is added to each compact pattern index, placing the frame's
/// patterns at the slot reserved for its family.
pub fn cel_attrs(remapped: &RemappedCel, pattern_base: u32) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(remapped.tiles.len() * ATTR_SIZE);

    for (position, tile_ref) in remapped.tiles.iter().enumerate() {
        let is_anchor = position == 0;
        let placed = TileRef { tile: tile_ref.tile + pattern_base, ..*tile_ref };
        debug!(
            x = placed.x,
            y = placed.y,
            pattern = placed.tile,
            x_flip = placed.x_flip,
            y_flip = placed.y_flip,
            rotation = placed.rotation,
            anchor = is_anchor,
            "sprite attribute"
        );
        buffer.extend_from_slice(&encode_attrs(&placed, is_anchor));
    }

    buffer
}
