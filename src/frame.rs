//! Frame payload encoding: attribute records followed by pattern data.

use std::collections::HashSet;

use crate::anchor::resolve_anchor;
use crate::attrs::{cel_attrs, relative_offset_fits, TILE_PIXELS};
use crate::color::ColorReducer;
use crate::dedup::dedupe_and_remap;
use crate::error::{CelError, MAX_PATTERNS};
use crate::models::{Cel, Tileset};
use crate::patterns::pack_patterns;

/// A cel encoded into its binary payload plus the metadata of its frame record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedFrame {
    /// Attribute records (5 bytes per tile) followed by the patterns
    pub payload: Vec<u8>,
    /// Bytes of the payload taken by attribute records
    pub attrs_len: usize,
    pub n_tiles: usize,
    pub n_patterns: usize,
    /// Anchor position relative to the bottom-centre of the cel, in pixels
    pub offset_x: i32,
    pub offset_y: i32,
}

/// Options for [`encode_cel`].
#[derive(Clone, Copy)]
pub struct EncodeOptions<'a> {
    /// Added to every compact pattern index
    pub pattern_base: u32,
    /// Reject relative offsets outside a signed byte instead of wrapping
    pub validate_offsets: bool,
    pub reducer: &'a dyn ColorReducer,
}

impl<'a> EncodeOptions<'a> {
    pub fn new(reducer: &'a dyn ColorReducer) -> Self {
        Self { pattern_base: 0, validate_offsets: true, reducer }
    }

    pub fn with_pattern_base(mut self, pattern_base: u32) -> Self {
        self.pattern_base = pattern_base;
        self
    }

    pub fn with_validate_offsets(mut self, validate_offsets: bool) -> Self {
        self.validate_offsets = validate_offsets;
        self
    }
}

/// Anchor offset from the bottom-centre of the cel, in pixels.
pub fn cel_offset(cel: &Cel, anchor_x: i32, anchor_y: i32) -> (i32, i32) {
    let half_width = cel.width as i32 * TILE_PIXELS / 2;
    (anchor_x * TILE_PIXELS - half_width, (anchor_y - cel.height as i32) * TILE_PIXELS)
}

/// Check that every tile lies inside the cel grid, at most one per cell.
pub fn check_bounds(cel: &Cel) -> Result<(), CelError> {
    let (width, height) = (cel.width as i32, cel.height as i32);
    if let Some(t) = cel.tilemap.iter().find(|t| t.x < 0 || t.y < 0 || t.x >= width || t.y >= height) {
        return Err(CelError::TileOutOfBounds { x: t.x, y: t.y, width: cel.width, height: cel.height });
    }

    let mut occupied = HashSet::with_capacity(cel.tilemap.len());
    match cel.tilemap.iter().find(|t| !occupied.insert((t.x, t.y))) {
        Some(t) => Err(CelError::DuplicateCell { x: t.x, y: t.y }),
        None => Ok(()),
    }
}

/// Encode one cel into its frame payload.
///
/// Nothing is produced unless every check passes: grid bounds, anchor
/// selection, the 64-pattern limit and (optionally) relative offset range.
pub fn encode_cel(cel: &Cel, tileset: &Tileset, options: &EncodeOptions) -> Result<EncodedFrame, CelError> {
    check_bounds(cel)?;
    let anchor = resolve_anchor(cel)?;
    let remapped = dedupe_and_remap(cel, &anchor);

    let n_patterns = remapped.pattern_count();
    if options.pattern_base as usize + n_patterns > MAX_PATTERNS {
        return Err(CelError::TooManyPatterns {
            count: options.pattern_base as usize + n_patterns,
            limit: MAX_PATTERNS,
        });
    }

    if options.validate_offsets {
        if let Some(t) = remapped.others().iter().find(|t| !relative_offset_fits(t)) {
            return Err(CelError::OffsetOutOfRange { x: t.x * TILE_PIXELS, y: t.y * TILE_PIXELS });
        }
    }

    let mut payload = cel_attrs(&remapped, options.pattern_base);
    let attrs_len = payload.len();
    payload.extend(pack_patterns(&remapped.unique_tiles, tileset, options.reducer)?);

    let (offset_x, offset_y) = cel_offset(cel, anchor.x, anchor.y);

    Ok(EncodedFrame {
        payload,
        attrs_len,
        n_tiles: remapped.tiles.len(),
        n_patterns,
        offset_x,
        offset_y,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb332;
    use crate::models::{Tile, TileContent, TileRef};

    fn tileset(count: u32) -> Tileset {
        let mut tileset = Tileset::new(16, 16, true);
        for index in 0..count {
            tileset.tiles.push(Tile {
                tile_index: index,
                content: TileContent::Indexed(vec![index as u8; 256]),
            });
        }
        tileset
    }

    #[test]
    fn test_single_tile_frame() {
        let reducer = Rgb332::default();
        let cel = Cel::new(1, 1).with_tile(TileRef::new(0, 0, 2));
        let frame = encode_cel(&cel, &tileset(4), &EncodeOptions::new(&reducer)).unwrap();

        assert_eq!(frame.n_tiles, 1);
        assert_eq!(frame.n_patterns, 1);
        assert_eq!(frame.attrs_len, 5);
        assert_eq!(&frame.payload[..5], &[0, 0, 0x00, 0xC0, 0x20]);
        assert_eq!(frame.payload.len(), 5 + 256);
        assert!(frame.payload[5..].iter().all(|&b| b == 2));
        assert_eq!((frame.offset_x, frame.offset_y), (-8, -16));
    }

    #[test]
    fn test_scenario_payload() {
        let reducer = Rgb332::default();
        let cel = Cel::new(2, 2).with_tile(TileRef::new(0, 0, 5)).with_tile(TileRef::new(1, 1, 9));
        let frame = encode_cel(&cel, &tileset(10), &EncodeOptions::new(&reducer)).unwrap();

        assert_eq!(&frame.payload[..10], &[0, 0, 0x00, 0xC0, 0x20, 16, 16, 0x01, 0xC1, 0x40]);
        assert_eq!(frame.payload[10], 5);
        assert_eq!(frame.payload[10 + 256], 9);
        assert_eq!((frame.offset_x, frame.offset_y), (-16, -32));
    }

    #[test]
    fn test_offset_overflow_detected() {
        // 16 wide, anchor lands at x = 15 and the x = 0 tile is 240 px away
        let reducer = Rgb332::default();
        let cel = Cel::new(16, 1).with_tile(TileRef::new(0, 0, 0)).with_tile(TileRef::new(15, 0, 1));
        let err = encode_cel(&cel, &tileset(2), &EncodeOptions::new(&reducer)).unwrap_err();
        assert_eq!(err, CelError::OffsetOutOfRange { x: -240, y: 0 });
    }

    #[test]
    fn test_offset_overflow_wraps_when_unvalidated() {
        let reducer = Rgb332::default();
        let cel = Cel::new(16, 1).with_tile(TileRef::new(0, 0, 0)).with_tile(TileRef::new(15, 0, 1));
        let options = EncodeOptions::new(&reducer).with_validate_offsets(false);
        let frame = encode_cel(&cel, &tileset(2), &options).unwrap();
        assert_eq!(frame.payload[5], (-240i32) as u8);
    }

    #[test]
    fn test_out_of_bounds_tile() {
        let reducer = Rgb332::default();
        let cel = Cel::new(2, 2).with_tile(TileRef::new(2, 0, 0));
        assert_eq!(
            encode_cel(&cel, &tileset(1), &EncodeOptions::new(&reducer)),
            Err(CelError::TileOutOfBounds { x: 2, y: 0, width: 2, height: 2 })
        );
    }

    #[test]
    fn test_stacked_tiles_rejected() {
        let reducer = Rgb332::default();
        let cel = Cel::new(2, 1)
            .with_tile(TileRef::new(1, 0, 0))
            .with_tile(TileRef::new(0, 0, 1))
            .with_tile(TileRef::new(1, 0, 1));
        assert_eq!(
            encode_cel(&cel, &tileset(2), &EncodeOptions::new(&reducer)),
            Err(CelError::DuplicateCell { x: 1, y: 0 })
        );
    }

    #[test]
    fn test_pattern_base_budget() {
        let reducer = Rgb332::default();
        let cel = Cel::new(2, 1).with_tile(TileRef::new(0, 0, 0)).with_tile(TileRef::new(1, 0, 1));
        let options = EncodeOptions::new(&reducer).with_pattern_base(63);
        assert_eq!(
            encode_cel(&cel, &tileset(2), &options),
            Err(CelError::TooManyPatterns { count: 65, limit: 64 })
        );
    }

    #[test]
    fn test_cel_offset_wide() {
        let cel = Cel::new(16, 16);
        assert_eq!(cel_offset(&cel, 8, 8), (0, -128));
        assert_eq!(cel_offset(&cel, 15, 15), (112, -16));
    }
}
