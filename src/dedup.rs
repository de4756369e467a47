//! Pattern deduplication and anchor-relative remapping.

use std::collections::HashMap;

use crate::models::{Cel, TileRef};

/// A cel's tiles rewritten relative to its anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemappedCel {
    /// Unique tile identities in compact-index order; slot 0 is the anchor's
    pub unique_tiles: Vec<u32>,
    /// Original tile identity to compact index
    pub index_map: HashMap<u32, u32>,
    /// Remapped tiles: the anchor first at `(0, 0)`, then the rest in raster order.
    /// `tile` holds the compact index.
    pub tiles: Vec<TileRef>,
}

impl RemappedCel {
    /// The anchor's remapped reference.
    pub fn anchor(&self) -> &TileRef {
        &self.tiles[0]
    }

    /// Non-anchor tiles in raster order.
    pub fn others(&self) -> &[TileRef] {
        &self.tiles[1..]
    }

    /// Number of unique patterns.
    pub fn pattern_count(&self) -> usize {
        self.unique_tiles.len()
    }
}

/// Collapse repeated patterns and translate positions so the anchor sits at the origin.
///
/// The anchor's tile always takes compact index 0; other tiles get the next
/// free index the first time they are seen in raster order. `anchor` must be
/// one of the cel's tiles (see [`crate::anchor::resolve_anchor`]) and no two
/// tiles may share a cell (see [`crate::frame::check_bounds`]).
pub fn dedupe_and_remap(cel: &Cel, anchor: &TileRef) -> RemappedCel {
    let ordered = cel.raster_order();

    let mut unique_tiles = vec![anchor.tile];
    let mut index_map = HashMap::from([(anchor.tile, 0u32)]);
    for tile_ref in &ordered {
        index_map.entry(tile_ref.tile).or_insert_with(|| {
            unique_tiles.push(tile_ref.tile);
            (unique_tiles.len() - 1) as u32
        });
    }

    let remap = |t: &TileRef| TileRef {
        x: t.x - anchor.x,
        y: t.y - anchor.y,
        tile: index_map[&t.tile],
        ..*t
    };

    let mut tiles = Vec::with_capacity(ordered.len());
    tiles.push(remap(anchor));
    tiles.extend(ordered.iter().filter(|t| (t.x, t.y) != (anchor.x, anchor.y)).map(remap));

    RemappedCel { unique_tiles, index_map, tiles }
}
