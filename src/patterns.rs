//! Pattern serialization: 8-bit sprite patterns and 4-bit tile definitions.

use crate::color::ColorReducer;
use crate::error::{CelError, ConvertError};
use crate::models::{Tile, TileContent, Tileset};

/// Append one tile's pixels as reduced color bytes.
fn push_tile(buffer: &mut Vec<u8>, tile: &Tile, reducer: &dyn ColorReducer) {
    match &tile.content {
        TileContent::Rgba(pixels) => buffer.extend(pixels.iter().map(|p| reducer.reduce(*p))),
        TileContent::Indexed(pixels) => buffer.extend_from_slice(pixels),
    }
}

/// Fail unless a tile has exactly `expected` pixels.
fn check_tile_size(tile: &Tile, expected: usize) -> Result<(), CelError> {
    if tile.content.len() != expected {
        return Err(CelError::TileSizeMismatch { tile: tile.tile_index, actual: tile.content.len(), expected });
    }
    Ok(())
}

fn tileset_tile_size(tile: &Tile, expected: usize) -> Result<(), ConvertError> {
    if tile.content.len() != expected {
        return Err(ConvertError::TileSizeMismatch { tile: tile.tile_index, actual: tile.content.len(), expected });
    }
    Ok(())
}

/// Serialize the unique patterns of a frame, one byte per pixel.
///
/// Tiles are written in `unique_tiles` order, so slot 0 is the anchor's
/// pattern.
///
/// # Errors
///
/// [`CelError::MissingTile`] if an identity is not in the tileset and
/// [`CelError::TileSizeMismatch`] if a tile's pixel count is wrong.
pub fn pack_patterns(
    unique_tiles: &[u32],
    tileset: &Tileset,
    reducer: &dyn ColorReducer,
) -> Result<Vec<u8>, CelError> {
    let tile_size = tileset.tile_size();
    let mut buffer = Vec::with_capacity(unique_tiles.len() * tile_size);

    for &tile_index in unique_tiles {
        let tile = tileset.tile(tile_index).ok_or(CelError::MissingTile { tile: tile_index })?;
        check_tile_size(tile, tile_size)?;
        push_tile(&mut buffer, tile, reducer);
    }

    Ok(buffer)
}

/// Serialize every tile of a 16x16 tileset as 8-bit sprite patterns.
///
/// Every tile must hold exactly 256 pixels.
pub fn tileset_patterns(tileset: &Tileset, reducer: &dyn ColorReducer) -> Result<Vec<u8>, ConvertError> {
    if tileset.width != 16 || tileset.height != 16 {
        return Err(ConvertError::UnsupportedTileSize {
            width: tileset.width,
            height: tileset.height,
            expected: "16x16",
        });
    }

    let mut buffer = Vec::with_capacity(tileset.tiles.len() * tileset.tile_size());
    for tile in &tileset.tiles {
        tileset_tile_size(tile, tileset.tile_size())?;
        push_tile(&mut buffer, tile, reducer);
    }
    Ok(buffer)
}

/// Serialize an 8x8 indexed tileset as 4-bit tile definitions.
///
/// Two pixels per byte, high nibble first. Indices are masked to 4 bits.
/// Every tile must hold exactly 64 pixels.
pub fn tile_definitions(tileset: &Tileset) -> Result<Vec<u8>, ConvertError> {
    if !tileset.is_tile_definition_set() {
        return Err(ConvertError::UnsupportedTileSize {
            width: tileset.width,
            height: tileset.height,
            expected: "8x8 indexed",
        });
    }

    let mut buffer = Vec::with_capacity(tileset.tiles.len() * tileset.tile_size() / 2);
    for tile in &tileset.tiles {
        let TileContent::Indexed(pixels) = &tile.content else {
            return Err(ConvertError::UnsupportedTileSize {
                width: tileset.width,
                height: tileset.height,
                expected: "8x8 indexed",
            });
        };
        tileset_tile_size(tile, tileset.tile_size())?;
        buffer.extend(pixels.chunks(2).map(|pair| {
            let hi = pair[0] & 0x0F;
            let lo = pair.get(1).map_or(0, |p| p & 0x0F);
            (hi << 4) | lo
        }));
    }
    Ok(buffer)
}
