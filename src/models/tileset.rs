//! Tileset and tile pattern types.

use serde::{Deserialize, Serialize};

/// Pixel content of a tile.
///
/// Serialized as `{"rgba": [[r, g, b, a], ...]}` or `{"indexed": [i, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TileContent {
    /// Raw RGBA pixels, reduced through a color reducer on output
    Rgba(Vec<[u8; 4]>),
    /// Palette indices, written through unchanged
    Indexed(Vec<u8>),
}

impl TileContent {
    /// Number of pixels.
    pub fn len(&self) -> usize {
        match self {
            TileContent::Rgba(pixels) => pixels.len(),
            TileContent::Indexed(pixels) => pixels.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether every pixel is fully transparent (RGBA content only).
    pub fn is_transparent(&self) -> bool {
        match self {
            TileContent::Rgba(pixels) => pixels.iter().all(|p| p[3] == 0),
            TileContent::Indexed(_) => false,
        }
    }
}

/// An immutable pattern owned by a tileset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tile {
    /// Identity, unique within the tileset
    pub tile_index: u32,
    pub content: TileContent,
}

/// A set of equally sized tiles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tileset {
    /// Tile width in pixels
    pub width: u32,
    /// Tile height in pixels
    pub height: u32,
    #[serde(default)]
    pub indexed_color: bool,
    #[serde(default)]
    pub tiles: Vec<Tile>,
}

impl Tileset {
    /// Create an empty tileset.
    pub fn new(width: u32, height: u32, indexed_color: bool) -> Self {
        Self { width, height, indexed_color, tiles: Vec::new() }
    }

    /// Look up a tile by identity.
    ///
    /// Tiles are normally stored at the position matching their index, so
    /// that slot is tried before scanning.
    pub fn tile(&self, tile_index: u32) -> Option<&Tile> {
        match self.tiles.get(tile_index as usize) {
            Some(tile) if tile.tile_index == tile_index => Some(tile),
            _ => self.tiles.iter().find(|t| t.tile_index == tile_index),
        }
    }

    /// Pixels per tile.
    pub fn tile_size(&self) -> usize {
        (self.width * self.height) as usize
    }

    /// Whether this is an 8x8 indexed tileset usable for 4-bit tile definitions.
    pub fn is_tile_definition_set(&self) -> bool {
        self.indexed_color && self.width == 8 && self.height == 8
    }
}
