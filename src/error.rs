//! Error types for cel encoding and batch conversion

use std::path::PathBuf;
use thiserror::Error;

/// Highest pattern slot the attribute record can address (6 bits).
pub const MAX_PATTERNS: usize = 64;

/// Error raised while encoding a single cel.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[non_exhaustive]
pub enum CelError {
    /// Grid is larger than the 16x16 the anchor scheme supports
    #[error("Tilemap {width}x{height} is too large to be converted to a unified sprite (max 16x16)")]
    OversizedTilemap { width: u32, height: u32 },
    /// No populated tile can act as anchor
    #[error("No anchor available: no populated tile in the bottom-right anchor region")]
    NoAnchorAvailable,
    /// Tile position lies outside the cel grid
    #[error("Tile at ({x}, {y}) lies outside the {width}x{height} grid")]
    TileOutOfBounds { x: i32, y: i32, width: u32, height: u32 },
    /// Two tile references occupy the same grid cell
    #[error("More than one tile at ({x}, {y})")]
    DuplicateCell { x: i32, y: i32 },
    /// A relative tile offset does not fit a signed byte
    #[error("Relative offset ({x}, {y}) pixels does not fit in [-128, 127]")]
    OffsetOutOfRange { x: i32, y: i32 },
    /// Frame references more patterns than the attribute can index
    #[error("Too many patterns in frame: {count} (max {limit})")]
    TooManyPatterns { count: usize, limit: usize },
    /// Tile identity missing from the layer's tileset
    #[error("Tile {tile} is not present in the tileset")]
    MissingTile { tile: u32 },
    /// Tile pixel count does not match the tileset dimensions
    #[error("Tile {tile} has {actual} pixels, expected {expected}")]
    TileSizeMismatch { tile: u32, actual: usize, expected: usize },
}

/// Error raised by a conversion pass over a batch of sprites.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// A cel failed to encode; carries the layer and frame identity
    #[error("Layer '{layer}' frame {frame}: {source}")]
    Cel {
        layer: String,
        frame: usize,
        #[source]
        source: CelError,
    },
    /// Family-wide pattern budget exceeded
    #[error("Too many patterns: {count} (max {limit})")]
    TooManyPatterns { count: usize, limit: usize },
    /// No 8x8 indexed tileset is available for tile definitions
    #[error("No 8x8 indexed color tilesets found")]
    MissingRequiredTileset,
    /// A tilemap layer has no tileset attached
    #[error("Layer '{layer}' has no tileset")]
    MissingTileset { layer: String },
    /// Tileset dimensions are not supported by the requested output
    #[error("Unsupported {width}x{height} tileset: {expected} required")]
    UnsupportedTileSize { width: u32, height: u32, expected: &'static str },
    /// A tileset tile has the wrong number of pixels
    #[error("Tile {tile} has {actual} pixels, expected {expected}")]
    TileSizeMismatch { tile: u32, actual: usize, expected: usize },
    /// Two skins map to the same payload file
    #[error("Skins '{first}' and '{second}' both write {path}")]
    DuplicatePayload { path: PathBuf, first: String, second: String },
    /// A single frame payload can never fit a memory page
    #[error("Frame '{symbol}' needs {size} bytes, exceeding the {capacity}-byte page")]
    FrameTooLarge { symbol: String, size: usize, capacity: usize },
    /// Slot list names a family that no input provides
    #[error("Unknown sprite slot '{slot}'")]
    UnknownSlot { slot: String },
    /// Layer 2 output requires at least one cel
    #[error("Sprite '{sprite}' has no cel to render")]
    EmptySprite { sprite: String },
    /// File I/O failure
    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl ConvertError {
    /// Attach layer/frame identity to a cel error.
    pub fn in_cel(layer: &str, frame: usize, source: CelError) -> Self {
        ConvertError::Cel { layer: layer.to_string(), frame, source }
    }

    /// Attach the path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ConvertError::Io { path: path.into(), source }
    }
}
