//! Sprite, layer and cel types.

use serde::{Deserialize, Serialize};

use super::palette::Palette;
use super::tileset::Tileset;

/// Placement of one tile at a grid cell of a cel.
///
/// `x` and `y` are tile-grid units. The orientation flags map directly onto
/// the hardware mirror/rotate bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TileRef {
    /// Grid column
    pub x: i32,
    /// Grid row
    pub y: i32,
    /// Tile identity (`tileIndex`) inside the layer's tileset
    pub tile: u32,
    /// Horizontal mirror
    #[serde(default)]
    pub x_flip: bool,
    /// Vertical mirror
    #[serde(default)]
    pub y_flip: bool,
    /// 90 degree clockwise rotation
    #[serde(default)]
    pub rotation: bool,
}

impl TileRef {
    /// Create an unflipped tile reference.
    pub fn new(x: i32, y: i32, tile: u32) -> Self {
        Self { x, y, tile, x_flip: false, y_flip: false, rotation: false }
    }

    /// Set the orientation flags.
    pub fn with_flags(mut self, x_flip: bool, y_flip: bool, rotation: bool) -> Self {
        self.x_flip = x_flip;
        self.y_flip = y_flip;
        self.rotation = rotation;
        self
    }
}

/// One frame's instance of one layer.
///
/// The tilemap is sparse: empty grid cells have no entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cel {
    /// Grid width in tiles
    pub width: u32,
    /// Grid height in tiles
    pub height: u32,
    /// Pixel offset inside the canvas
    #[serde(default)]
    pub x_pos: i32,
    #[serde(default)]
    pub y_pos: i32,
    /// Size of the canvas the cel is composited onto
    #[serde(default)]
    pub canvas_width: u32,
    #[serde(default)]
    pub canvas_height: u32,
    /// Populated cells in raster order
    #[serde(default)]
    pub tilemap: Vec<TileRef>,
}

impl Cel {
    /// Create an empty cel of the given grid size.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            x_pos: 0,
            y_pos: 0,
            canvas_width: width * 16,
            canvas_height: height * 16,
            tilemap: Vec::new(),
        }
    }

    /// Add a tile reference, returning the cel for chaining.
    pub fn with_tile(mut self, tile_ref: TileRef) -> Self {
        self.tilemap.push(tile_ref);
        self
    }

    /// Number of populated cells.
    pub fn tile_count(&self) -> usize {
        self.tilemap.len()
    }

    /// Tile references sorted into raster (row-major) order.
    ///
    /// Loaders normally produce raster order already; this makes the order a
    /// guarantee for callers that depend on it.
    pub fn raster_order(&self) -> Vec<TileRef> {
        let mut tiles = self.tilemap.clone();
        tiles.sort_by_key(|t| (t.y, t.x));
        tiles
    }
}

/// Animation frame shared by all layers of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Frame duration in milliseconds
    #[serde(default = "default_duration")]
    pub duration: u32,
}

fn default_duration() -> u32 {
    100
}

impl Default for Frame {
    fn default() -> Self {
        Self { duration: default_duration() }
    }
}

/// A skin of a sprite family: one cel per animation frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    /// Index into [`Sprite::tilesets`]
    #[serde(default)]
    pub tileset: Option<usize>,
    #[serde(default)]
    pub cels: Vec<Cel>,
}

impl Layer {
    /// Family this skin belongs to: the name up to the first `:`.
    pub fn family(&self) -> &str {
        match self.name.find(':') {
            Some(index) => &self.name[..index],
            None => &self.name,
        }
    }
}

/// A decoded animation asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprite {
    /// Defaults to the input file stem when empty
    #[serde(default)]
    pub name: String,
    /// Canvas width in pixels
    #[serde(default)]
    pub width: u32,
    /// Canvas height in pixels
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub palette: Option<Palette>,
    #[serde(default)]
    pub tilesets: Vec<Tileset>,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub frames: Vec<Frame>,
}

impl Sprite {
    /// Create an empty sprite.
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
            palette: None,
            tilesets: Vec::new(),
            layers: Vec::new(),
            frames: Vec::new(),
        }
    }

    /// Tileset used by a layer, if any.
    pub fn layer_tileset(&self, layer: &Layer) -> Option<&Tileset> {
        layer.tileset.and_then(|index| self.tilesets.get(index))
    }
}
