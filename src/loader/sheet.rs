//! PNG sprite sheet loader.
//!
//! Slices an image into square tiles and builds a single-layer, single-frame
//! sprite whose cel covers the whole image. Identical tiles share one
//! tileset entry; fully transparent tiles become empty cells.

use std::collections::HashMap;
use std::path::Path;

use image::RgbaImage;

use super::{default_name, has_extension, LoadError, SpriteLoader};
use crate::models::{Cel, Frame, Layer, Sprite, Tile, TileContent, TileRef, Tileset};

/// Reads PNG sprite sheets.
#[derive(Debug, Clone, Copy)]
pub struct SheetLoader {
    /// Tile edge in pixels
    pub tile_size: u32,
}

impl Default for SheetLoader {
    fn default() -> Self {
        Self { tile_size: 16 }
    }
}

impl SheetLoader {
    /// Slice a decoded image into a sprite named `name`.
    pub fn from_image(&self, name: &str, image: &RgbaImage) -> Result<Sprite, String> {
        let size = self.tile_size;
        let (width, height) = image.dimensions();
        if size == 0 || width % size != 0 || height % size != 0 {
            return Err(format!("{}x{} is not a multiple of the {}px tile size", width, height, size));
        }

        let mut tileset = Tileset::new(size, size, false);
        let mut known: HashMap<Vec<[u8; 4]>, u32> = HashMap::new();
        let mut cel = Cel::new(width / size, height / size);
        cel.canvas_width = width;
        cel.canvas_height = height;

        for y in 0..height / size {
            for x in 0..width / size {
                let mut pixels = Vec::with_capacity((size * size) as usize);
                for py in 0..size {
                    for px in 0..size {
                        pixels.push(image.get_pixel(x * size + px, y * size + py).0);
                    }
                }
                if pixels.iter().all(|p| p[3] == 0) {
                    continue;
                }

                let next = tileset.tiles.len() as u32;
                let tile_index = *known.entry(pixels.clone()).or_insert_with(|| {
                    tileset.tiles.push(Tile { tile_index: next, content: TileContent::Rgba(pixels) });
                    next
                });
                cel.tilemap.push(TileRef::new(x as i32, y as i32, tile_index));
            }
        }

        let mut sprite = Sprite::new(name, width, height);
        sprite.tilesets.push(tileset);
        sprite.layers.push(Layer { name: name.to_string(), tileset: Some(0), cels: vec![cel] });
        sprite.frames.push(Frame::default());
        Ok(sprite)
    }
}

impl SpriteLoader for SheetLoader {
    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &["png"])
    }

    fn load(&self, path: &Path) -> Result<Sprite, LoadError> {
        let image = image::open(path)
            .map_err(|source| LoadError::Image { path: path.to_path_buf(), source })?
            .to_rgba8();
        self.from_image(&default_name(path), &image)
            .map_err(|message| LoadError::InvalidSheet { path: path.to_path_buf(), message })
    }
}
