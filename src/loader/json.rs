//! JSON object model loader.

use std::fs;
use std::path::Path;

use super::{default_name, has_extension, LoadError, SpriteLoader};
use crate::models::{Frame, Sprite};

/// Reads a [`Sprite`] serialized as JSON.
///
/// ```json
/// {
///   "name": "hero",
///   "tilesets": [{"width": 16, "height": 16, "tiles": [{"tileIndex": 0, "content": {"indexed": [...]}}]}],
///   "layers": [{"name": "hero:red", "tileset": 0, "cels": [{"width": 1, "height": 1, "tilemap": [{"x": 0, "y": 0, "tile": 0}]}]}]
/// }
/// ```
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLoader;

impl SpriteLoader for JsonLoader {
    fn accepts(&self, path: &Path) -> bool {
        has_extension(path, &["json"])
    }

    fn load(&self, path: &Path) -> Result<Sprite, LoadError> {
        let text = fs::read_to_string(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        let mut sprite: Sprite =
            serde_json::from_str(&text).map_err(|source| LoadError::Json { path: path.to_path_buf(), source })?;

        if sprite.name.is_empty() {
            sprite.name = default_name(path);
        }
        // Cels without a canvas size use the sprite's, then their own grid
        let (width, height) = (sprite.width, sprite.height);
        for cel in sprite.layers.iter_mut().flat_map(|l| l.cels.iter_mut()) {
            if cel.canvas_width == 0 {
                cel.canvas_width = if width > 0 { width } else { cel.width * 16 };
            }
            if cel.canvas_height == 0 {
                cel.canvas_height = if height > 0 { height } else { cel.height * 16 };
            }
        }
        // Frames default to one per cel of the longest layer
        if sprite.frames.is_empty() {
            let count = sprite.layers.iter().map(|l| l.cels.len()).max().unwrap_or(0);
            sprite.frames = vec![Frame::default(); count];
        }
        Ok(sprite)
    }
}
