//! Layer 2 bitmap export.
//!
//! Composites one cel onto an 8-bit canvas (one reduced color per pixel,
//! row-major) and splits it into the 16 KiB banks the Layer 2 screen is
//! paged in.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::color::ColorReducer;
use crate::error::{CelError, ConvertError};
use crate::models::{Cel, Sprite, TileContent, TileRef, Tileset};
use crate::output::write_file;
use crate::progress::{ArtifactKind, ProgressEvent, ProgressReporter};

/// Size of one Layer 2 bank in bytes.
pub const BANK_SIZE: usize = 16384;

/// Source pixel for destination `(dx, dy)` of an `n`-pixel square tile.
///
/// Rotation is applied before the mirrors, as the sprite hardware does.
fn source_pixel(tile_ref: &TileRef, n: usize, dx: usize, dy: usize) -> (usize, usize) {
    let dx = if tile_ref.x_flip { n - 1 - dx } else { dx };
    let dy = if tile_ref.y_flip { n - 1 - dy } else { dy };
    if tile_ref.rotation {
        (dy, n - 1 - dx)
    } else {
        (dx, dy)
    }
}

/// Render a cel onto its canvas.
///
/// Tiles must be square. Empty cells and pixels outside the canvas keep the
/// reducer's transparent color.
pub fn render_cel(cel: &Cel, tileset: &Tileset, reducer: &dyn ColorReducer) -> Result<Vec<u8>, CelError> {
    let n = tileset.width as usize;
    let (width, height) = (cel.canvas_width as i64, cel.canvas_height as i64);
    let mut canvas = vec![reducer.reduce([0, 0, 0, 0]); (width * height) as usize];

    for tile_ref in &cel.tilemap {
        let tile = tileset.tile(tile_ref.tile).ok_or(CelError::MissingTile { tile: tile_ref.tile })?;
        if tile.content.len() != n * n {
            return Err(CelError::TileSizeMismatch {
                tile: tile_ref.tile,
                actual: tile.content.len(),
                expected: n * n,
            });
        }

        let origin_x = cel.x_pos as i64 + tile_ref.x as i64 * n as i64;
        let origin_y = cel.y_pos as i64 + tile_ref.y as i64 * n as i64;
        for dy in 0..n {
            for dx in 0..n {
                let (x, y) = (origin_x + dx as i64, origin_y + dy as i64);
                if x < 0 || y < 0 || x >= width || y >= height {
                    continue;
                }
                let (sx, sy) = source_pixel(tile_ref, n, dx, dy);
                let color = match &tile.content {
                    TileContent::Rgba(pixels) => reducer.reduce(pixels[sx + sy * n]),
                    TileContent::Indexed(pixels) => pixels[sx + sy * n],
                };
                canvas[(x + y * width) as usize] = color;
            }
        }
    }

    Ok(canvas)
}

/// Path of bank `bank`: the prefix with the bank number appended.
pub fn bank_filename(prefix: &Path, bank: usize) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(bank.to_string());
    PathBuf::from(name)
}

/// Render the first cel of the first layer and write it as numbered banks.
///
/// # Errors
///
/// [`ConvertError::EmptySprite`] if the sprite has no cel.
pub fn write_layer2(
    sprite: &Sprite,
    prefix: &Path,
    reducer: &dyn ColorReducer,
    progress: &dyn ProgressReporter,
) -> Result<Vec<PathBuf>, ConvertError> {
    let layer = sprite.layers.first().ok_or_else(|| ConvertError::EmptySprite { sprite: sprite.name.clone() })?;
    let cel = layer.cels.first().ok_or_else(|| ConvertError::EmptySprite { sprite: sprite.name.clone() })?;
    let tileset = sprite
        .layer_tileset(layer)
        .ok_or_else(|| ConvertError::MissingTileset { layer: layer.name.clone() })?;

    let bitmap = render_cel(cel, tileset, reducer).map_err(|e| ConvertError::in_cel(&layer.name, 0, e))?;
    let mut written = Vec::new();
    for (bank, chunk) in bitmap.chunks(BANK_SIZE).enumerate() {
        let path = bank_filename(prefix, bank);
        write_file(&path, chunk)?;
        progress.report(ProgressEvent::ArtifactWritten {
            kind: ArtifactKind::Layer2Bank,
            path: path.clone(),
            bytes: chunk.len(),
        });
        written.push(path);
    }
    Ok(written)
}
