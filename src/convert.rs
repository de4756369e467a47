//! Batch conversion passes over decoded sprites.
//!
//! Each `write_*` function produces one artifact class. Frame definitions are
//! fully encoded and packed in memory before the first file is touched, so a
//! failing cel never leaves a half-written page set behind.

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::color::ColorReducer;
use crate::error::ConvertError;
use crate::family::{families, skins, PatternSlots, Skin};
use crate::frame::{encode_cel, EncodeOptions, EncodedFrame};
use crate::models::{Sprite, Tileset};
use crate::output::{binary_filename, sanitize_identifier, symbol_name, write_file};
use crate::page::{FrameDef, Page, PagePacker};
use crate::patterns::{tile_definitions, tileset_patterns};
use crate::progress::{ArtifactKind, ProgressEvent, ProgressReporter};

/// Where and how frame definitions are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameOutput {
    /// Number of the first memory page
    pub start_page: u32,
    /// Directory for page descriptors
    pub asm_dir: PathBuf,
    /// Directory for binary payloads
    pub binary_dir: PathBuf,
    /// Reject relative tile offsets outside a signed byte
    pub validate_offsets: bool,
}

impl FrameOutput {
    pub fn new(asm_dir: impl Into<PathBuf>, binary_dir: impl Into<PathBuf>) -> Self {
        Self {
            start_page: 0,
            asm_dir: asm_dir.into(),
            binary_dir: binary_dir.into(),
            validate_offsets: true,
        }
    }

    pub fn with_start_page(mut self, start_page: u32) -> Self {
        self.start_page = start_page;
        self
    }

    pub fn with_validate_offsets(mut self, validate_offsets: bool) -> Self {
        self.validate_offsets = validate_offsets;
        self
    }
}

/// One encoded cel and the skin/frame it belongs to.
#[derive(Debug, Clone)]
pub struct SkinFrame<'a> {
    pub skin: Skin<'a>,
    pub frame_index: usize,
    pub encoded: EncodedFrame,
}

impl SkinFrame<'_> {
    /// Payload path of this frame inside `dir`.
    pub fn binary_path(&self, dir: &Path) -> PathBuf {
        let frame = (self.skin.layer.cels.len() > 1).then_some(self.frame_index);
        binary_filename(dir, self.skin.name(), frame)
    }
}

/// Encode every cel of every skin, skin by skin and frame by frame.
///
/// Pattern regions are assigned per family first, so the family-wide pattern
/// budget is checked before any cel is encoded.
pub fn encode_skins<'a>(
    sprites: &'a [Sprite],
    validate_offsets: bool,
    reducer: &dyn ColorReducer,
) -> Result<(PatternSlots, Vec<SkinFrame<'a>>), ConvertError> {
    let slots = PatternSlots::assign(&families(sprites))?;

    let mut frames = Vec::new();
    for skin in skins(sprites) {
        if skin.layer.cels.is_empty() {
            continue;
        }
        let tileset = skin.tileset()?;
        let options = EncodeOptions::new(reducer)
            .with_pattern_base(slots.base(skin.layer.family()))
            .with_validate_offsets(validate_offsets);

        for (frame_index, cel) in skin.layer.cels.iter().enumerate() {
            let encoded = encode_cel(cel, tileset, &options)
                .map_err(|e| ConvertError::in_cel(skin.name(), frame_index, e))?;
            debug!(
                skin = skin.name(),
                frame = frame_index,
                tiles = encoded.n_tiles,
                patterns = encoded.n_patterns,
                bytes = encoded.payload.len(),
                "encoded cel"
            );
            frames.push(SkinFrame { skin, frame_index, encoded });
        }
    }

    Ok((slots, frames))
}

/// Outcome of [`write_frame_definitions`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameSummary {
    pub frames: usize,
    /// Page numbers written, in order
    pub pages: Vec<u32>,
    /// Pattern slots used by all families
    pub patterns: usize,
}

/// Pack frames into pages without writing anything.
///
/// Returns the pages together with each frame's payload path and bytes.
///
/// # Errors
///
/// [`ConvertError::DuplicatePayload`] if two skins map to the same payload
/// file, plus [`ConvertError::FrameTooLarge`] from the packer.
pub fn pack_frames(
    frames: Vec<SkinFrame<'_>>,
    output: &FrameOutput,
) -> Result<(Vec<Page>, Vec<(PathBuf, Vec<u8>)>), ConvertError> {
    let mut packer = PagePacker::new(output.start_page);
    let mut payloads = Vec::with_capacity(frames.len());
    let mut owners: HashMap<PathBuf, &str> = HashMap::new();

    for frame in frames {
        let binary_path = frame.binary_path(&output.binary_dir);
        // Frames of one skin always get distinct paths, so a repeat means two skins collide
        if let Some(first) = owners.insert(binary_path.clone(), frame.skin.name()) {
            return Err(ConvertError::DuplicatePayload {
                path: binary_path,
                first: first.to_string(),
                second: frame.skin.name().to_string(),
            });
        }
        let encoded = frame.encoded;
        let def = FrameDef {
            n_tiles: encoded.n_tiles,
            n_patterns: encoded.n_patterns,
            offset_x: encoded.offset_x,
            offset_y: encoded.offset_y,
            symbol: symbol_name(&binary_path),
            binary_path: binary_path.clone(),
            binary_size: encoded.payload.len(),
        };
        let page = packer.add(def)?;
        debug!(path = %binary_path.display(), page, "assigned frame to page");
        payloads.push((binary_path, encoded.payload));
    }

    Ok((packer.into_pages(), payloads))
}

/// Encode, pack and write binary payloads plus one descriptor per page.
pub fn write_frame_definitions(
    sprites: &[Sprite],
    output: &FrameOutput,
    reducer: &dyn ColorReducer,
    progress: &dyn ProgressReporter,
) -> Result<FrameSummary, ConvertError> {
    let (slots, frames) = encode_skins(sprites, output.validate_offsets, reducer)?;
    let (pages, payloads) = pack_frames(frames, output)?;

    for (path, payload) in &payloads {
        write_file(path, payload)?;
        progress.report(ProgressEvent::ArtifactWritten {
            kind: ArtifactKind::FramePayload,
            path: path.clone(),
            bytes: payload.len(),
        });
    }

    for page in &pages {
        let path = page.filename(&output.asm_dir);
        write_file(&path, page.to_asm(&output.asm_dir).as_bytes())?;
        progress.report(ProgressEvent::PageWritten {
            page: page.number,
            frames: page.frames.len(),
            bytes: page.memory_usage(),
        });
    }

    Ok(FrameSummary {
        frames: payloads.len(),
        pages: pages.iter().map(|p| p.number).collect(),
        patterns: slots.total(),
    })
}

/// Tilesets referenced by layers, each once, in first-use order.
fn layer_tilesets(sprites: &[Sprite]) -> Vec<&Tileset> {
    let mut seen = HashSet::new();
    let mut tilesets = Vec::new();
    for (sprite_index, sprite) in sprites.iter().enumerate() {
        for layer in &sprite.layers {
            if let Some(index) = layer.tileset {
                if let Some(tileset) = sprite.tilesets.get(index) {
                    if seen.insert((sprite_index, index)) {
                        tilesets.push(tileset);
                    }
                }
            }
        }
    }
    tilesets
}

/// Write the 8-bit sprite patterns of every layer tileset into one file.
pub fn write_patterns(
    sprites: &[Sprite],
    path: &Path,
    reducer: &dyn ColorReducer,
    progress: &dyn ProgressReporter,
) -> Result<usize, ConvertError> {
    let mut buffer = Vec::new();
    for tileset in layer_tilesets(sprites) {
        buffer.extend(tileset_patterns(tileset, reducer)?);
    }

    write_file(path, &buffer)?;
    progress.report(ProgressEvent::ArtifactWritten {
        kind: ArtifactKind::Patterns,
        path: path.to_path_buf(),
        bytes: buffer.len(),
    });
    Ok(buffer.len())
}

/// Write the 4-bit definitions of every 8x8 indexed tileset into one file.
///
/// # Errors
///
/// [`ConvertError::MissingRequiredTileset`] if no input has such a tileset.
pub fn write_tile_definitions(
    sprites: &[Sprite],
    path: &Path,
    progress: &dyn ProgressReporter,
) -> Result<usize, ConvertError> {
    let tilesets: Vec<&Tileset> = sprites
        .iter()
        .flat_map(|s| s.tilesets.iter())
        .filter(|t| t.is_tile_definition_set())
        .collect();
    if tilesets.is_empty() {
        return Err(ConvertError::MissingRequiredTileset);
    }

    let mut buffer = Vec::new();
    for tileset in tilesets {
        buffer.extend(tile_definitions(tileset)?);
    }

    write_file(path, &buffer)?;
    progress.report(ProgressEvent::ArtifactWritten {
        kind: ArtifactKind::TileDefinitions,
        path: path.to_path_buf(),
        bytes: buffer.len(),
    });
    Ok(buffer.len())
}

/// Byte layout of palette files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaletteFormat {
    /// One reduced color byte per slot
    #[default]
    Reduced,
    /// Raw RGBA quad per slot
    Rgba,
}

impl std::str::FromStr for PaletteFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reduced" => Ok(PaletteFormat::Reduced),
            "rgba" => Ok(PaletteFormat::Rgba),
            other => Err(format!("unknown palette format '{}' (expected reduced or rgba)", other)),
        }
    }
}

/// Write `<dir>/<sprite>.pal` for every sprite that carries a palette.
///
/// Returns the paths written.
pub fn write_palettes(
    sprites: &[Sprite],
    dir: &Path,
    format: PaletteFormat,
    reducer: &dyn ColorReducer,
    progress: &dyn ProgressReporter,
) -> Result<Vec<PathBuf>, ConvertError> {
    let mut written = Vec::new();
    for sprite in sprites {
        let Some(palette) = &sprite.palette else {
            debug!(sprite = %sprite.name, "no palette");
            continue;
        };

        let bytes: Vec<u8> = match format {
            PaletteFormat::Reduced => palette.colors.iter().map(|c| reducer.reduce(*c)).collect(),
            PaletteFormat::Rgba => palette.colors.iter().flatten().copied().collect(),
        };

        let path = dir.join(format!("{}.pal", sanitize_identifier(&sprite.name)));
        write_file(&path, &bytes)?;
        progress.report(ProgressEvent::ArtifactWritten {
            kind: ArtifactKind::Palette,
            path: path.clone(),
            bytes: bytes.len(),
        });
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb332;
    use crate::error::CelError;
    use crate::models::{Cel, Layer, Palette, Tile, TileContent, TileRef};
    use crate::progress::NullProgress;
    use tempfile::TempDir;

    fn sprite_tileset(count: u32) -> Tileset {
        let mut tileset = Tileset::new(16, 16, true);
        for index in 0..count {
            tileset.tiles.push(Tile {
                tile_index: index,
                content: TileContent::Indexed(vec![index as u8; 256]),
            });
        }
        tileset
    }

    fn sprite(name: &str, layers: &[(&str, Vec<Cel>)]) -> Sprite {
        let mut sprite = Sprite::new(name, 32, 32);
        sprite.tilesets.push(sprite_tileset(4));
        for (layer, cels) in layers {
            sprite.layers.push(Layer { name: layer.to_string(), tileset: Some(0), cels: cels.clone() });
        }
        sprite
    }

    fn one_tile(tile: u32) -> Cel {
        Cel::new(1, 1).with_tile(TileRef::new(0, 0, tile))
    }

    #[test]
    fn test_binary_paths_follow_frame_count() {
        let sprites = vec![sprite("s", &[("ball", vec![one_tile(0)]), ("hero:red", vec![one_tile(0), one_tile(1)])])];
        let (_, frames) = encode_skins(&sprites, true, &Rgb332::default()).unwrap();
        let names: Vec<PathBuf> = frames.iter().map(|f| f.binary_path(Path::new("bin"))).collect();
        assert_eq!(
            names,
            vec![
                PathBuf::from("bin/sprites_ball.bin"),
                PathBuf::from("bin/sprites_hero_red_00.bin"),
                PathBuf::from("bin/sprites_hero_red_01.bin"),
            ]
        );
    }

    #[test]
    fn test_family_base_applied_to_patterns() {
        let two = Cel::new(2, 1).with_tile(TileRef::new(0, 0, 0)).with_tile(TileRef::new(1, 0, 1));
        let sprites = vec![sprite("s", &[("ball", vec![two]), ("hero", vec![one_tile(2)])])];
        let (slots, frames) = encode_skins(&sprites, true, &Rgb332::default()).unwrap();
        assert_eq!(slots.base("hero"), 2);
        // Anchor of the hero frame uses slot 2
        assert_eq!(frames[1].encoded.payload[3], 0xC2);
    }

    #[test]
    fn test_cel_error_carries_identity() {
        let empty = Cel::new(2, 2);
        let sprites = vec![sprite("s", &[("ball", vec![one_tile(0), empty])])];
        let err = encode_skins(&sprites, true, &Rgb332::default()).unwrap_err();
        match err {
            ConvertError::Cel { layer, frame, source } => {
                assert_eq!(layer, "ball");
                assert_eq!(frame, 1);
                assert_eq!(source, CelError::NoAnchorAvailable);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_write_frame_definitions() {
        let temp = TempDir::new().unwrap();
        let output = FrameOutput::new(temp.path().join("asm"), temp.path().join("assets")).with_start_page(30);
        let sprites = vec![sprite("s", &[("ball", vec![one_tile(0), one_tile(1)])])];

        let summary = write_frame_definitions(&sprites, &output, &Rgb332::default(), &NullProgress).unwrap();
        assert_eq!(summary.frames, 2);
        assert_eq!(summary.pages, vec![30]);
        assert_eq!(summary.patterns, 1);

        let payload = std::fs::read(temp.path().join("assets/sprites_ball_01.bin")).unwrap();
        assert_eq!(payload.len(), 5 + 256);
        let asm = std::fs::read_to_string(temp.path().join("asm/sprites_page_30.asm")).unwrap();
        assert!(asm.starts_with("\tSECTION PAGE_30\n\n\tPUBLIC _sprites_ball_00, _sprites_ball_01\n"));
        assert!(asm.contains("\tincbin \"../assets/sprites_ball_00.bin\""));
    }

    #[test]
    fn test_failed_frame_writes_nothing() {
        let temp = TempDir::new().unwrap();
        let output = FrameOutput::new(temp.path().join("asm"), temp.path().join("assets"));
        let sprites = vec![sprite("s", &[("ball", vec![one_tile(0), Cel::new(1, 1)])])];

        assert!(write_frame_definitions(&sprites, &output, &Rgb332::default(), &NullProgress).is_err());
        assert!(!temp.path().join("assets").exists());
        assert!(!temp.path().join("asm").exists());
    }

    #[test]
    fn test_colliding_skin_names_rejected() {
        let temp = TempDir::new().unwrap();
        let output = FrameOutput::new(temp.path().join("asm"), temp.path().join("assets"));
        let sprites = vec![sprite("s", &[("hero:red", vec![one_tile(0)]), ("hero-red", vec![one_tile(1)])])];

        match write_frame_definitions(&sprites, &output, &Rgb332::default(), &NullProgress) {
            Err(ConvertError::DuplicatePayload { first, second, .. }) => {
                assert_eq!(first, "hero:red");
                assert_eq!(second, "hero-red");
            }
            other => panic!("expected duplicate payload, got {:?}", other),
        }
        assert!(!temp.path().join("assets").exists());
    }

    #[test]
    fn test_missing_tileset_reported() {
        let mut sprite = Sprite::new("s", 16, 16);
        sprite.layers.push(Layer { name: "ball".to_string(), tileset: None, cels: vec![one_tile(0)] });
        let err = encode_skins(&[sprite], true, &Rgb332::default()).unwrap_err();
        assert!(matches!(err, ConvertError::MissingTileset { .. }));
    }

    #[test]
    fn test_write_patterns_dedupes_shared_tilesets() {
        let temp = TempDir::new().unwrap();
        let sprites = vec![sprite("s", &[("a", vec![]), ("b", vec![])])];
        let path = temp.path().join("sprites.spr");
        let bytes = write_patterns(&sprites, &path, &Rgb332::default(), &NullProgress).unwrap();
        assert_eq!(bytes, 4 * 256);
        assert_eq!(std::fs::read(&path).unwrap().len(), 1024);
    }

    #[test]
    fn test_write_tile_definitions() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("tiles.bin");
        let sprites = vec![sprite("s", &[])];
        assert!(matches!(
            write_tile_definitions(&sprites, &path, &NullProgress),
            Err(ConvertError::MissingRequiredTileset)
        ));

        let mut with_tiles = sprite("t", &[]);
        let mut tiles = Tileset::new(8, 8, true);
        tiles.tiles.push(Tile { tile_index: 0, content: TileContent::Indexed(vec![0x3; 64]) });
        with_tiles.tilesets.push(tiles);
        let bytes = write_tile_definitions(&[with_tiles], &path, &NullProgress).unwrap();
        assert_eq!(bytes, 32);
        assert!(std::fs::read(&path).unwrap().iter().all(|&b| b == 0x33));
    }

    #[test]
    fn test_write_palettes() {
        let temp = TempDir::new().unwrap();
        let mut with_palette = sprite("hero-1", &[]);
        with_palette.palette = Some(Palette::new(vec![[255, 0, 0, 255], [0, 0, 0, 0]]));
        let sprites = vec![with_palette, sprite("plain", &[])];

        let written =
            write_palettes(&sprites, temp.path(), PaletteFormat::Reduced, &Rgb332::default(), &NullProgress)
                .unwrap();
        assert_eq!(written, vec![temp.path().join("hero_1.pal")]);
        assert_eq!(std::fs::read(&written[0]).unwrap(), vec![0xE0, 227]);

        let written =
            write_palettes(&sprites, temp.path(), PaletteFormat::Rgba, &Rgb332::default(), &NullProgress).unwrap();
        assert_eq!(std::fs::read(&written[0]).unwrap(), vec![255, 0, 0, 255, 0, 0, 0, 0]);
    }

    #[test]
    fn test_palette_format_from_str() {
        assert_eq!("rgba".parse::<PaletteFormat>(), Ok(PaletteFormat::Rgba));
        assert!("png".parse::<PaletteFormat>().is_err());
    }
}
