//! Sprite slot metadata emitted as C source.
//!
//! The generated file declares one `SpriteSlot` per requested family, one
//! `SpriteDef` table per family and the attribute bytes of every frame. The
//! `SpriteSlot`/`SpriteDef` types come from the engine's `sprite_slots.h`.

use std::fmt::Write;
use std::path::Path;

use crate::asm::format_byte;
use crate::attrs::ATTR_SIZE;
use crate::color::ColorReducer;
use crate::convert::{encode_skins, SkinFrame};
use crate::error::ConvertError;
use crate::family::{families, Family};
use crate::models::Sprite;
use crate::output::{sanitize_identifier, write_file};
use crate::progress::{ArtifactKind, ProgressEvent, ProgressReporter};

/// Name of the `SpriteDef` table of a family.
pub fn sprite_def_label(family: &str) -> String {
    format!("sprite_def_{}", sanitize_identifier(family))
}

/// Name of the attribute array of one frame of a skin.
pub fn frame_label(skin: &str, frame: usize) -> String {
    sanitize_identifier(&format!("{}_{}", skin, frame))
}

fn frames_of<'a, 'b>(family: &'b Family<'a>, frames: &'b [SkinFrame<'a>]) -> impl Iterator<Item = &'b SkinFrame<'a>> {
    frames.iter().filter(move |f| family.skins.iter().any(|s| std::ptr::eq(s.layer, f.skin.layer)))
}

/// Render the metadata source for the given slot list.
///
/// # Errors
///
/// [`ConvertError::UnknownSlot`] if a slot names no family of the inputs, plus
/// any error raised while encoding frames.
pub fn render_metadata(
    sprites: &[Sprite],
    slots: &[String],
    validate_offsets: bool,
    reducer: &dyn ColorReducer,
) -> Result<String, ConvertError> {
    let families = families(sprites);
    let (patterns, frames) = encode_skins(sprites, validate_offsets, reducer)?;

    let mut out = String::new();
    out.push_str("// **** File generated by ase2next ***\n");
    out.push_str("// **** Do not edit ***\n\n");
    out.push_str("#include \"sprite_slots.h\"\n\n");
    out.push_str("SpriteSlot spriteSlots[] = {\n");

    let mut attr_index = 0;
    for slot in slots {
        let family = families
            .iter()
            .find(|f| &f.name == slot)
            .ok_or_else(|| ConvertError::UnknownSlot { slot: slot.clone() })?;
        let max_tiles = family.max_tiles();
        let _ = writeln!(out, "\t//{}", slot);
        let _ = writeln!(
            out,
            "\t{{ 0, {}, {}, {}, {}, {}, &{}}},",
            attr_index,
            max_tiles,
            patterns.base(&family.name),
            family.frame_count(),
            family.skins.len(),
            sprite_def_label(&family.name)
        );
        attr_index += max_tiles;
    }
    out.push_str("};\n\n");

    for family in &families {
        let _ = writeln!(out, "SpriteDef {}[] = {{", sprite_def_label(&family.name));
        for skin in &family.skins {
            let _ = writeln!(out, "\t// {}", skin.name());
            for frame in frames.iter().filter(|f| std::ptr::eq(f.skin.layer, skin.layer)) {
                let _ = writeln!(
                    out,
                    "\t{{{}, {}, {}, {}}},",
                    frame.encoded.n_tiles,
                    frame.encoded.offset_x,
                    frame.encoded.offset_y,
                    frame_label(skin.name(), frame.frame_index)
                );
            }
        }
        out.push_str("};\n\n");
    }

    for family in &families {
        for frame in frames_of(family, &frames) {
            let attrs = &frame.encoded.payload[..frame.encoded.attrs_len];
            let _ = writeln!(out, "uint8_t {}[] = {{ ", frame_label(frame.skin.name(), frame.frame_index));
            for record in attrs.chunks(ATTR_SIZE) {
                out.push('\t');
                for byte in record {
                    let _ = write!(out, "{}, ", format_byte(*byte));
                }
                out.push('\n');
            }
            out.push_str("};\n\n");
        }
    }

    Ok(out)
}

/// Render and write the metadata source to `path`.
pub fn write_metadata(
    sprites: &[Sprite],
    slots: &[String],
    path: &Path,
    validate_offsets: bool,
    reducer: &dyn ColorReducer,
    progress: &dyn ProgressReporter,
) -> Result<(), ConvertError> {
    let source = render_metadata(sprites, slots, validate_offsets, reducer)?;
    write_file(path, source.as_bytes())?;
    progress.report(ProgressEvent::ArtifactWritten {
        kind: ArtifactKind::Metadata,
        path: path.to_path_buf(),
        bytes: source.len(),
    });
    Ok(())
}
