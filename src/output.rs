//! Output file naming and writing

use std::fs;
use std::path::{Component, Path, PathBuf};

use tracing::info;

use crate::error::ConvertError;

/// Replace every character outside `[A-Za-z0-9_]` with `_`.
pub fn sanitize_identifier(name: &str) -> String {
    name.chars().map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' }).collect()
}

/// File name without directory or extension.
pub fn file_stem(path: &Path) -> String {
    path.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Generate the binary payload path for one frame of a skin.
///
/// | Scenario | Output |
/// |----------|--------|
/// | Skin with several frames | `dir/sprites_{skin}_{nn}.bin` |
/// | Skin with a single frame | `dir/sprites_{skin}.bin` |
///
/// The skin name is sanitized; the frame index is zero-padded to two digits.
pub fn binary_filename(dir: &Path, skin: &str, frame: Option<usize>) -> PathBuf {
    let skin = sanitize_identifier(skin);
    match frame {
        Some(index) => dir.join(format!("sprites_{}_{:02}.bin", skin, index)),
        None => dir.join(format!("sprites_{}.bin", skin)),
    }
}

/// Generate the descriptor path of a memory page: `dir/sprites_page_{nn}.asm`.
pub fn page_filename(dir: &Path, page: u32) -> PathBuf {
    dir.join(format!("sprites_page_{:02}.asm", page))
}

/// Linker symbol for a payload file: `_` followed by the sanitized file stem.
pub fn symbol_name(binary: &Path) -> String {
    format!("_{}", sanitize_identifier(&file_stem(binary)))
}

/// Absolute, lexically normalized form of a path.
fn normalize(path: &Path) -> PathBuf {
    let absolute = std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf());
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Path of `target` relative to the directory `base`, using `/` separators.
///
/// The result always starts with `.` (`./file.bin`, `../assets/file.bin`),
/// which assemblers need to treat it as a relative include.
pub fn relative_path(base: &Path, target: &Path) -> String {
    let base = normalize(base);
    let target = normalize(target);

    let base_parts: Vec<Component> = base.components().collect();
    let target_parts: Vec<Component> = target.components().collect();
    let common = base_parts.iter().zip(&target_parts).take_while(|(a, b)| a == b).count();

    let mut parts: Vec<String> = vec!["..".to_string(); base_parts.len() - common];
    parts.extend(target_parts[common..].iter().map(|c| c.as_os_str().to_string_lossy().into_owned()));

    let joined = parts.join("/");
    if joined.starts_with('.') {
        joined
    } else {
        format!("./{}", joined)
    }
}

/// Write a complete file, creating parent directories as needed.
pub fn write_file(path: &Path, contents: &[u8]) -> Result<(), ConvertError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent).map_err(|e| ConvertError::io(parent, e))?;
        }
    }

    fs::write(path, contents).map_err(|e| ConvertError::io(path, e))?;
    info!(path = %path.display(), bytes = contents.len(), "wrote file");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_sanitize_identifier() {
        assert_eq!(sanitize_identifier("hero:red-2"), "hero_red_2");
        assert_eq!(sanitize_identifier("ok_name9"), "ok_name9");
        assert_eq!(sanitize_identifier("a b.c"), "a_b_c");
    }

    #[test]
    fn test_binary_filename() {
        let dir = Path::new("assets");
        assert_eq!(
            binary_filename(dir, "hero:red", Some(3)),
            PathBuf::from("assets/sprites_hero_red_03.bin")
        );
        assert_eq!(binary_filename(dir, "ball", None), PathBuf::from("assets/sprites_ball.bin"));
        assert_eq!(
            binary_filename(dir, "ball", Some(12)),
            PathBuf::from("assets/sprites_ball_12.bin")
        );
    }

    #[test]
    fn test_page_filename() {
        assert_eq!(page_filename(Path::new("asm"), 7), PathBuf::from("asm/sprites_page_07.asm"));
        assert_eq!(
            page_filename(Path::new("asm"), 120),
            PathBuf::from("asm/sprites_page_120.asm")
        );
    }

    #[test]
    fn test_symbol_name() {
        assert_eq!(symbol_name(Path::new("out/sprites_hero_01.bin")), "_sprites_hero_01");
        assert_eq!(symbol_name(Path::new("a.b/x-y.bin")), "_x_y");
    }

    #[test]
    fn test_relative_path_sibling_dirs() {
        assert_eq!(
            relative_path(Path::new("build/asm"), Path::new("build/assets/a.bin")),
            "../assets/a.bin"
        );
    }

    #[test]
    fn test_relative_path_same_dir() {
        assert_eq!(relative_path(Path::new("build"), Path::new("build/a.bin")), "./a.bin");
    }

    #[test]
    fn test_relative_path_subdir() {
        assert_eq!(relative_path(Path::new("build"), Path::new("build/bin/a.bin")), "./bin/a.bin");
    }

    #[test]
    fn test_relative_path_normalizes_dots() {
        assert_eq!(
            relative_path(Path::new("build/./asm/../asm"), Path::new("build/x/../a.bin")),
            "../a.bin"
        );
    }

    #[test]
    fn test_write_file_creates_parent_dirs() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested").join("deep").join("out.bin");

        write_file(&path, &[1, 2, 3]).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), vec![1, 2, 3]);
    }
}
