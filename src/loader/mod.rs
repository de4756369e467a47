//! Input loaders producing the decoded sprite object model.
//!
//! Each loader handles one file format behind the [`SpriteLoader`] trait.
//! [`load_inputs`] expands directories, picks a loader per file and returns
//! the sprites in a stable order.

mod json;
mod sheet;

pub use json::JsonLoader;
pub use sheet::SheetLoader;

use std::path::{Path, PathBuf};

use glob::glob;
use thiserror::Error;
use tracing::debug;

use crate::models::Sprite;

/// Error raised while loading an input file.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    /// File I/O error
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Malformed JSON object model
    #[error("Invalid sprite JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// Image decoding error
    #[error("Failed to decode image {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    /// Image cannot be sliced into tiles
    #[error("Invalid sprite sheet {path}: {message}")]
    InvalidSheet { path: PathBuf, message: String },
    /// No loader accepts the file
    #[error("Unsupported input file: {0}")]
    Unsupported(PathBuf),
    /// Directory search pattern could not be built
    #[error("Invalid search pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
}

/// A reader of one input format.
pub trait SpriteLoader {
    /// Whether this loader handles `path` (by extension).
    fn accepts(&self, path: &Path) -> bool;

    /// Decode `path` into a sprite.
    fn load(&self, path: &Path) -> Result<Sprite, LoadError>;
}

/// File stem used as the default sprite name.
pub(crate) fn default_name(path: &Path) -> String {
    crate::output::file_stem(path)
}

/// Check a path's extension case-insensitively.
pub(crate) fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| extensions.iter().any(|x| e.eq_ignore_ascii_case(x)))
}

/// The built-in loaders, tried in order.
pub fn default_loaders() -> Vec<Box<dyn SpriteLoader>> {
    vec![Box::new(JsonLoader), Box::new(SheetLoader::default())]
}

/// Expand inputs: files are kept, directories are searched recursively for
/// files any loader accepts (sorted by path).
pub fn discover_inputs(inputs: &[PathBuf], loaders: &[Box<dyn SpriteLoader>]) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for input in inputs {
        if !input.is_dir() {
            files.push(input.clone());
            continue;
        }

        let pattern = format!("{}/**/*", input.display());
        let paths = glob(&pattern).map_err(|source| LoadError::Pattern { pattern: pattern.clone(), source })?;
        let mut found: Vec<PathBuf> = paths
            .filter_map(Result::ok)
            .filter(|p| p.is_file() && loaders.iter().any(|l| l.accepts(p)))
            .collect();
        found.sort();
        debug!(dir = %input.display(), files = found.len(), "discovered inputs");
        files.extend(found);
    }
    Ok(files)
}

/// Load one file with the first loader that accepts it.
pub fn load_file(path: &Path, loaders: &[Box<dyn SpriteLoader>]) -> Result<Sprite, LoadError> {
    let loader = loaders
        .iter()
        .find(|l| l.accepts(path))
        .ok_or_else(|| LoadError::Unsupported(path.to_path_buf()))?;
    let sprite = loader.load(path)?;
    debug!(
        path = %path.display(),
        sprite = %sprite.name,
        layers = sprite.layers.len(),
        "loaded sprite"
    );
    Ok(sprite)
}

/// Discover and load every input with the built-in loaders.
pub fn load_inputs(inputs: &[PathBuf]) -> Result<Vec<Sprite>, LoadError> {
    let loaders = default_loaders();
    discover_inputs(inputs, &loaders)?.iter().map(|path| load_file(path, &loaders)).collect()
}
