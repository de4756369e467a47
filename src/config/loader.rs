//! Configuration loading and discovery for `ase2next.toml`
//!
//! Provides functions to find, load, and merge configuration.

use super::schema::Ase2NextConfig;
use crate::convert::PaletteFormat;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the configuration file.
pub const CONFIG_FILE: &str = "ase2next.toml";

/// Configuration loading error
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// File I/O error
    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error
    #[error("Failed to parse ase2next.toml: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error
    #[error("Config validation failed:\n{}", .0.iter().map(|e| format!("  - {}", e)).collect::<Vec<_>>().join("\n"))]
    Validation(Vec<String>),
}

/// CLI arguments that can override config values
#[derive(Debug, Default, Clone)]
pub struct CliOverrides {
    /// Override output directory
    pub out: Option<PathBuf>,
    /// Override first page number
    pub start_page: Option<u32>,
    /// Override page descriptor directory
    pub asm_dir: Option<PathBuf>,
    /// Override payload directory
    pub binary_dir: Option<PathBuf>,
    /// Override offset validation
    pub validate_offsets: Option<bool>,
    /// Override transparent color index
    pub transparent_index: Option<u8>,
    /// Override slot list
    pub slots: Option<Vec<String>>,
    /// Override pattern bank file
    pub patterns_output: Option<PathBuf>,
    /// Override tile definition file
    pub tiles_output: Option<PathBuf>,
    /// Override palette directory
    pub palette_dir: Option<PathBuf>,
    /// Override palette layout
    pub palette_format: Option<PaletteFormat>,
    /// Override metadata source file
    pub metadata_output: Option<PathBuf>,
    /// Override Layer 2 bank prefix
    pub layer2_prefix: Option<PathBuf>,
}

/// Find ase2next.toml by walking up from the current working directory.
///
/// # Returns
/// - `Some(path)` if a config file is found
/// - `None` if no config file is found
pub fn find_config() -> Option<PathBuf> {
    env::current_dir().ok().and_then(find_config_from)
}

/// Find ase2next.toml by walking up from a specific directory.
pub fn find_config_from(start: PathBuf) -> Option<PathBuf> {
    let mut current = start;

    loop {
        let config_path = current.join(CONFIG_FILE);
        if config_path.exists() {
            return Some(config_path);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Load configuration from an ase2next.toml file.
///
/// If a path is provided, loads from that file. Otherwise, uses `find_config()`
/// to locate the config file. If no config file is found, returns the default
/// configuration.
///
/// # Example
/// ```ignore
/// let config = load_config(None)?;
/// let config = load_config(Some(Path::new("game/ase2next.toml")))?;
/// ```
pub fn load_config(path: Option<&Path>) -> Result<Ase2NextConfig, ConfigError> {
    let config_path = match path {
        Some(p) => Some(p.to_path_buf()),
        None => find_config(),
    };

    match config_path {
        Some(p) => load_config_file(&p),
        None => Ok(default_config()),
    }
}

/// Load configuration from a specific file path.
fn load_config_file(path: &Path) -> Result<Ase2NextConfig, ConfigError> {
    let contents = fs::read_to_string(path)?;
    let mut config: Ase2NextConfig = toml::from_str(&contents)?;

    let errors = config.validate();
    if !errors.is_empty() {
        return Err(ConfigError::Validation(errors.into_iter().map(|e| e.to_string()).collect()));
    }

    // Relative output paths are anchored at the config file's directory
    if let Some(root) = project_root(path) {
        config.project.out = resolve_path(root, &config.project.out);
    }
    tracing::debug!(path = %path.display(), "loaded config");
    Ok(config)
}

/// Configuration used when no ase2next.toml is found.
///
/// The project name is the current directory name.
pub fn default_config() -> Ase2NextConfig {
    let mut config = Ase2NextConfig::default();
    if let Some(name) = env::current_dir().ok().and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned())) {
        config.project.name = name;
    }
    config
}

/// Merge CLI overrides into a configuration.
///
/// CLI arguments take precedence over config file values.
pub fn merge_cli_overrides(config: &mut Ase2NextConfig, overrides: &CliOverrides) {
    if let Some(ref out) = overrides.out {
        config.project.out = out.clone();
    }
    if let Some(start_page) = overrides.start_page {
        config.frames.start_page = start_page;
    }
    if let Some(ref asm_dir) = overrides.asm_dir {
        config.frames.asm_dir = asm_dir.clone();
    }
    if let Some(ref binary_dir) = overrides.binary_dir {
        config.frames.binary_dir = binary_dir.clone();
    }
    if let Some(validate_offsets) = overrides.validate_offsets {
        config.frames.validate_offsets = validate_offsets;
    }
    if let Some(transparent_index) = overrides.transparent_index {
        config.colors.transparent_index = transparent_index;
    }
    if let Some(ref slots) = overrides.slots {
        config.metadata.slots = slots.clone();
    }
    if let Some(ref output) = overrides.patterns_output {
        config.patterns.output = output.clone();
    }
    if let Some(ref output) = overrides.tiles_output {
        config.tiles.output = output.clone();
    }
    if let Some(ref dir) = overrides.palette_dir {
        config.palette.dir = dir.clone();
    }
    if let Some(format) = overrides.palette_format {
        config.palette.format = format;
    }
    if let Some(ref output) = overrides.metadata_output {
        config.metadata.output = output.clone();
    }
    if let Some(ref prefix) = overrides.layer2_prefix {
        config.layer2.prefix = prefix.clone();
    }
}

/// Get the project root directory from a config file path.
pub fn project_root(config_path: &Path) -> Option<&Path> {
    config_path.parent()
}

/// Resolve a path relative to the project root.
///
/// If the path is absolute, returns it unchanged.
/// If relative, joins it with the project root.
pub fn resolve_path(project_root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        project_root.join(path)
    }
}
