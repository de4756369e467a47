//! Configuration schema types for `ase2next.toml`
//!
//! Defines the structure and validation rules for conversion settings.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::convert::PaletteFormat;

/// Project metadata section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Project name
    #[serde(default = "default_name")]
    pub name: String,
    /// Base output directory; relative artifact paths resolve against it
    #[serde(default = "default_out")]
    pub out: PathBuf,
}

fn default_name() -> String {
    "sprites".to_string()
}

fn default_out() -> PathBuf {
    PathBuf::from("build")
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self { name: default_name(), out: default_out() }
    }
}

/// Frame definition output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FramesConfig {
    /// Number of the first memory page
    #[serde(default)]
    pub start_page: u32,
    /// Directory for page descriptors
    #[serde(default = "default_asm_dir")]
    pub asm_dir: PathBuf,
    /// Directory for binary payloads
    #[serde(default = "default_binary_dir")]
    pub binary_dir: PathBuf,
    /// Reject relative tile offsets that do not fit a signed byte
    #[serde(default = "default_true")]
    pub validate_offsets: bool,
}

fn default_asm_dir() -> PathBuf {
    PathBuf::from("asm")
}

fn default_binary_dir() -> PathBuf {
    PathBuf::from("assets")
}

fn default_true() -> bool {
    true
}

impl Default for FramesConfig {
    fn default() -> Self {
        Self {
            start_page: 0,
            asm_dir: default_asm_dir(),
            binary_dir: default_binary_dir(),
            validate_offsets: true,
        }
    }
}

/// Color reduction settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColorsConfig {
    /// Palette index written for fully transparent pixels
    #[serde(default = "default_transparent_index")]
    pub transparent_index: u8,
}

fn default_transparent_index() -> u8 {
    crate::color::DEFAULT_TRANSPARENT_INDEX
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self { transparent_index: default_transparent_index() }
    }
}

/// Whole-tileset sprite pattern output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PatternsConfig {
    #[serde(default = "default_patterns_output")]
    pub output: PathBuf,
}

fn default_patterns_output() -> PathBuf {
    PathBuf::from("sprites.spr")
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self { output: default_patterns_output() }
    }
}

/// 4-bit tile definition output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TilesConfig {
    #[serde(default = "default_tiles_output")]
    pub output: PathBuf,
}

fn default_tiles_output() -> PathBuf {
    PathBuf::from("tiles.til")
}

impl Default for TilesConfig {
    fn default() -> Self {
        Self { output: default_tiles_output() }
    }
}

/// Palette output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaletteConfig {
    #[serde(default = "default_palette_dir")]
    pub dir: PathBuf,
    #[serde(default)]
    pub format: PaletteFormat,
}

fn default_palette_dir() -> PathBuf {
    PathBuf::from("palettes")
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self { dir: default_palette_dir(), format: PaletteFormat::default() }
    }
}

/// Sprite slot metadata output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataConfig {
    #[serde(default = "default_metadata_output")]
    pub output: PathBuf,
    /// Family names in hardware slot order
    #[serde(default)]
    pub slots: Vec<String>,
}

fn default_metadata_output() -> PathBuf {
    PathBuf::from("sprite_slots.c")
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self { output: default_metadata_output(), slots: Vec::new() }
    }
}

/// Layer 2 bitmap output
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Layer2Config {
    /// Bank files are named `<prefix><bank>`
    #[serde(default = "default_layer2_prefix")]
    pub prefix: PathBuf,
}

fn default_layer2_prefix() -> PathBuf {
    PathBuf::from("layer2_")
}

impl Default for Layer2Config {
    fn default() -> Self {
        Self { prefix: default_layer2_prefix() }
    }
}

/// Complete `ase2next.toml` configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Ase2NextConfig {
    #[serde(default)]
    pub project: ProjectConfig,
    #[serde(default)]
    pub frames: FramesConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
    #[serde(default)]
    pub patterns: PatternsConfig,
    #[serde(default)]
    pub tiles: TilesConfig,
    #[serde(default)]
    pub palette: PaletteConfig,
    #[serde(default)]
    pub metadata: MetadataConfig,
    #[serde(default)]
    pub layer2: Layer2Config,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "metadata.slots")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "ase2next.toml: '{}' {}", self.field, self.message)
    }
}

impl Ase2NextConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        if self.project.name.is_empty() {
            errors.push(ConfigValidationError {
                field: "project.name".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        }

        for (field, path) in [
            ("frames.asm_dir", &self.frames.asm_dir),
            ("frames.binary_dir", &self.frames.binary_dir),
            ("patterns.output", &self.patterns.output),
            ("tiles.output", &self.tiles.output),
            ("palette.dir", &self.palette.dir),
            ("metadata.output", &self.metadata.output),
            ("layer2.prefix", &self.layer2.prefix),
        ] {
            if path.as_os_str().is_empty() {
                errors.push(ConfigValidationError {
                    field: field.to_string(),
                    message: "must be a non-empty path".to_string(),
                });
            }
        }

        let mut seen = std::collections::HashSet::new();
        for slot in &self.metadata.slots {
            if slot.is_empty() {
                errors.push(ConfigValidationError {
                    field: "metadata.slots".to_string(),
                    message: "must not contain empty names".to_string(),
                });
            } else if !seen.insert(slot) {
                errors.push(ConfigValidationError {
                    field: "metadata.slots".to_string(),
                    message: format!("lists '{}' more than once", slot),
                });
            }
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// Resolve an artifact path against `project.out`.
    pub fn output_path(&self, path: &std::path::Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.project.out.join(path)
        }
    }
}
