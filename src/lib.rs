//! ase2next - Library for converting tiled sprite animations into ZX Spectrum Next assets
//!
//! This library provides functionality to:
//! - Encode cels as unified hardware sprites (anchor + relative tiles)
//! - Deduplicate patterns per frame and assign pattern regions per family
//! - Pack frame payloads into 8 KiB memory pages with assembler descriptors
//! - Write pattern banks, tile definitions, palettes, slot metadata and Layer 2 banks

pub mod anchor;
pub mod asm;
pub mod attrs;
pub mod cli;
pub mod color;
pub mod config;
pub mod convert;
pub mod dedup;
pub mod error;
pub mod family;
pub mod frame;
pub mod layer2;
pub mod loader;
pub mod metadata;
pub mod models;
pub mod output;
pub mod page;
pub mod patterns;
pub mod progress;

pub use error::{CelError, ConvertError};
