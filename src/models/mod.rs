//! Decoded sprite object model.
//!
//! These types are produced once by a loader and treated as read-only by the
//! conversion pipeline. They serialize to the JSON interchange format read by
//! [`crate::loader::JsonLoader`].

pub mod palette;
pub mod sprite;
pub mod tileset;

pub use palette::*;
pub use sprite::*;
pub use tileset::*;
