//! Configuration for ase2next conversions
//!
//! Provides types and parsing for `ase2next.toml`.

pub mod loader;
pub mod schema;

pub use loader::*;
pub use schema::*;
