//! Quarry Core - Foundational types for the Quarry model importer
//!
//! This crate provides the types every other Quarry crate depends on:
//! - `QuarryError` and the `Result` alias
//! - Matrix layout and rotation conversions between source scenes and models
//! - `Bounds` - axis-aligned extents of vertex data

mod bounds;
mod error;
pub mod math;

pub use bounds::Bounds;
pub use error::{QuarryError, Result};
