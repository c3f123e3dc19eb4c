//! CLI command implementations

pub mod extents;
pub mod hierarchy;
pub mod inspect;

use anyhow::Result;
use quarry_import::{ImportConfig, Importer};
use quarry_model::Model;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Import `path`, turning the library error into an `anyhow` one
pub(crate) fn import(path: &Path, config: ImportConfig) -> Result<Model> {
    let model = Importer::with_config(config).load_from_file(path)?;
    Ok(model)
}
