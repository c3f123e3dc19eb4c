//! Node hierarchy printing

use anyhow::Result;
use quarry_import::ImportConfig;
use std::path::Path;

pub fn run(path: &Path, config: ImportConfig) -> Result<()> {
    let model = super::import(path, config)?;
    print!("{}", model.nodes.display_hierarchy());
    Ok(())
}
