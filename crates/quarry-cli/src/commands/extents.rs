//! Model extents command

use super::OutputFormat;
use anyhow::Result;
use quarry_core::Bounds;
use quarry_import::ImportConfig;
use serde::Serialize;
use std::path::Path;

#[derive(Debug, Serialize)]
struct MeshExtents {
    name: String,
    bounds: Option<Bounds>,
}

#[derive(Debug, Serialize)]
struct ExtentsReport {
    model: Option<Bounds>,
    meshes: Vec<MeshExtents>,
}

pub fn run(path: &Path, format: OutputFormat, config: ImportConfig) -> Result<()> {
    let model = super::import(path, config)?;
    let report = ExtentsReport {
        model: model.local_extents(),
        meshes: model
            .meshes
            .iter()
            .map(|m| MeshExtents {
                name: m.name.clone(),
                bounds: m.local_extents(),
            })
            .collect(),
    };

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text => {
            match report.model {
                Some(b) => println!("Model: {}", b),
                None => println!("Model: no vertices"),
            }
            for (i, mesh) in report.meshes.iter().enumerate() {
                match mesh.bounds {
                    Some(b) => println!("  [{}] '{}': {}", i, mesh.name, b),
                    None => println!("  [{}] '{}': no vertices", i, mesh.name),
                }
            }
        }
    }
    Ok(())
}
