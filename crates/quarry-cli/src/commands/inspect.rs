//! Model summary command

use super::OutputFormat;
use anyhow::Result;
use quarry_import::ImportConfig;
use quarry_model::{Material, Model};
use std::path::Path;

pub fn run(path: &Path, format: OutputFormat, config: ImportConfig) -> Result<()> {
    let model = super::import(path, config)?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&model)?),
        OutputFormat::Text => print!("{}", summary(&model)),
    }
    Ok(())
}

fn yes_no(b: bool) -> &'static str {
    if b {
        "yes"
    } else {
        "no"
    }
}

fn texture_or_dash(path: &str) -> &str {
    if path.is_empty() {
        "-"
    } else {
        path
    }
}

fn describe_material(m: &Material) -> String {
    let d = m.diffuse_colour;
    format!(
        "diffuse ({:.3}, {:.3}, {:.3}, {:.3}), specular factor {}, diffuse map {}, specular map {}",
        d.x,
        d.y,
        d.z,
        d.w,
        m.specular_factor,
        texture_or_dash(&m.diffuse_texture_filename),
        texture_or_dash(&m.specular_texture_filename)
    )
}

/// Human-readable multi-line summary of a model
pub fn summary(model: &Model) -> String {
    let mut out = String::new();
    out.push_str(&format!("File: {}\n", model.filename.display()));

    out.push_str(&format!(
        "Meshes: {} ({} vertices, {} triangles)\n",
        model.meshes.len(),
        model.vertex_count(),
        model.triangle_count()
    ));
    for (i, mesh) in model.meshes.iter().enumerate() {
        out.push_str(&format!(
            "  [{}] '{}': {} vertices, {} triangles, normals {}, uvs {}, material {}\n",
            i,
            mesh.name,
            mesh.vertices.len(),
            mesh.triangle_count(),
            yes_no(mesh.has_normals()),
            yes_no(mesh.has_uv_coords()),
            mesh.material_index
        ));
    }

    out.push_str(&format!("Materials: {}\n", model.materials.len()));
    for (i, material) in model.materials.iter().enumerate() {
        out.push_str(&format!(
            "  [{}] '{}': {}\n",
            i,
            material.name,
            describe_material(material)
        ));
    }

    out.push_str(&format!(
        "Nodes: {} ({} animated)\n",
        model.nodes.len(),
        model.animated_node_count()
    ));
    match model.local_extents() {
        Some(bounds) => out.push_str(&format!("Extents: {}\n", bounds)),
        None => out.push_str("Extents: none\n"),
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Mat4, Vec3};
    use quarry_model::{Mesh, Node, NodeTree};
    use std::path::PathBuf;

    #[test]
    fn summary_lists_meshes_and_materials() {
        let model = Model {
            filename: PathBuf::from("crate.obj"),
            meshes: vec![Mesh {
                name: "lid".to_string(),
                vertices: vec![Vec3::ZERO, Vec3::X, Vec3::Y],
                elements: vec![0, 1, 2],
                ..Default::default()
            }],
            materials: vec![Material {
                name: "wood".to_string(),
                diffuse_texture_filename: "wood.png".to_string(),
                ..Default::default()
            }],
            nodes: NodeTree::new(Node::new("crate.obj", Mat4::IDENTITY).with_meshes(vec![0])),
        };

        let text = summary(&model);
        assert!(text.contains("Meshes: 1 (3 vertices, 1 triangles)"));
        assert!(text.contains("[0] 'lid': 3 vertices, 1 triangles, normals no, uvs no, material 0"));
        assert!(text.contains("diffuse map wood.png, specular map -"));
        assert!(text.contains("Nodes: 1 (0 animated)"));
    }
}
