//! Wavefront OBJ reader
//!
//! Faces are kept at their written arity; triangulation happens in the
//! post-processing pipeline. Material libraries are resolved next to the OBJ
//! file, and a missing or broken library only costs the materials.

use crate::format::{default_material, first_significant_byte, SceneReader};
use glam::{Vec2, Vec3, Vec4};
use log::{debug, warn};
use quarry_core::{QuarryError, Result};
use quarry_scene::{
    Face, MaterialKey, PropertyValue, Scene, SceneMaterial, SceneMesh, SceneNode, TextureKind,
};
use std::path::Path;

const FORMAT: &str = "OBJ";

/// Statements that mark a text file as OBJ when seen at the start of a line
const OBJ_STATEMENTS: &[&str] = &["v ", "vn ", "vt ", "f ", "o ", "g ", "mtllib ", "usemtl "];

pub struct ObjReader;

impl SceneReader for ObjReader {
    fn name(&self) -> &'static str {
        "Wavefront OBJ"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["obj"]
    }

    fn can_read(&self, head: &[u8]) -> bool {
        if head.contains(&0) || first_significant_byte(head) == Some(b'{') {
            return false;
        }
        String::from_utf8_lossy(head)
            .lines()
            .map(str::trim_start)
            .any(|line| OBJ_STATEMENTS.iter().any(|s| line.starts_with(s)))
    }

    fn read(&self, path: &Path, bytes: &[u8]) -> Result<Scene> {
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        let mut source = bytes;
        let (models, materials) = tobj::load_obj_buf(
            &mut source,
            &tobj::LoadOptions {
                triangulate: false,
                single_index: true,
                ..Default::default()
            },
            |mtl: &Path| tobj::load_mtl(base.join(mtl)),
        )
        .map_err(|e| QuarryError::parse(FORMAT, e))?;

        let materials = materials.unwrap_or_else(|e| {
            warn!("{}: material library not loaded: {}", path.display(), e);
            Vec::new()
        });

        let mut scene = Scene::new();
        scene.materials = materials.iter().map(convert_material).collect();

        let mut fallback_material = None;
        for model in &models {
            let mut mesh = convert_mesh(model)?;
            mesh.material_index = match model.mesh.material_id {
                Some(id) if id < scene.materials.len() => id,
                _ => *fallback_material.get_or_insert_with(|| {
                    scene.materials.push(default_material());
                    scene.materials.len() - 1
                }),
            };
            scene.meshes.push(mesh);
        }

        let root_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "obj".to_string());
        let root = scene.add_node(None, SceneNode::new(root_name));
        for (i, model) in models.iter().enumerate() {
            scene.add_node(
                Some(root),
                SceneNode::new(model.name.clone()).with_meshes(vec![i as u32]),
            );
        }

        debug!(
            "{}: {} objects, {} materials",
            path.display(),
            scene.meshes.len(),
            scene.materials.len()
        );
        Ok(scene)
    }
}

fn rgb(c: [f32; 3]) -> PropertyValue {
    PropertyValue::Color(Vec3::from(c).extend(1.0))
}

/// Parse a whitespace-separated `r g b` value such as the `Ke` statement
fn parse_rgb(value: &str) -> Option<[f32; 3]> {
    let mut parts = value.split_whitespace().map(str::parse::<f32>);
    let c = [parts.next()?.ok()?, parts.next()?.ok()?, parts.next()?.ok()?];
    Some(c)
}

fn convert_material(src: &tobj::Material) -> SceneMaterial {
    let mut mat = SceneMaterial::new();
    mat.set(MaterialKey::Name, PropertyValue::Text(src.name.clone()));
    if let Some(c) = src.ambient {
        mat.set(MaterialKey::ColorAmbient, rgb(c));
    }
    if let Some(c) = src.diffuse {
        mat.set(MaterialKey::ColorDiffuse, rgb(c));
    }
    if let Some(c) = src.specular {
        mat.set(MaterialKey::ColorSpecular, rgb(c));
    }
    if let Some(c) = src.unknown_param.get("Ke").and_then(|v| parse_rgb(v)) {
        mat.set(MaterialKey::ColorEmissive, rgb(c));
    }
    if let Some(ns) = src.shininess {
        mat.set(MaterialKey::Shininess, PropertyValue::Float(ns));
    }
    if let Some(d) = src.dissolve {
        mat.set(MaterialKey::Opacity, PropertyValue::Float(d));
    }

    let textures = [
        (TextureKind::Diffuse, &src.diffuse_texture),
        (TextureKind::Specular, &src.specular_texture),
        (TextureKind::Ambient, &src.ambient_texture),
        (TextureKind::Normals, &src.normal_texture),
        (TextureKind::Shininess, &src.shininess_texture),
        (TextureKind::Opacity, &src.dissolve_texture),
    ];
    for (kind, path) in textures {
        if let Some(path) = path {
            mat.add_texture(kind, path.clone());
        }
    }
    mat
}

fn convert_mesh(model: &tobj::Model) -> Result<SceneMesh> {
    let src = &model.mesh;
    let mut mesh = SceneMesh::new(model.name.clone());
    mesh.positions = src
        .positions
        .chunks_exact(3)
        .map(|p| Vec3::new(p[0], p[1], p[2]))
        .collect();
    mesh.normals = src
        .normals
        .chunks_exact(3)
        .map(|n| Vec3::new(n[0], n[1], n[2]))
        .collect();
    if !src.texcoords.is_empty() {
        mesh.tex_coords
            .push(src.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], t[1])).collect());
    }
    if !src.vertex_color.is_empty() {
        mesh.colors.push(
            src.vertex_color
                .chunks_exact(3)
                .map(|c| Vec4::new(c[0], c[1], c[2], 1.0))
                .collect(),
        );
    }
    mesh.faces = faces_from_arities(&src.indices, &src.face_arities).ok_or_else(|| {
        QuarryError::parse(
            FORMAT,
            format!(
                "object '{}': face sizes do not match its {} indices",
                model.name,
                src.indices.len()
            ),
        )
    })?;
    Ok(mesh)
}

/// Split a flat index list into faces. An empty arity list means every face
/// is a triangle.
pub(crate) fn faces_from_arities(indices: &[u32], arities: &[u32]) -> Option<Vec<Face>> {
    if arities.is_empty() {
        if indices.len() % 3 != 0 {
            return None;
        }
        return Some(
            indices
                .chunks_exact(3)
                .map(|t| Face::triangle(t[0], t[1], t[2]))
                .collect(),
        );
    }

    let mut faces = Vec::with_capacity(arities.len());
    let mut offset = 0usize;
    for &arity in arities {
        let end = offset + arity as usize;
        faces.push(Face::new(indices.get(offset..end)?.to_vec()));
        offset = end;
    }
    (offset == indices.len()).then_some(faces)
}
