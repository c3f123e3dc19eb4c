//! Assimp-backed reader for the formats without a pure-Rust reader
//!
//! FBX, Collada, 3DS, Blender and friends go through `asset-importer`.
//! Assimp runs its own versions of the fixed import steps while reading;
//! the shared pipeline then runs over the converted scene as it does for
//! every other reader, which leaves already-processed data unchanged.

use crate::format::{looks_like_fbx, SceneReader, ASSIMP_EXTENSIONS};
use crate::postprocess::{Step, IMPORT_STEPS};
use asset_importer::material::{TextureMapping as AiMapping, TextureType};
use asset_importer::postprocess::PostProcessSteps;
use asset_importer::{Material, Matrix4x4, Vector3D};
use glam::{Mat4, Quat, Vec2, Vec3, Vec4};
use log::debug;
use quarry_core::math::mat4_to_row_major;
use quarry_core::{QuarryError, Result};
use quarry_scene::{
    Face, MaterialKey, PropertyValue, QuatKey, Scene, SceneAnimation, SceneMaterial, SceneMesh,
    SceneNode, TextureKind, TextureMapping, VectorKey,
};
use std::path::Path;

const FORMAT: &str = "Assimp";

/// Assimp supports up to eight UV and colour sets per mesh
const MAX_CHANNELS: usize = 8;

const TEXTURE_KINDS: [(TextureType, TextureKind); 13] = [
    (TextureType::Diffuse, TextureKind::Diffuse),
    (TextureType::Specular, TextureKind::Specular),
    (TextureType::Ambient, TextureKind::Ambient),
    (TextureType::Emissive, TextureKind::Emissive),
    (TextureType::Height, TextureKind::Height),
    (TextureType::Normals, TextureKind::Normals),
    (TextureType::Shininess, TextureKind::Shininess),
    (TextureType::Opacity, TextureKind::Opacity),
    (TextureType::Displacement, TextureKind::Displacement),
    (TextureType::Lightmap, TextureKind::Lightmap),
    (TextureType::Reflection, TextureKind::Reflection),
    (TextureType::BaseColor, TextureKind::BaseColor),
    (TextureType::GltfMetallicRoughness, TextureKind::MetallicRoughness),
];

pub struct AssimpReader;

impl SceneReader for AssimpReader {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn extensions(&self) -> &'static [&'static str] {
        ASSIMP_EXTENSIONS
    }

    fn can_read(&self, head: &[u8]) -> bool {
        looks_like_fbx(head)
    }

    fn read(&self, path: &Path, _bytes: &[u8]) -> Result<Scene> {
        // Reading by path lets Assimp resolve companion files itself
        let ai_scene = asset_importer::Importer::new()
            .read_file(path)
            .with_post_process(assimp_steps(&IMPORT_STEPS))
            .import()
            .map_err(|e| QuarryError::parse(FORMAT, e))?;

        let mut scene = Scene::new();
        scene.materials = ai_scene.materials().map(|m| read_material(&m)).collect();
        scene.meshes = ai_scene.meshes().map(|m| read_mesh(&m)).collect::<Result<_>>()?;
        if let Some(root) = ai_scene.root_node() {
            read_hierarchy(root, &mut scene);
        }
        scene.animations = ai_scene.animations().map(|a| read_animation(&a)).collect();
        scene.camera_count = ai_scene.num_cameras();
        scene.light_count = ai_scene.num_lights();

        debug!(
            "{}: {} meshes, {} materials, {} nodes, {} animations",
            path.display(),
            scene.meshes.len(),
            scene.materials.len(),
            scene.nodes.len(),
            scene.animations.len()
        );
        Ok(scene)
    }
}

/// Assimp flags for the fixed import steps. The unit scale stays with the
/// shared pipeline, which decides it from the file name.
pub(crate) fn assimp_steps(steps: &[Step]) -> PostProcessSteps {
    steps.iter().fold(PostProcessSteps::empty(), |flags, step| {
        flags
            | match step {
                Step::ValidateDataStructure => PostProcessSteps::VALIDATE_DATA_STRUCTURE,
                Step::Triangulate => PostProcessSteps::TRIANGULATE,
                Step::SortByPrimitiveType => PostProcessSteps::SORT_BY_PTYPE,
                Step::GenUvCoords => PostProcessSteps::GEN_UV_COORDS,
                Step::JoinIdenticalVertices => PostProcessSteps::JOIN_IDENTICAL_VERTICES,
                Step::GenSmoothNormals => PostProcessSteps::GEN_SMOOTH_NORMALS,
                Step::RemoveRedundantMaterials => PostProcessSteps::REMOVE_REDUNDANT_MATERIALS,
                Step::OptimizeMeshes => PostProcessSteps::OPTIMIZE_MESHES,
                Step::GlobalScale => PostProcessSteps::empty(),
            }
    })
}

fn vec3(v: Vector3D) -> Vec3 {
    Vec3::new(v.x, v.y, v.z)
}

fn rgb(c: Vector3D) -> PropertyValue {
    PropertyValue::Color(vec3(c).extend(1.0))
}

/// `Matrix4x4` is column-major, like glam
fn to_mat4(m: &Matrix4x4) -> Mat4 {
    let col = |c: &asset_importer::Vector4D| Vec4::new(c.x, c.y, c.z, c.w);
    Mat4::from_cols(col(&m.x_axis), col(&m.y_axis), col(&m.z_axis), col(&m.w_axis))
}

fn convert_mapping(mapping: AiMapping) -> TextureMapping {
    match mapping {
        AiMapping::Sphere => TextureMapping::Sphere,
        AiMapping::Cylinder => TextureMapping::Cylinder,
        AiMapping::Box => TextureMapping::Box,
        AiMapping::Plane => TextureMapping::Plane,
        AiMapping::UV | AiMapping::Other(_) => TextureMapping::Uv,
    }
}

fn read_material(material: &Material) -> SceneMaterial {
    let mut mat = SceneMaterial::new();
    let name = material.name();
    if !name.is_empty() {
        mat.set(MaterialKey::Name, PropertyValue::Text(name));
    }

    let colors = [
        (MaterialKey::ColorAmbient, material.ambient_color()),
        (MaterialKey::ColorDiffuse, material.diffuse_color()),
        (MaterialKey::ColorSpecular, material.specular_color()),
        (MaterialKey::ColorEmissive, material.emissive_color()),
    ];
    for (key, color) in colors {
        if let Some(c) = color {
            mat.set(key, rgb(c));
        }
    }
    if let Some(v) = material.shininess() {
        mat.set(MaterialKey::Shininess, PropertyValue::Float(v));
    }
    if let Some(v) = material.shininess_strength() {
        mat.set(MaterialKey::ShininessStrength, PropertyValue::Float(v));
    }
    if let Some(v) = material.opacity() {
        mat.set(MaterialKey::Opacity, PropertyValue::Float(v));
    }

    for (ai_kind, kind) in TEXTURE_KINDS {
        for i in 0..material.texture_count(ai_kind) {
            if let Some(info) = material.texture(ai_kind, i) {
                let slot = mat.add_texture(kind, info.path);
                slot.mapping = convert_mapping(info.mapping);
                slot.uv_channel = info.uv_index;
            }
        }
    }
    mat
}

fn read_mesh(mesh: &asset_importer::mesh::Mesh) -> Result<SceneMesh> {
    let mut out = SceneMesh::new(mesh.name());
    out.positions = mesh.vertices().into_iter().map(vec3).collect();
    out.normals = mesh
        .normals()
        .map(|n| n.into_iter().map(vec3).collect())
        .unwrap_or_default();
    out.tangents = mesh
        .tangents()
        .map(|t| t.into_iter().map(vec3).collect())
        .unwrap_or_default();
    for channel in (0..MAX_CHANNELS).take_while(|&c| mesh.has_texture_coords(c)) {
        if let Some(uvs) = mesh.texture_coords2(channel) {
            out.tex_coords.push(uvs.into_iter().map(|t| Vec2::new(t.x, t.y)).collect());
        }
    }
    for channel in (0..MAX_CHANNELS).take_while(|&c| mesh.has_vertex_colors(c)) {
        if let Some(colors) = mesh.vertex_colors(channel) {
            out.colors.push(colors.into_iter().map(|c| Vec4::new(c.x, c.y, c.z, c.w)).collect());
        }
    }
    out.faces = mesh
        .faces()
        .map(|f| Face::new(f.indices_raw().to_vec()))
        .collect();
    if out.faces.iter().any(|f| f.indices.is_empty()) {
        return Err(QuarryError::parse(
            FORMAT,
            format!("mesh '{}' has an empty face", out.name),
        ));
    }
    out.bone_count = mesh.num_bones();
    out.material_index = mesh.material_index();
    Ok(out)
}

fn read_hierarchy(root: asset_importer::node::Node, scene: &mut Scene) {
    let mut stack = vec![(root, None)];
    while let Some((node, parent)) = stack.pop() {
        let transform = to_mat4(&node.transformation());
        let meshes = node.mesh_indices_iter().map(|m| m as u32).collect();
        let idx = scene.add_node(
            parent,
            SceneNode::new(node.name())
                .with_transformation(mat4_to_row_major(&transform))
                .with_meshes(meshes),
        );
        let children: Vec<_> = node.children().collect();
        stack.extend(children.into_iter().rev().map(|c| (c, Some(idx))));
    }
}

fn read_animation(animation: &asset_importer::Animation) -> SceneAnimation {
    let mut anim = SceneAnimation {
        name: animation.name(),
        duration: animation.duration(),
        ticks_per_second: animation.ticks_per_second(),
        mesh_channel_count: animation.num_mesh_channels() + animation.num_morph_mesh_channels(),
        ..Default::default()
    };
    for channel in animation.channels() {
        let target = anim.channel_mut(&channel.node_name());
        target.position_keys = channel
            .position_keys_iter()
            .map(|k| VectorKey { time: k.time, value: vec3(k.value) })
            .collect();
        target.rotation_keys = channel
            .rotation_keys_iter()
            .map(|k| QuatKey {
                time: k.time,
                value: Quat::from_xyzw(k.value.x, k.value.y, k.value.z, k.value.w),
            })
            .collect();
        target.scaling_keys = channel
            .scaling_keys_iter()
            .map(|k| VectorKey { time: k.time, value: vec3(k.value) })
            .collect();
    }
    anim
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_steps_map_to_assimp_flags() {
        let flags = assimp_steps(&IMPORT_STEPS);
        assert!(flags.contains(
            PostProcessSteps::VALIDATE_DATA_STRUCTURE
                | PostProcessSteps::TRIANGULATE
                | PostProcessSteps::SORT_BY_PTYPE
                | PostProcessSteps::GEN_UV_COORDS
                | PostProcessSteps::JOIN_IDENTICAL_VERTICES
                | PostProcessSteps::GEN_SMOOTH_NORMALS
                | PostProcessSteps::REMOVE_REDUNDANT_MATERIALS
                | PostProcessSteps::OPTIMIZE_MESHES
        ));
        assert!(!flags.contains(PostProcessSteps::GLOBAL_SCALE));
        assert!(assimp_steps(&[Step::GlobalScale]).is_empty());
    }

    #[test]
    fn matrix_columns_carry_translation() {
        let m = Matrix4x4::from_cols(
            asset_importer::Vector4D::new(1.0, 0.0, 0.0, 0.0),
            asset_importer::Vector4D::new(0.0, 1.0, 0.0, 0.0),
            asset_importer::Vector4D::new(0.0, 0.0, 1.0, 0.0),
            asset_importer::Vector4D::new(4.0, 5.0, 6.0, 1.0),
        );
        let row_major = mat4_to_row_major(&to_mat4(&m));
        assert_eq!(row_major[0][3], 4.0);
        assert_eq!(row_major[2][3], 6.0);
    }

    #[test]
    fn non_uv_mappings_survive() {
        assert_eq!(convert_mapping(AiMapping::Sphere), TextureMapping::Sphere);
        assert_eq!(convert_mapping(AiMapping::Other(9)), TextureMapping::Uv);
    }

    #[test]
    fn reader_claims_fbx() {
        let reader = AssimpReader;
        assert!(reader.can_read(b"Kaydara FBX Binary  \x00"));
        assert!(reader.extensions().contains(&"dae"));
        assert!(!reader.can_read(b"glTF"));
    }
}
