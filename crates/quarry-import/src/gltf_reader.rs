//! glTF 2.0 reader (`.gltf` JSON and `.glb` binary)
//!
//! Each primitive becomes its own scene mesh. Buffers are resolved relative
//! to the file; images are never decoded, so texture paths are recorded as
//! written (or `*<index>` for textures embedded in a buffer view).

use crate::format::{default_material, first_significant_byte, SceneReader};
use glam::{Quat, Vec2, Vec3, Vec4};
use gltf::animation::util::ReadOutputs;
use gltf::animation::Interpolation;
use gltf::mesh::Mode;
use log::{debug, warn};
use quarry_core::math::mat4_to_row_major;
use quarry_core::{QuarryError, Result};
use quarry_scene::{
    Face, MaterialKey, MetadataValue, PropertyValue, QuatKey, Scene, SceneAnimation,
    SceneMaterial, SceneMesh, SceneNode, TextureKind, VectorKey,
};
use std::collections::HashSet;
use std::path::Path;

const FORMAT: &str = "glTF";

/// Name given to the synthetic root above several top-level nodes
pub const SYNTHETIC_ROOT: &str = "ROOT";

pub struct GltfReader;

impl SceneReader for GltfReader {
    fn name(&self) -> &'static str {
        FORMAT
    }

    fn extensions(&self) -> &'static [&'static str] {
        &["gltf", "glb"]
    }

    fn can_read(&self, head: &[u8]) -> bool {
        if head.starts_with(b"glTF") {
            return true;
        }
        first_significant_byte(head) == Some(b'{')
            && head.windows(7).any(|w| w == b"\"asset\"")
    }

    fn read(&self, path: &Path, bytes: &[u8]) -> Result<Scene> {
        let gltf::Gltf { document, blob } =
            gltf::Gltf::from_slice(bytes).map_err(|e| QuarryError::parse(FORMAT, e))?;
        let buffers = gltf::import_buffers(&document, path.parent(), blob)
            .map_err(|e| QuarryError::parse(FORMAT, e))?;

        let mut scene = Scene::new();
        scene.materials = document.materials().map(|m| read_material(&m)).collect();

        let mut fallback_material = None;
        let mut mesh_map: Vec<Vec<u32>> = Vec::new();
        for mesh in document.meshes() {
            let mesh_name = mesh
                .name()
                .map(String::from)
                .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
            let mut indices = Vec::new();
            for primitive in mesh.primitives() {
                let material_index = match primitive.material().index() {
                    Some(i) => i,
                    None => *fallback_material.get_or_insert_with(|| {
                        scene.materials.push(default_material());
                        scene.materials.len() - 1
                    }),
                };
                let mut scene_mesh = read_primitive(&mesh_name, &primitive, &buffers)?;
                scene_mesh.material_index = material_index;
                indices.push(scene.meshes.len() as u32);
                scene.meshes.push(scene_mesh);
            }
            mesh_map.push(indices);
        }

        let node_names: Vec<String> = document.nodes().map(|n| node_name(&n)).collect();
        read_hierarchy(&document, &mesh_map, &node_names, &mut scene)?;

        scene.animations = document
            .animations()
            .map(|a| read_animation(&a, &buffers, &node_names))
            .collect();
        scene.camera_count = document.cameras().count();
        read_metadata(&document, &mut scene);

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

fn node_name(node: &gltf::Node) -> String {
    node.name()
        .map(String::from)
        .unwrap_or_else(|| format!("node_{}", node.index()))
}

fn texture_path(texture: &gltf::Texture) -> String {
    match texture.source().source() {
        gltf::image::Source::Uri { uri, .. } => uri.to_string(),
        gltf::image::Source::View { .. } => format!("*{}", texture.source().index()),
    }
}

fn read_material(material: &gltf::Material) -> SceneMaterial {
    let mut mat = SceneMaterial::new();
    if let Some(name) = material.name() {
        mat.set(MaterialKey::Name, PropertyValue::Text(name.to_string()));
    }

    let pbr = material.pbr_metallic_roughness();
    let base = Vec4::from(pbr.base_color_factor());
    mat.set(MaterialKey::ColorDiffuse, PropertyValue::Color(base));
    if base.w < 1.0 {
        mat.set(MaterialKey::Opacity, PropertyValue::Float(base.w));
    }
    let emissive = material.emissive_factor();
    if emissive != [0.0; 3] {
        mat.set(
            MaterialKey::ColorEmissive,
            PropertyValue::Color(Vec3::from(emissive).extend(1.0)),
        );
    }

    if let Some(info) = pbr.base_color_texture() {
        mat.add_texture(TextureKind::Diffuse, texture_path(&info.texture()))
            .uv_channel = info.tex_coord();
    }
    if let Some(info) = pbr.metallic_roughness_texture() {
        mat.add_texture(TextureKind::MetallicRoughness, texture_path(&info.texture()))
            .uv_channel = info.tex_coord();
    }
    if let Some(info) = material.normal_texture() {
        mat.add_texture(TextureKind::Normals, texture_path(&info.texture()))
            .uv_channel = info.tex_coord();
    }
    if let Some(info) = material.occlusion_texture() {
        mat.add_texture(TextureKind::Lightmap, texture_path(&info.texture()))
            .uv_channel = info.tex_coord();
    }
    if let Some(info) = material.emissive_texture() {
        mat.add_texture(TextureKind::Emissive, texture_path(&info.texture()))
            .uv_channel = info.tex_coord();
    }
    mat
}

fn read_primitive(
    mesh_name: &str,
    primitive: &gltf::Primitive,
    buffers: &[gltf::buffer::Data],
) -> Result<SceneMesh> {
    let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

    let mut mesh = SceneMesh::new(mesh_name);
    mesh.positions = reader
        .read_positions()
        .map(|iter| iter.map(Vec3::from).collect())
        .ok_or_else(|| {
            QuarryError::parse(
                FORMAT,
                format!("primitive {} of '{}' has no positions", primitive.index(), mesh_name),
            )
        })?;
    mesh.normals = reader
        .read_normals()
        .map(|iter| iter.map(Vec3::from).collect())
        .unwrap_or_default();
    mesh.tangents = reader
        .read_tangents()
        .map(|iter| iter.map(|t| Vec3::new(t[0], t[1], t[2])).collect())
        .unwrap_or_default();

    let mut set = 0;
    while let Some(uvs) = reader.read_tex_coords(set) {
        mesh.tex_coords.push(uvs.into_f32().map(Vec2::from).collect());
        set += 1;
    }
    let mut set = 0;
    while let Some(colors) = reader.read_colors(set) {
        mesh.colors.push(colors.into_rgba_f32().map(Vec4::from).collect());
        set += 1;
    }
    if let Some(joints) = reader.read_joints(0) {
        let distinct: HashSet<u16> = joints.into_u16().flatten().collect();
        mesh.bone_count = distinct.len();
    }

    let indices: Vec<u32> = match reader.read_indices() {
        Some(iter) => iter.into_u32().collect(),
        None => (0..mesh.positions.len() as u32).collect(),
    };
    let leftover = leftover_indices(primitive.mode(), indices.len());
    if leftover > 0 {
        warn!(
            "primitive {} of '{}': {} trailing indices do not form a whole {:?} primitive and were dropped",
            primitive.index(),
            mesh_name,
            leftover,
            primitive.mode()
        );
    }
    mesh.faces = faces_from_indices(primitive.mode(), &indices);
    Ok(mesh)
}

/// Indices at the end of a list that `faces_from_indices` cannot place
pub(crate) fn leftover_indices(mode: Mode, count: usize) -> usize {
    match mode {
        Mode::Lines => count % 2,
        Mode::Triangles => count % 3,
        _ => 0,
    }
}

/// Expand a primitive's index list into faces according to its draw mode.
/// Strips and fans become independent triangles with consistent winding.
pub(crate) fn faces_from_indices(mode: Mode, indices: &[u32]) -> Vec<Face> {
    match mode {
        Mode::Points => indices.iter().map(|&i| Face::new(vec![i])).collect(),
        Mode::Lines => indices
            .chunks_exact(2)
            .map(|l| Face::new(l.to_vec()))
            .collect(),
        Mode::LineStrip => indices
            .windows(2)
            .map(|l| Face::new(l.to_vec()))
            .collect(),
        Mode::LineLoop => {
            let mut faces: Vec<Face> = indices
                .windows(2)
                .map(|l| Face::new(l.to_vec()))
                .collect();
            if let (Some(&first), Some(&last)) = (indices.first(), indices.last()) {
                if indices.len() > 2 {
                    faces.push(Face::new(vec![last, first]));
                }
            }
            faces
        }
        Mode::Triangles => indices
            .chunks_exact(3)
            .map(|t| Face::triangle(t[0], t[1], t[2]))
            .collect(),
        Mode::TriangleStrip => indices
            .windows(3)
            .enumerate()
            .map(|(i, t)| {
                if i % 2 == 0 {
                    Face::triangle(t[0], t[1], t[2])
                } else {
                    Face::triangle(t[1], t[0], t[2])
                }
            })
            .collect(),
        Mode::TriangleFan => match indices.split_first() {
            Some((&hub, rest)) => rest
                .windows(2)
                .map(|t| Face::triangle(hub, t[0], t[1]))
                .collect(),
            None => Vec::new(),
        },
    }
}

fn read_hierarchy(
    document: &gltf::Document,
    mesh_map: &[Vec<u32>],
    node_names: &[String],
    scene: &mut Scene,
) -> Result<()> {
    let Some(gltf_scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        // No scene: hang every mesh off a bare root so the geometry stays reachable
        let all: Vec<u32> = (0..scene.meshes.len() as u32).collect();
        scene.add_node(None, SceneNode::new(SYNTHETIC_ROOT).with_meshes(all));
        return Ok(());
    };

    let top: Vec<gltf::Node> = gltf_scene.nodes().collect();
    let parent = if top.len() == 1 {
        None
    } else {
        Some(scene.add_node(None, SceneNode::new(SYNTHETIC_ROOT)))
    };

    let mut visited = HashSet::new();
    let mut stack: Vec<(gltf::Node, Option<usize>)> =
        top.into_iter().rev().map(|n| (n, parent)).collect();
    while let Some((node, parent)) = stack.pop() {
        if !visited.insert(node.index()) {
            return Err(QuarryError::parse(
                FORMAT,
                format!("node {} appears more than once in the hierarchy", node.index()),
            ));
        }
        let transform = glam::Mat4::from_cols_array_2d(&node.transform().matrix());
        let meshes = node
            .mesh()
            .and_then(|m| mesh_map.get(m.index()))
            .cloned()
            .unwrap_or_default();
        let idx = scene.add_node(
            parent,
            SceneNode::new(node_names[node.index()].clone())
                .with_transformation(mat4_to_row_major(&transform))
                .with_meshes(meshes),
        );
        let children: Vec<gltf::Node> = node.children().collect();
        stack.extend(children.into_iter().rev().map(|c| (c, Some(idx))));
    }
    Ok(())
}

fn read_animation(
    animation: &gltf::Animation,
    buffers: &[gltf::buffer::Data],
    node_names: &[String],
) -> SceneAnimation {
    let mut anim = SceneAnimation {
        name: animation.name().unwrap_or_default().to_string(),
        ticks_per_second: 1.0,
        ..Default::default()
    };

    for channel in animation.channels() {
        let reader = channel.reader(|buffer| Some(&buffers[buffer.index()]));
        let Some(inputs) = reader.read_inputs() else {
            continue;
        };
        let times: Vec<f64> = inputs.map(f64::from).collect();
        if let Some(&last) = times.last() {
            anim.duration = anim.duration.max(last);
        }
        let cubic = channel.sampler().interpolation() == Interpolation::CubicSpline;
        let node_name = &node_names[channel.target().node().index()];

        match reader.read_outputs() {
            Some(ReadOutputs::Translations(values)) => {
                let values = spline_values(values.map(Vec3::from).collect(), cubic);
                anim.channel_mut(node_name).position_keys.extend(vector_keys(&times, values));
            }
            Some(ReadOutputs::Scales(values)) => {
                let values = spline_values(values.map(Vec3::from).collect(), cubic);
                anim.channel_mut(node_name).scaling_keys.extend(vector_keys(&times, values));
            }
            Some(ReadOutputs::Rotations(values)) => {
                let values = spline_values(values.into_f32().map(Quat::from_array).collect(), cubic);
                anim.channel_mut(node_name).rotation_keys.extend(
                    times
                        .iter()
                        .zip(values)
                        .map(|(&time, value)| QuatKey { time, value }),
                );
            }
            Some(ReadOutputs::MorphTargetWeights(_)) => anim.mesh_channel_count += 1,
            None => {}
        }
    }
    anim
}

/// Cubic-spline samplers store in-tangent, value, out-tangent per key; keep
/// the values only
fn spline_values<T: Copy>(values: Vec<T>, cubic: bool) -> Vec<T> {
    if cubic {
        values.chunks_exact(3).map(|c| c[1]).collect()
    } else {
        values
    }
}

fn vector_keys(times: &[f64], values: Vec<Vec3>) -> impl Iterator<Item = VectorKey> + '_ {
    times
        .iter()
        .zip(values)
        .map(|(&time, value)| VectorKey { time, value })
}

fn read_metadata(document: &gltf::Document, scene: &mut Scene) {
    let asset = &document.as_json().asset;
    if let Some(generator) = &asset.generator {
        scene
            .metadata
            .push(("generator".to_string(), MetadataValue::String(generator.clone())));
    }
    scene
        .metadata
        .push(("version".to_string(), MetadataValue::String(asset.version.clone())));
    if let Some(copyright) = &asset.copyright {
        scene
            .metadata
            .push(("copyright".to_string(), MetadataValue::String(copyright.clone())));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_scene::PrimitiveKind;

    fn as_lists(faces: &[Face]) -> Vec<Vec<u32>> {
        faces.iter().map(|f| f.indices.clone()).collect()
    }

    #[test]
    fn sniffs_binary_and_json() {
        let reader = GltfReader;
        assert!(reader.can_read(b"glTF\x02\x00\x00\x00"));
        assert!(reader.can_read(b"  {\n \"asset\": {\"version\": \"2.0\"}}"));
        assert!(!reader.can_read(b"{\"name\": \"package\"}"));
        assert!(!reader.can_read(b"v 0 0 0\n"));
    }

    #[test]
    fn triangles_chunk_by_three() {
        let faces = faces_from_indices(Mode::Triangles, &[0, 1, 2, 2, 1, 3, 9]);
        assert_eq!(as_lists(&faces), vec![vec![0, 1, 2], vec![2, 1, 3]]);
        assert_eq!(leftover_indices(Mode::Triangles, 7), 1);
        assert_eq!(leftover_indices(Mode::Triangles, 6), 0);
    }

    #[test]
    fn partial_line_is_counted() {
        let faces = faces_from_indices(Mode::Lines, &[0, 1, 2]);
        assert_eq!(as_lists(&faces), vec![vec![0, 1]]);
        assert_eq!(leftover_indices(Mode::Lines, 3), 1);
        assert_eq!(leftover_indices(Mode::TriangleStrip, 4), 0);
    }

    #[test]
    fn strip_alternates_winding() {
        let faces = faces_from_indices(Mode::TriangleStrip, &[0, 1, 2, 3]);
        assert_eq!(as_lists(&faces), vec![vec![0, 1, 2], vec![2, 1, 3]]);
    }

    #[test]
    fn fan_shares_first_vertex() {
        let faces = faces_from_indices(Mode::TriangleFan, &[0, 1, 2, 3]);
        assert_eq!(as_lists(&faces), vec![vec![0, 1, 2], vec![0, 2, 3]]);
        assert!(faces_from_indices(Mode::TriangleFan, &[]).is_empty());
    }

    #[test]
    fn line_loop_closes() {
        let faces = faces_from_indices(Mode::LineLoop, &[4, 5, 6]);
        assert_eq!(as_lists(&faces), vec![vec![4, 5], vec![5, 6], vec![6, 4]]);
        assert!(faces.iter().all(|f| f.kind() == PrimitiveKind::Line));
    }

    #[test]
    fn points_are_single_index_faces() {
        let faces = faces_from_indices(Mode::Points, &[7, 8]);
        assert!(faces.iter().all(|f| f.kind() == PrimitiveKind::Point));
        assert_eq!(faces.len(), 2);
    }

    #[test]
    fn cubic_spline_keeps_middle_value() {
        assert_eq!(spline_values(vec![1, 2, 3, 4, 5, 6], true), vec![2, 5]);
        assert_eq!(spline_values(vec![1, 2], false), vec![1, 2]);
    }
}
