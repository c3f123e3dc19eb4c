//! Scene-to-model population
//!
//! Copies everything the model keeps out of a post-processed [`Scene`]:
//! materials, meshes and the node hierarchy, then the animation keys.

use crate::animation::attach_animations;
use log::error;
use quarry_core::math::row_major_to_mat4;
use quarry_core::{QuarryError, Result};
use quarry_model::{Material, Mesh, Model, Node, NodeTree};
use quarry_scene::{MaterialKey, Scene, SceneMaterial, SceneMesh, SceneNode, TextureKind};
use std::path::Path;

/// Build the owned model for `filename` from `scene`
pub fn build_model(scene: &Scene, filename: &Path) -> Result<Model> {
    if !scene.has_meshes() {
        return Err(QuarryError::NoGeometry(filename.display().to_string()));
    }

    let materials = scene.materials.iter().map(convert_material).collect();
    let meshes = scene
        .meshes
        .iter()
        .map(convert_mesh)
        .collect::<Result<Vec<_>>>()?;
    let nodes = build_hierarchy(scene)?;

    let mut model = Model {
        filename: filename.to_path_buf(),
        meshes,
        materials,
        nodes,
    };
    attach_animations(scene, &mut model);
    Ok(model)
}

pub fn convert_material(src: &SceneMaterial) -> Material {
    let colour = |key| src.color(key).unwrap_or_default();
    let first_texture = |kind| {
        src.texture(kind, 0)
            .map(|t| t.path.clone())
            .unwrap_or_default()
    };

    Material {
        name: src.name().unwrap_or_default().to_string(),
        ambient_colour: colour(MaterialKey::ColorAmbient),
        diffuse_colour: colour(MaterialKey::ColorDiffuse),
        specular_colour: colour(MaterialKey::ColorSpecular),
        emissive_colour: colour(MaterialKey::ColorEmissive),
        specular_factor: Material::specular_factor_from(
            src.float(MaterialKey::Shininess),
            src.float(MaterialKey::ShininessStrength),
        ),
        diffuse_texture_filename: first_texture(TextureKind::Diffuse),
        specular_texture_filename: first_texture(TextureKind::Specular),
    }
}

/// Copy one mesh. Every face must already be a triangle.
pub fn convert_mesh(src: &SceneMesh) -> Result<Mesh> {
    let mut elements = Vec::with_capacity(src.faces.len() * 3);
    for (i, face) in src.faces.iter().enumerate() {
        if face.indices.len() != 3 {
            let message = format!(
                "mesh '{}' face {} has {} indices, expected 3",
                src.name,
                i,
                face.indices.len()
            );
            error!("{}", message);
            return Err(QuarryError::InvariantViolation(message));
        }
        elements.extend_from_slice(&face.indices);
    }

    let mesh = Mesh {
        name: src.name.clone(),
        vertices: src.positions.clone(),
        normals: src.normals.clone(),
        uv_coords: src.tex_coords.first().cloned().unwrap_or_default(),
        elements,
        material_index: src.material_index,
    };
    if let Err(e) = mesh.check_invariants() {
        error!("{}", e);
        return Err(e);
    }
    Ok(mesh)
}

fn convert_node(src: &SceneNode) -> Node {
    Node::new(src.name.clone(), row_major_to_mat4(&src.transformation))
        .with_meshes(src.meshes.clone())
}

/// Copy the node hierarchy depth-first, pre-order, children in source order
pub fn build_hierarchy(scene: &Scene) -> Result<NodeTree> {
    let root = scene
        .root_node()
        .ok_or_else(|| QuarryError::ValidationError("scene has no root node".to_string()))?;
    let mut tree = NodeTree::new(convert_node(root));

    let mut stack: Vec<_> = root
        .children
        .iter()
        .rev()
        .map(|&c| (c, tree.root()))
        .collect();
    while let Some((idx, parent)) = stack.pop() {
        if tree.len() >= scene.nodes.len() {
            return Err(QuarryError::ValidationError(
                "node hierarchy is not a tree".to_string(),
            ));
        }
        let src = scene.nodes.get(idx).ok_or_else(|| {
            QuarryError::ValidationError(format!("child node {} does not exist", idx))
        })?;
        let id = tree.add_child(parent, convert_node(src));
        stack.extend(src.children.iter().rev().map(|&c| (c, id)));
    }
    Ok(tree)
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::{Vec2, Vec3, Vec4};
    use quarry_scene::{Face, PropertyValue};

    fn mesh(name: &str) -> SceneMesh {
        let mut m = SceneMesh::new(name);
        m.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        m.faces = vec![Face::triangle(0, 1, 2)];
        m
    }

    #[test]
    fn missing_colours_are_zero() {
        let mut src = SceneMaterial::new();
        src.set(MaterialKey::ColorDiffuse, PropertyValue::Color(Vec4::new(1.0, 0.5, 0.0, 1.0)));
        let m = convert_material(&src);
        assert_eq!(m.diffuse_colour, Vec4::new(1.0, 0.5, 0.0, 1.0));
        assert_eq!(m.ambient_colour, Vec4::ZERO);
        assert_eq!(m.specular_colour, Vec4::ZERO);
        assert_eq!(m.emissive_colour, Vec4::ZERO);
        assert_eq!(m.specular_factor, 0.0);
        assert_eq!(m.name, "");
    }

    #[test]
    fn specular_factor_combines_strength() {
        let mut src = SceneMaterial::new();
        src.set(MaterialKey::Shininess, PropertyValue::Float(10.0));
        assert_eq!(convert_material(&src).specular_factor, 10.0);
        src.set(MaterialKey::ShininessStrength, PropertyValue::Float(5.0));
        assert_eq!(convert_material(&src).specular_factor, 50.0);
    }

    #[test]
    fn only_first_diffuse_and_specular_textures() {
        let mut src = SceneMaterial::new();
        src.add_texture(TextureKind::Diffuse, "a.png");
        src.add_texture(TextureKind::Diffuse, "b.png");
        src.add_texture(TextureKind::Normals, "n.png");
        src.add_texture(TextureKind::Specular, "s.png");
        let m = convert_material(&src);
        assert_eq!(m.diffuse_texture_filename, "a.png");
        assert_eq!(m.specular_texture_filename, "s.png");
    }

    #[test]
    fn mesh_copies_channel_zero_only() {
        let mut src = mesh("m");
        src.tex_coords = vec![vec![Vec2::ZERO; 3], vec![Vec2::ONE; 3]];
        src.material_index = 4;
        let m = convert_mesh(&src).unwrap();
        assert_eq!(m.uv_coords, vec![Vec2::ZERO; 3]);
        assert!(m.normals.is_empty());
        assert_eq!(m.elements, vec![0, 1, 2]);
        assert_eq!(m.material_index, 4);
    }

    #[test]
    fn non_triangle_face_is_invariant_violation() {
        let mut src = mesh("m");
        src.faces.push(Face::new(vec![0, 1]));
        assert!(matches!(
            convert_mesh(&src),
            Err(QuarryError::InvariantViolation(_))
        ));
    }

    #[test]
    fn no_meshes_is_no_geometry() {
        let mut scene = Scene::new();
        scene.add_node(None, SceneNode::new("root"));
        let err = build_model(&scene, Path::new("empty.obj")).unwrap_err();
        assert!(matches!(err, QuarryError::NoGeometry(_)));
    }

    #[test]
    fn hierarchy_keeps_order_and_transform_layout() {
        let mut scene = Scene::new();
        let mut fixture = [[0.0f32; 4]; 4];
        for (r, row) in fixture.iter_mut().enumerate() {
            for (c, cell) in row.iter_mut().enumerate() {
                *cell = (r * 4 + c + 1) as f32;
            }
        }
        let root = scene.add_node(None, SceneNode::new("root").with_transformation(fixture));
        let a = scene.add_node(Some(root), SceneNode::new("a").with_meshes(vec![0]));
        scene.add_node(Some(a), SceneNode::new("a1"));
        scene.add_node(Some(root), SceneNode::new("b"));

        let tree = build_hierarchy(&scene).unwrap();
        let names: Vec<_> = tree
            .pre_order()
            .map(|(id, _)| tree.get(id).unwrap().name.clone())
            .collect();
        assert_eq!(names, vec!["root", "a", "a1", "b"]);

        let root_node = tree.root_node();
        assert_eq!(root_node.transform.x_axis, Vec4::new(1.0, 5.0, 9.0, 13.0));
        assert_eq!(root_node.transform.w_axis, Vec4::new(4.0, 8.0, 12.0, 16.0));
        let a_id = tree.find_by_name("a").unwrap();
        assert_eq!(tree.get(a_id).unwrap().mesh_indices, vec![0]);
        assert_eq!(tree.get(a_id).unwrap().parent(), Some(tree.root()));
    }

    #[test]
    fn deep_hierarchy_builds_without_recursion() {
        let mut scene = Scene::new();
        let mut parent = scene.add_node(None, SceneNode::new("n0"));
        for i in 1..50_000 {
            parent = scene.add_node(Some(parent), SceneNode::new(format!("n{}", i)));
        }
        let tree = build_hierarchy(&scene).unwrap();
        assert_eq!(tree.len(), 50_000);
    }
}
