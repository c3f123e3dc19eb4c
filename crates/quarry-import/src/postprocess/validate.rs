use quarry_core::{QuarryError, Result};
use quarry_scene::{Scene, SceneMesh};

fn invalid(message: String) -> QuarryError {
    QuarryError::ValidationError(message)
}

/// Check structural integrity of a freshly read scene.
///
/// The node arena must form a single tree under `root` (every node reached
/// exactly once), and every index a mesh, node or face holds must be in
/// range. Scenes without meshes pass, as do meshes with neither vertices
/// nor faces (sorting drops those); both end up reported as `NoGeometry`
/// when nothing drawable is left.
pub fn validate_scene(scene: &Scene) -> Result<()> {
    for (i, mesh) in scene.meshes.iter().enumerate() {
        validate_mesh(i, mesh, scene.materials.len())?;
    }
    validate_nodes(scene)?;

    for anim in &scene.animations {
        for channel in &anim.channels {
            if channel.node_name.is_empty() {
                return Err(invalid(format!(
                    "animation '{}' has a channel without a target node",
                    anim.name
                )));
            }
            let times = channel
                .position_keys
                .iter()
                .map(|k| k.time)
                .chain(channel.rotation_keys.iter().map(|k| k.time))
                .chain(channel.scaling_keys.iter().map(|k| k.time));
            for time in times {
                if !time.is_finite() {
                    return Err(invalid(format!(
                        "animation '{}' channel '{}' has a non-finite key time",
                        anim.name, channel.node_name
                    )));
                }
            }
        }
    }
    Ok(())
}

fn validate_mesh(index: usize, mesh: &SceneMesh, material_count: usize) -> Result<()> {
    let count = mesh.vertex_count();
    if count == 0 && !mesh.faces.is_empty() {
        return Err(invalid(format!("mesh {} ('{}') has no vertices", index, mesh.name)));
    }

    let mut streams = vec![("normals", mesh.normals.len()), ("tangents", mesh.tangents.len())];
    streams.extend(mesh.tex_coords.iter().map(|c| ("texture coordinates", c.len())));
    streams.extend(mesh.colors.iter().map(|c| ("colours", c.len())));
    for (what, len) in streams {
        if len != 0 && len != count {
            return Err(invalid(format!(
                "mesh {} ('{}') has {} {} for {} vertices",
                index, mesh.name, len, what, count
            )));
        }
    }

    for face in &mesh.faces {
        if face.indices.is_empty() {
            return Err(invalid(format!("mesh {} ('{}') has an empty face", index, mesh.name)));
        }
        if let Some(bad) = face.indices.iter().find(|&&i| i as usize >= count) {
            return Err(invalid(format!(
                "mesh {} ('{}') face references vertex {} of {}",
                index, mesh.name, bad, count
            )));
        }
    }

    if mesh.material_index >= material_count {
        return Err(invalid(format!(
            "mesh {} ('{}') references material {} of {}",
            index, mesh.name, mesh.material_index, material_count
        )));
    }
    Ok(())
}

fn validate_nodes(scene: &Scene) -> Result<()> {
    let Some(root) = scene.root else {
        if scene.nodes.is_empty() {
            return Ok(());
        }
        return Err(invalid("scene has nodes but no root".to_string()));
    };
    if root >= scene.nodes.len() {
        return Err(invalid(format!("root node {} does not exist", root)));
    }

    let mut seen = vec![false; scene.nodes.len()];
    let mut stack = vec![root];
    while let Some(idx) = stack.pop() {
        if std::mem::replace(&mut seen[idx], true) {
            return Err(invalid(format!(
                "node {} ('{}') is reachable along more than one path",
                idx, scene.nodes[idx].name
            )));
        }
        let node = &scene.nodes[idx];
        if let Some(bad) = node.meshes.iter().find(|&&m| m as usize >= scene.meshes.len()) {
            return Err(invalid(format!(
                "node '{}' references mesh {} of {}",
                node.name,
                bad,
                scene.meshes.len()
            )));
        }
        for &child in &node.children {
            if child >= scene.nodes.len() {
                return Err(invalid(format!(
                    "node '{}' has child {} outside the hierarchy",
                    node.name, child
                )));
            }
            stack.push(child);
        }
    }

    if let Some(orphan) = seen.iter().position(|&s| !s) {
        return Err(invalid(format!(
            "node {} ('{}') is not reachable from the root",
            orphan, scene.nodes[orphan].name
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use glam::Vec3;
    use quarry_scene::{Face, SceneNode, VectorKey};

    fn valid() -> Scene {
        let mut scene = Scene::new();
        scene.materials.push(plain_material());
        scene.meshes.push(triangle("t"));
        let root = scene.add_node(None, SceneNode::new("root"));
        scene.add_node(Some(root), SceneNode::new("child").with_meshes(vec![0]));
        scene
    }

    fn assert_invalid(scene: &Scene) {
        assert!(matches!(validate_scene(scene), Err(QuarryError::ValidationError(_))));
    }

    #[test]
    fn well_formed_scene_passes() {
        validate_scene(&valid()).unwrap();
        validate_scene(&Scene::new()).unwrap();
    }

    #[test]
    fn empty_mesh_passes_but_faces_need_vertices() {
        let mut scene = valid();
        scene.meshes.push(SceneMesh::new("helpers"));
        scene.nodes[1].meshes.push(1);
        validate_scene(&scene).unwrap();

        scene.meshes[1].faces.push(Face::triangle(0, 1, 2));
        assert_invalid(&scene);
    }

    #[test]
    fn attribute_length_mismatch() {
        let mut scene = valid();
        scene.meshes[0].normals = vec![Vec3::Z; 2];
        assert_invalid(&scene);
    }

    #[test]
    fn face_index_out_of_range() {
        let mut scene = valid();
        scene.meshes[0].faces.push(Face::triangle(0, 1, 3));
        assert_invalid(&scene);
    }

    #[test]
    fn material_out_of_range() {
        let mut scene = valid();
        scene.meshes[0].material_index = 1;
        assert_invalid(&scene);
    }

    #[test]
    fn node_mesh_out_of_range() {
        let mut scene = valid();
        scene.nodes[1].meshes.push(4);
        assert_invalid(&scene);
    }

    #[test]
    fn shared_child_is_not_a_tree() {
        let mut scene = valid();
        let extra = scene.add_node(Some(0), SceneNode::new("extra"));
        scene.nodes[extra].children.push(1);
        assert_invalid(&scene);
    }

    #[test]
    fn cycle_is_rejected() {
        let mut scene = valid();
        scene.nodes[1].children.push(0);
        assert_invalid(&scene);
    }

    #[test]
    fn unreachable_node_is_rejected() {
        let mut scene = valid();
        scene.nodes.push(SceneNode::new("floating"));
        assert_invalid(&scene);
    }

    #[test]
    fn channel_needs_target_and_finite_times() {
        let mut scene = valid();
        scene.animations.push(Default::default());
        scene.animations[0].channel_mut("child").position_keys.push(VectorKey {
            time: f64::NAN,
            value: Vec3::ZERO,
        });
        assert_invalid(&scene);

        scene.animations[0].channels[0].position_keys.clear();
        validate_scene(&scene).unwrap();
        scene.animations[0].channel_mut("");
        assert_invalid(&scene);
    }
}
