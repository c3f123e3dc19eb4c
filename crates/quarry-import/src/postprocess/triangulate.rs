use super::remove_meshes;
use super::vertices::compact_vertices;
use log::debug;
use quarry_scene::{Face, PrimitiveKind, Scene};

/// Fan-triangulate every face with more than three indices
pub fn triangulate(scene: &mut Scene) {
    let mut split = 0usize;
    for mesh in &mut scene.meshes {
        if !mesh.has_primitive(PrimitiveKind::Polygon) {
            continue;
        }
        let mut faces = Vec::with_capacity(mesh.faces.len());
        for face in mesh.faces.drain(..) {
            if face.kind() != PrimitiveKind::Polygon {
                faces.push(face);
                continue;
            }
            split += 1;
            let hub = face.indices[0];
            faces.extend(
                face.indices[1..]
                    .windows(2)
                    .map(|w| Face::triangle(hub, w[0], w[1])),
            );
        }
        mesh.faces = faces;
    }
    if split > 0 {
        debug!("triangulated {} polygons", split);
    }
}

/// Remove point and line faces, then any mesh left without faces.
///
/// Vertices only used by removed faces are dropped as well.
pub fn sort_by_primitive_type(scene: &mut Scene) {
    let mut removed_faces = 0usize;
    for mesh in &mut scene.meshes {
        let before = mesh.faces.len();
        mesh.faces.retain(|f| {
            matches!(f.kind(), PrimitiveKind::Triangle | PrimitiveKind::Polygon)
        });
        if mesh.faces.len() != before {
            removed_faces += before - mesh.faces.len();
            compact_vertices(mesh);
        }
    }

    let keep: Vec<bool> = scene.meshes.iter().map(|m| !m.faces.is_empty()).collect();
    let dropped = keep.iter().filter(|k| !**k).count();
    if removed_faces > 0 || dropped > 0 {
        debug!(
            "removed {} point/line faces and {} meshes left empty",
            removed_faces, dropped
        );
    }
    if dropped > 0 {
        remove_meshes(scene, &keep);
    }
}
