use glam::Vec3;
use log::debug;
use quarry_scene::{Scene, SceneMesh};
use std::collections::HashMap;

fn pick<T: Copy>(src: &[T], kept: &[usize]) -> Vec<T> {
    if src.is_empty() {
        Vec::new()
    } else {
        kept.iter().map(|&i| src[i]).collect()
    }
}

/// Keep the vertices listed in `kept` (old indices, in new order) and
/// rewrite face indices through `remap` (old index to new index)
fn rebuild(mesh: &mut SceneMesh, kept: &[usize], remap: &[u32]) {
    mesh.positions = pick(&mesh.positions, kept);
    mesh.normals = pick(&mesh.normals, kept);
    mesh.tangents = pick(&mesh.tangents, kept);
    for channel in &mut mesh.tex_coords {
        *channel = pick(channel, kept);
    }
    for channel in &mut mesh.colors {
        *channel = pick(channel, kept);
    }
    for face in &mut mesh.faces {
        for index in &mut face.indices {
            *index = remap[*index as usize];
        }
    }
}

/// Drop vertices no face references
pub(crate) fn compact_vertices(mesh: &mut SceneMesh) {
    let mut used = vec![false; mesh.vertex_count()];
    for face in &mesh.faces {
        for &i in &face.indices {
            used[i as usize] = true;
        }
    }
    if used.iter().all(|&u| u) {
        return;
    }

    let mut kept = Vec::new();
    let mut remap = vec![u32::MAX; used.len()];
    for (old, _) in used.iter().enumerate().filter(|(_, &u)| u) {
        remap[old] = kept.len() as u32;
        kept.push(old);
    }
    rebuild(mesh, &kept, &remap);
}

/// Bit pattern of every attribute of vertex `i`
fn vertex_key(mesh: &SceneMesh, i: usize) -> Vec<u32> {
    let mut key = Vec::with_capacity(16);
    key.extend(mesh.positions[i].to_array().map(f32::to_bits));
    if let Some(n) = mesh.normals.get(i) {
        key.extend(n.to_array().map(f32::to_bits));
    }
    if let Some(t) = mesh.tangents.get(i) {
        key.extend(t.to_array().map(f32::to_bits));
    }
    for channel in &mesh.tex_coords {
        if let Some(uv) = channel.get(i) {
            key.extend(uv.to_array().map(f32::to_bits));
        }
    }
    for channel in &mesh.colors {
        if let Some(c) = channel.get(i) {
            key.extend(c.to_array().map(f32::to_bits));
        }
    }
    key
}

/// Merge vertices whose attributes are bit-identical
pub fn join_identical_vertices(scene: &mut Scene) {
    let mut before = 0usize;
    let mut after = 0usize;
    for mesh in &mut scene.meshes {
        let count = mesh.vertex_count();
        let mut seen: HashMap<Vec<u32>, u32> = HashMap::with_capacity(count);
        let mut kept = Vec::with_capacity(count);
        let mut remap = Vec::with_capacity(count);
        for i in 0..count {
            let next = kept.len() as u32;
            let idx = *seen.entry(vertex_key(mesh, i)).or_insert(next);
            if idx == next {
                kept.push(i);
            }
            remap.push(idx);
        }
        before += count;
        after += kept.len();
        if kept.len() != count {
            rebuild(mesh, &kept, &remap);
        }
    }
    if after != before {
        debug!("joined identical vertices: {} -> {}", before, after);
    }
}

/// Give normal-less meshes smooth normals: face normals weighted by face
/// area, summed over every vertex at the same position
pub fn gen_smooth_normals(scene: &mut Scene) {
    for mesh in scene.meshes.iter_mut().filter(|m| !m.has_normals()) {
        let key = |p: Vec3| p.to_array().map(f32::to_bits);
        let mut sums: HashMap<[u32; 3], Vec3> = HashMap::new();
        for face in mesh.faces.iter().filter(|f| f.indices.len() == 3) {
            let [a, b, c] = [0, 1, 2].map(|k| mesh.positions[face.indices[k] as usize]);
            // cross product length is twice the triangle area
            let weighted = (b - a).cross(c - a);
            for p in [a, b, c] {
                *sums.entry(key(p)).or_insert(Vec3::ZERO) += weighted;
            }
        }
        mesh.normals = mesh
            .positions
            .iter()
            .map(|&p| {
                sums.get(&key(p))
                    .copied()
                    .unwrap_or(Vec3::ZERO)
                    .normalize_or_zero()
            })
            .collect();
        debug!("generated smooth normals for '{}'", mesh.name);
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_util::*;
    use super::*;
    use glam::Vec2;
    use quarry_scene::Face;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn duplicates_are_joined() {
        let mut scene = Scene::new();
        let mut mesh = triangle("t");
        // second triangle repeats vertices 0 and 2 as new entries
        mesh.positions.extend([Vec3::ZERO, Vec3::Y, Vec3::new(1.0, 1.0, 0.0)]);
        mesh.faces.push(Face::triangle(3, 5, 4));
        scene.meshes.push(mesh);

        join_identical_vertices(&mut scene);
        let mesh = &scene.meshes[0];
        assert_eq!(mesh.positions.len(), 4);
        assert_eq!(mesh.faces[1].indices, vec![0, 3, 2]);
    }

    #[test]
    fn differing_uvs_keep_vertices_apart() {
        let mut scene = Scene::new();
        let mut mesh = triangle("t");
        mesh.positions.push(Vec3::ZERO);
        mesh.tex_coords = vec![vec![Vec2::ZERO, Vec2::X, Vec2::Y, Vec2::ONE]];
        mesh.faces.push(Face::triangle(3, 1, 2));
        scene.meshes.push(mesh);

        join_identical_vertices(&mut scene);
        assert_eq!(scene.meshes[0].positions.len(), 4);
    }

    #[test]
    fn compact_keeps_attribute_streams_parallel() {
        let mut mesh = triangle("t");
        mesh.positions.insert(0, Vec3::splat(5.0));
        mesh.normals = vec![Vec3::X, Vec3::Z, Vec3::Z, Vec3::Z];
        mesh.faces = vec![Face::triangle(1, 2, 3)];
        compact_vertices(&mut mesh);

        assert_eq!(mesh.positions, vec![Vec3::ZERO, Vec3::X, Vec3::Y]);
        assert_eq!(mesh.normals, vec![Vec3::Z; 3]);
        assert_eq!(mesh.faces[0].indices, vec![0, 1, 2]);
    }

    #[test]
    fn flat_triangle_gets_face_normal() {
        let mut scene = Scene::new();
        scene.meshes.push(triangle("t"));
        gen_smooth_normals(&mut scene);
        assert!(scene.meshes[0].normals.iter().all(|&n| approx(n, Vec3::Z)));
    }

    #[test]
    fn shared_positions_average_across_faces() {
        // two triangles folded along the X axis: one facing +Z, one facing +Y
        let mut mesh = SceneMesh::new("fold");
        mesh.positions = vec![
            Vec3::ZERO,
            Vec3::X,
            Vec3::Y,
            Vec3::ZERO,
            Vec3::NEG_Z,
            Vec3::X,
        ];
        mesh.faces = vec![Face::triangle(0, 1, 2), Face::triangle(3, 5, 4)];
        let mut scene = Scene::new();
        scene.meshes.push(mesh);
        gen_smooth_normals(&mut scene);

        let normals = &scene.meshes[0].normals;
        let blended = Vec3::new(0.0, 1.0, 1.0).normalize();
        assert!(approx(normals[0], blended));
        assert!(approx(normals[3], blended));
        assert!(approx(normals[2], Vec3::Z));
        assert!(approx(normals[4], Vec3::Y));
    }

    #[test]
    fn existing_normals_are_kept() {
        let mut scene = Scene::new();
        let mut mesh = triangle("t");
        mesh.normals = vec![Vec3::X; 3];
        scene.meshes.push(mesh);
        gen_smooth_normals(&mut scene);
        assert_eq!(scene.meshes[0].normals, vec![Vec3::X; 3]);
    }
}
