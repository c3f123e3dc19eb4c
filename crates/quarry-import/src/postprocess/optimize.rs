use super::remove_meshes;
use log::debug;
use quarry_scene::{MaterialKey, Scene, SceneMaterial, SceneMesh};

/// Upper bound on the vertex count of a mesh produced by merging
pub const MAX_MERGED_VERTICES: usize = 1_000_000;

/// Materials equal in everything but their name
fn equivalent(a: &SceneMaterial, b: &SceneMaterial) -> bool {
    let props = |m: &SceneMaterial| {
        m.properties
            .iter()
            .filter(|p| p.key != MaterialKey::Name)
            .cloned()
            .collect::<Vec<_>>()
    };
    a.textures == b.textures && props(a) == props(b)
}

/// Merge equivalent materials into their first occurrence and remap mesh
/// material indices
pub fn remove_redundant_materials(scene: &mut Scene) {
    let before = scene.materials.len();
    let mut unique: Vec<SceneMaterial> = Vec::with_capacity(before);
    let mut remap = Vec::with_capacity(before);
    for material in scene.materials.drain(..) {
        match unique.iter().position(|u| equivalent(u, &material)) {
            Some(i) => remap.push(i),
            None => {
                remap.push(unique.len());
                unique.push(material);
            }
        }
    }
    scene.materials = unique;

    for mesh in &mut scene.meshes {
        if let Some(&new) = remap.get(mesh.material_index) {
            mesh.material_index = new;
        }
    }
    if scene.materials.len() != before {
        debug!("removed {} redundant materials", before - scene.materials.len());
    }
}

/// What two meshes must share to be merged
#[derive(Debug, Clone, PartialEq)]
struct Layout {
    material_index: usize,
    normals: bool,
    tangents: bool,
    uv_channels: Vec<bool>,
    color_channels: Vec<bool>,
}

impl Layout {
    fn of(mesh: &SceneMesh) -> Self {
        Self {
            material_index: mesh.material_index,
            normals: mesh.has_normals(),
            tangents: mesh.has_tangents(),
            uv_channels: mesh.tex_coords.iter().map(|c| !c.is_empty()).collect(),
            color_channels: mesh.colors.iter().map(|c| !c.is_empty()).collect(),
        }
    }
}

/// Append `source` to `target`, offsetting its face indices
fn append_mesh(target: &mut SceneMesh, source: SceneMesh) {
    let offset = target.positions.len() as u32;
    target.positions.extend(source.positions);
    target.normals.extend(source.normals);
    target.tangents.extend(source.tangents);
    for (dst, src) in target.tex_coords.iter_mut().zip(source.tex_coords) {
        dst.extend(src);
    }
    for (dst, src) in target.colors.iter_mut().zip(source.colors) {
        dst.extend(src);
    }
    target.faces.extend(source.faces.into_iter().map(|mut f| {
        for i in &mut f.indices {
            *i += offset;
        }
        f
    }));
}

/// Merge meshes that only one node references, within that node, when they
/// share a material and attribute layout. Skinned meshes stay separate.
pub fn optimize_meshes(scene: &mut Scene) {
    let mut refs = vec![0usize; scene.meshes.len()];
    for node in &scene.nodes {
        for &m in &node.meshes {
            if let Some(count) = refs.get_mut(m as usize) {
                *count += 1;
            }
        }
    }

    let mut keep = vec![true; scene.meshes.len()];
    for node_idx in 0..scene.nodes.len() {
        let mut kept_refs = Vec::with_capacity(scene.nodes[node_idx].meshes.len());
        let mut targets: Vec<(Layout, u32)> = Vec::new();
        for m in scene.nodes[node_idx].meshes.clone() {
            let mesh = &scene.meshes[m as usize];
            if refs[m as usize] != 1 || mesh.has_bones() {
                kept_refs.push(m);
                continue;
            }
            let layout = Layout::of(mesh);
            let count = mesh.vertex_count();
            let target = targets.iter().find(|(l, t)| {
                *l == layout
                    && scene.meshes[*t as usize].vertex_count() + count <= MAX_MERGED_VERTICES
            });
            match target {
                Some(&(_, t)) => {
                    let source = std::mem::take(&mut scene.meshes[m as usize]);
                    append_mesh(&mut scene.meshes[t as usize], source);
                    keep[m as usize] = false;
                }
                None => {
                    targets.push((layout, m));
                    kept_refs.push(m);
                }
            }
        }
        scene.nodes[node_idx].meshes = kept_refs;
    }

    let merged = keep.iter().filter(|k| !**k).count();
    if merged > 0 {
        debug!("merged {} meshes into their siblings", merged);
        remove_meshes(scene, &keep);
    }
}
