//! Fixed post-processing pipeline
//!
//! Every import runs the same steps in the same order on the generic scene
//! before population. The list is not configurable.

mod optimize;
mod triangulate;
mod uv;
mod validate;
mod vertices;

pub use optimize::{optimize_meshes, remove_redundant_materials};
pub use triangulate::{sort_by_primitive_type, triangulate};
pub use uv::gen_uv_coords;
pub use validate::validate_scene;
pub use vertices::{gen_smooth_normals, join_identical_vertices};

use log::debug;
use quarry_core::math::scale_row_major;
use quarry_core::Result;
use quarry_scene::Scene;
use std::path::Path;

/// Uniform scale applied to files authored in centimetres
pub const CENTIMETRE_SCALE: f32 = 0.01;

/// File-name fragments that mark a centimetre-scale source
pub const CENTIMETRE_MARKERS: &[&str] = &[".fbx"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ValidateDataStructure,
    Triangulate,
    SortByPrimitiveType,
    GenUvCoords,
    JoinIdenticalVertices,
    GenSmoothNormals,
    RemoveRedundantMaterials,
    OptimizeMeshes,
    GlobalScale,
}

/// The steps every import runs, in order
pub const IMPORT_STEPS: [Step; 9] = [
    Step::ValidateDataStructure,
    Step::Triangulate,
    Step::SortByPrimitiveType,
    Step::GenUvCoords,
    Step::JoinIdenticalVertices,
    Step::GenSmoothNormals,
    Step::RemoveRedundantMaterials,
    Step::OptimizeMeshes,
    Step::GlobalScale,
];

impl Step {
    pub fn name(self) -> &'static str {
        match self {
            Step::ValidateDataStructure => "validate",
            Step::Triangulate => "triangulate",
            Step::SortByPrimitiveType => "sort by primitive type",
            Step::GenUvCoords => "generate uv coordinates",
            Step::JoinIdenticalVertices => "join identical vertices",
            Step::GenSmoothNormals => "generate smooth normals",
            Step::RemoveRedundantMaterials => "remove redundant materials",
            Step::OptimizeMeshes => "optimize meshes",
            Step::GlobalScale => "global scale",
        }
    }
}

/// Run [`IMPORT_STEPS`] on `scene`. `path` is the source file name, which
/// decides the global scale.
pub fn run(scene: &mut Scene, path: &Path) -> Result<()> {
    for step in IMPORT_STEPS {
        debug!("post-process: {}", step.name());
        apply(step, scene, path)?;
    }
    Ok(())
}

fn apply(step: Step, scene: &mut Scene, path: &Path) -> Result<()> {
    match step {
        Step::ValidateDataStructure => validate_scene(scene)?,
        Step::Triangulate => triangulate(scene),
        Step::SortByPrimitiveType => sort_by_primitive_type(scene),
        Step::GenUvCoords => gen_uv_coords(scene),
        Step::JoinIdenticalVertices => join_identical_vertices(scene),
        Step::GenSmoothNormals => gen_smooth_normals(scene),
        Step::RemoveRedundantMaterials => remove_redundant_materials(scene),
        Step::OptimizeMeshes => optimize_meshes(scene),
        Step::GlobalScale => {
            if let Some(factor) = unit_scale_for(path) {
                apply_global_scale(scene, factor);
            }
        }
    }
    Ok(())
}

/// Scale correction for `path`, if its name marks a centimetre source
pub fn unit_scale_for(path: &Path) -> Option<f32> {
    let name = path.to_string_lossy().to_ascii_lowercase();
    CENTIMETRE_MARKERS
        .iter()
        .any(|marker| name.contains(marker))
        .then_some(CENTIMETRE_SCALE)
}

/// Scale the root transform uniformly
pub fn apply_global_scale(scene: &mut Scene, factor: f32) {
    if let Some(root) = scene.root.and_then(|r| scene.nodes.get_mut(r)) {
        scale_row_major(&mut root.transformation, factor);
        debug!("root '{}' scaled by {}", root.name, factor);
    }
}

/// Drop the meshes whose `keep` flag is false and remap every node's mesh
/// references. References to dropped meshes disappear.
pub(crate) fn remove_meshes(scene: &mut Scene, keep: &[bool]) {
    let mut remap = Vec::with_capacity(scene.meshes.len());
    let mut next = 0u32;
    for &k in keep {
        remap.push(k.then(|| {
            next += 1;
            next - 1
        }));
    }

    let mut flags = keep.iter();
    scene.meshes.retain(|_| flags.next().copied().unwrap_or(true));
    for node in &mut scene.nodes {
        node.meshes = node
            .meshes
            .iter()
            .filter_map(|&m| remap.get(m as usize).copied().flatten())
            .collect();
    }
}

#[cfg(test)]
pub(crate) mod test_util {
    use glam::Vec3;
    use quarry_scene::{Face, SceneMaterial, SceneMesh};

    /// Unit square in the XY plane as one quad face
    pub fn quad(name: &str) -> SceneMesh {
        let mut mesh = SceneMesh::new(name);
        mesh.positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        mesh.faces = vec![Face::new(vec![0, 1, 2, 3])];
        mesh
    }

    pub fn triangle(name: &str) -> SceneMesh {
        let mut mesh = SceneMesh::new(name);
        mesh.positions = vec![Vec3::ZERO, Vec3::X, Vec3::Y];
        mesh.faces = vec![Face::triangle(0, 1, 2)];
        mesh
    }

    pub fn plain_material() -> SceneMaterial {
        SceneMaterial::new()
    }
}

#[cfg(test)]
mod tests {
    use super::test_util::*;
    use super::*;
    use quarry_core::math::ROW_MAJOR_IDENTITY;
    use quarry_scene::SceneNode;

    fn scene() -> Scene {
        let mut scene = Scene::new();
        scene.materials.push(plain_material());
        scene.meshes.push(quad("floor"));
        scene.meshes.push(triangle("sail"));
        let root = scene.add_node(None, SceneNode::new("root"));
        scene.add_node(Some(root), SceneNode::new("boat").with_meshes(vec![0, 1]));
        scene
    }

    #[test]
    fn fbx_marker_scales_root() {
        assert_eq!(unit_scale_for(Path::new("assets/ship.fbx")), Some(0.01));
        assert_eq!(unit_scale_for(Path::new("assets/ship.FBX.gltf")), Some(0.01));
        assert_eq!(unit_scale_for(Path::new("assets/ship.gltf")), None);

        let mut s = scene();
        run(&mut s, Path::new("ship.fbx.obj")).unwrap();
        let m = s.root_node().unwrap().transformation;
        assert_eq!(m[0][0], 0.01);
        assert_eq!(m[2][2], 0.01);
        assert_eq!(m[3][3], 1.0);
    }

    #[test]
    fn other_files_keep_root_transform() {
        let mut s = scene();
        run(&mut s, Path::new("ship.obj")).unwrap();
        assert_eq!(s.root_node().unwrap().transformation, ROW_MAJOR_IDENTITY);
    }

    #[test]
    fn pipeline_leaves_only_triangles() {
        let mut s = scene();
        run(&mut s, Path::new("ship.obj")).unwrap();
        for mesh in &s.meshes {
            assert!(mesh.faces.iter().all(|f| f.indices.len() == 3));
            assert_eq!(mesh.normals.len(), mesh.positions.len());
        }
    }

    #[test]
    fn remove_meshes_remaps_nodes() {
        let mut s = scene();
        s.meshes.push(triangle("flag"));
        s.nodes[1].meshes = vec![0, 1, 2];
        remove_meshes(&mut s, &[true, false, true]);

        assert_eq!(s.meshes.len(), 2);
        assert_eq!(s.meshes[1].name, "flag");
        assert_eq!(s.nodes[1].meshes, vec![0, 1]);
    }

    #[test]
    fn step_order_is_fixed() {
        assert_eq!(IMPORT_STEPS[0], Step::ValidateDataStructure);
        assert_eq!(IMPORT_STEPS[8], Step::GlobalScale);
        assert_eq!(Step::GenSmoothNormals.name(), "generate smooth normals");
    }
}
