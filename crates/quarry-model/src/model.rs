use crate::{Material, Mesh, Node, NodeId, NodeTree};
use quarry_core::Bounds;
use serde::Serialize;
use std::path::PathBuf;

/// An imported model: flat meshes and materials plus the node hierarchy
/// that places them
#[derive(Debug, Clone, Serialize)]
pub struct Model {
    /// Source path, kept for diagnostics
    pub filename: PathBuf,
    /// Order matches the source scene; node `mesh_indices` point here
    pub meshes: Vec<Mesh>,
    pub materials: Vec<Material>,
    pub nodes: NodeTree,
}

impl Model {
    pub fn root(&self) -> &Node {
        self.nodes.root_node()
    }

    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.nodes.find_by_name(name).and_then(|id| self.nodes.get(id))
    }

    pub fn find_node_id(&self, name: &str) -> Option<NodeId> {
        self.nodes.find_by_name(name)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(|m| m.vertices.len()).sum()
    }

    pub fn triangle_count(&self) -> usize {
        self.meshes.iter().map(Mesh::triangle_count).sum()
    }

    pub fn animated_node_count(&self) -> usize {
        self.nodes.iter().filter(|(_, n)| n.is_animated()).count()
    }

    /// Dimensions of this model in local coordinates: the union of every
    /// mesh's extents, ignoring node transforms
    pub fn local_extents(&self) -> Option<Bounds> {
        self.meshes
            .iter()
            .filter_map(Mesh::local_extents)
            .reduce(|a, b| a.union(&b))
    }

    /// Material a mesh refers to
    pub fn material_for(&self, mesh: &Mesh) -> Option<&Material> {
        self.materials.get(mesh.material_index)
    }
}
