//! The scene container and its node hierarchy

use crate::{SceneAnimation, SceneMaterial, SceneMesh};
use glam::Vec3;
use quarry_core::math::{RowMajorMatrix, ROW_MAJOR_IDENTITY};
use std::fmt;

/// A node of the source hierarchy. Children are indices into `Scene::nodes`.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: String,
    /// Parent-relative transform, row-major
    pub transformation: RowMajorMatrix,
    /// Indices into `Scene::meshes`
    pub meshes: Vec<u32>,
    pub children: Vec<usize>,
}

impl SceneNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            transformation: ROW_MAJOR_IDENTITY,
            meshes: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn with_meshes(mut self, meshes: Vec<u32>) -> Self {
        self.meshes = meshes;
        self
    }

    pub fn with_transformation(mut self, transformation: RowMajorMatrix) -> Self {
        self.transformation = transformation;
        self
    }
}

/// A typed scene metadata entry
#[derive(Debug, Clone, PartialEq)]
pub enum MetadataValue {
    Bool(bool),
    Int32(i32),
    UInt64(u64),
    Float(f32),
    Double(f64),
    String(String),
    Vector3(Vec3),
}

impl fmt::Display for MetadataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataValue::Bool(v) => write!(f, "{}", v),
            MetadataValue::Int32(v) => write!(f, "{}", v),
            MetadataValue::UInt64(v) => write!(f, "{}", v),
            MetadataValue::Float(v) => write!(f, "{}", v),
            MetadataValue::Double(v) => write!(f, "{}", v),
            MetadataValue::String(v) => write!(f, "{}", v),
            MetadataValue::Vector3(v) => write!(f, "{}, {}, {}", v.x, v.y, v.z),
        }
    }
}

/// A whole file as read by a format reader
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub meshes: Vec<SceneMesh>,
    pub materials: Vec<SceneMaterial>,
    /// Node arena; `root` indexes into it
    pub nodes: Vec<SceneNode>,
    pub root: Option<usize>,
    pub animations: Vec<SceneAnimation>,
    pub camera_count: usize,
    pub light_count: usize,
    pub metadata: Vec<(String, MetadataValue)>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_meshes(&self) -> bool {
        !self.meshes.is_empty()
    }

    pub fn has_materials(&self) -> bool {
        !self.materials.is_empty()
    }

    pub fn has_animations(&self) -> bool {
        !self.animations.is_empty()
    }

    pub fn root_node(&self) -> Option<&SceneNode> {
        self.root.and_then(|idx| self.nodes.get(idx))
    }

    /// Append a node, linking it under `parent` or making it the root
    pub fn add_node(&mut self, parent: Option<usize>, node: SceneNode) -> usize {
        let idx = self.nodes.len();
        self.nodes.push(node);
        match parent {
            Some(p) => self.nodes[p].children.push(idx),
            None => self.root = Some(idx),
        }
        idx
    }

    /// Node indices reachable from the root in depth-first pre-order.
    ///
    /// Child indices outside the arena are skipped.
    pub fn pre_order(&self) -> Vec<usize> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<usize> = self.root.into_iter().collect();
        while let Some(idx) = stack.pop() {
            let Some(node) = self.nodes.get(idx) else {
                continue;
            };
            order.push(idx);
            stack.extend(node.children.iter().rev());
        }
        order
    }
}
