//! Arena-backed transform hierarchy
//!
//! Nodes live in one `Vec` owned by the [`NodeTree`]; children are owned
//! through the arena and the parent link is a plain index used only for
//! navigation. Every traversal runs on an explicit stack, so hierarchy depth
//! is bounded by memory rather than by the call stack.

use crate::AnimationKey;
use glam::Mat4;
use serde::Serialize;
use std::fmt;

/// Handle to a node inside a [`NodeTree`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Node {
    /// Lookup key for animation channels; not unique
    pub name: String,
    /// Parent-relative transform
    pub transform: Mat4,
    /// Indices into `Model::meshes`
    pub mesh_indices: Vec<u32>,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    pub translation_keys: Vec<AnimationKey>,
    pub rotation_keys: Vec<AnimationKey>,
    pub scaling_keys: Vec<AnimationKey>,
}

impl Node {
    pub fn new(name: impl Into<String>, transform: Mat4) -> Self {
        Self {
            name: name.into(),
            transform,
            mesh_indices: Vec::new(),
            parent: None,
            children: Vec::new(),
            translation_keys: Vec::new(),
            rotation_keys: Vec::new(),
            scaling_keys: Vec::new(),
        }
    }

    pub fn with_meshes(mut self, mesh_indices: Vec<u32>) -> Self {
        self.mesh_indices = mesh_indices;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_animated(&self) -> bool {
        !(self.translation_keys.is_empty()
            && self.rotation_keys.is_empty()
            && self.scaling_keys.is_empty())
    }
}

/// A tree of exclusively owned nodes with a single root
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NodeTree {
    nodes: Vec<Node>,
}

impl NodeTree {
    /// Start a tree from its root; any parent/children already set on
    /// `root` are cleared
    pub fn new(mut root: Node) -> Self {
        root.parent = None;
        root.children.clear();
        Self { nodes: vec![root] }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn root_node(&self) -> &Node {
        &self.nodes[0]
    }

    /// Number of nodes; never zero since the root always exists
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Append `node` as the last child of `parent`.
    ///
    /// # Panics
    /// If `parent` does not belong to this tree.
    pub fn add_child(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        assert!(parent.0 < self.nodes.len(), "parent {:?} not in tree", parent);
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        id
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0)
    }

    /// All nodes in creation order
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// Depth-first pre-order walk from the root
    pub fn pre_order(&self) -> PreOrder<'_> {
        self.pre_order_from(self.root())
    }

    pub fn pre_order_from(&self, start: NodeId) -> PreOrder<'_> {
        PreOrder {
            tree: self,
            stack: vec![(start, 0)],
        }
    }

    /// First node named `name` in depth-first pre-order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.pre_order()
            .map(|(id, _)| id)
            .find(|&id| self.nodes[id.0].name == name)
    }

    /// Number of edges between `id` and the root
    pub fn depth(&self, id: NodeId) -> usize {
        self.ancestors(id).count()
    }

    /// Parent, grandparent, ... up to and including the root
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        std::iter::successors(self.get(id).and_then(|n| n.parent), |p| {
            self.nodes[p.0].parent
        })
    }

    /// Model-space transform: every ancestor's local transform applied
    /// root-first, then this node's
    pub fn global_transform(&self, id: NodeId) -> Mat4 {
        let local = self.get(id).map_or(Mat4::IDENTITY, |n| n.transform);
        self.ancestors(id)
            .fold(local, |acc, p| self.nodes[p.0].transform * acc)
    }

    /// Indented one-line-per-node listing, see [`HierarchyDisplay`]
    pub fn display_hierarchy(&self) -> HierarchyDisplay<'_> {
        HierarchyDisplay { tree: self }
    }
}

/// Iterator over `(id, depth)` pairs in depth-first pre-order
pub struct PreOrder<'a> {
    tree: &'a NodeTree,
    stack: Vec<(NodeId, usize)>,
}

impl Iterator for PreOrder<'_> {
    type Item = (NodeId, usize);

    fn next(&mut self) -> Option<Self::Item> {
        let (id, depth) = self.stack.pop()?;
        let node = self.tree.get(id)?;
        self.stack
            .extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        Some((id, depth))
    }
}

/// Prints `Node name: <name> Trans: x,y,z Mesh: i j` per node, indented by
/// one space per level
pub struct HierarchyDisplay<'a> {
    tree: &'a NodeTree,
}

impl fmt::Display for HierarchyDisplay<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (id, depth) in self.tree.pre_order() {
            let node = &self.tree.nodes[id.0];
            let t = node.transform.w_axis;
            write!(
                f,
                "{:indent$}Node name: {} Trans: {},{},{} Mesh: ",
                "",
                node.name,
                t.x,
                t.y,
                t.z,
                indent = depth
            )?;
            for m in &node.mesh_indices {
                write!(f, "{} ", m)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
