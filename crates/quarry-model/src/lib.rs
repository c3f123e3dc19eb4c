//! Quarry Model - the application-owned result of an import
//!
//! A [`Model`] owns flat lists of [`Mesh`] parts and [`Material`]s plus a
//! [`NodeTree`] whose nodes reference meshes by index and carry optional
//! animation keys.

mod animation;
mod material;
mod mesh;
mod model;
mod node;

pub use animation::AnimationKey;
pub use material::Material;
pub use mesh::{Mesh, VertexAttribute};
pub use model::Model;
pub use node::{HierarchyDisplay, Node, NodeId, NodeTree, PreOrder};
