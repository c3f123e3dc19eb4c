//! Quarry Scene - the generic source scene
//!
//! Every format reader produces a [`Scene`]; post-processing and model
//! population only ever look at this representation, never at a specific
//! file format. Node matrices are stored row-major.

mod animation;
mod material;
mod mesh;
mod scene;

pub use animation::{NodeChannel, QuatKey, SceneAnimation, VectorKey};
pub use material::{
    MaterialKey, MaterialProperty, PropertyValue, SceneMaterial, TextureKind, TextureMapping,
    TextureSlot,
};
pub use mesh::{Face, PrimitiveKind, SceneMesh};
pub use scene::{MetadataValue, Scene, SceneNode};
