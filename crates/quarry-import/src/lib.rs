//! Quarry Import - Model file import
//!
//! Reads glTF/GLB and Wavefront OBJ files (and, with the `assimp` feature,
//! FBX, Collada and the other Assimp formats) into a generic scene, runs the
//! fixed post-processing pipeline, and populates an owned
//! [`quarry_model::Model`].

pub mod animation;
#[cfg(feature = "assimp")]
mod assimp_reader;
mod config;
mod format;
mod gltf_reader;
mod importer;
mod obj_reader;
pub mod populate;
pub mod postprocess;
pub mod report;

#[cfg(feature = "assimp")]
pub use assimp_reader::AssimpReader;
pub use config::{ImportConfig, ReportConfig};
pub use format::{extension_of, SceneReader, DEFAULT_MATERIAL};
pub use gltf_reader::{GltfReader, SYNTHETIC_ROOT};
pub use importer::{load_from_file, Importer};
pub use obj_reader::ObjReader;
