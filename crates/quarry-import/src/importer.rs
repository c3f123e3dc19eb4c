//! The model importer: read, post-process, populate

use crate::config::ImportConfig;
#[cfg(feature = "assimp")]
use crate::assimp_reader::AssimpReader;
use crate::format::{extension_of, looks_like_fbx, SceneReader, ASSIMP_EXTENSIONS};
use crate::gltf_reader::GltfReader;
use crate::obj_reader::ObjReader;
use crate::{populate, postprocess, report};
use log::{error, info};
use quarry_core::{QuarryError, Result};
use quarry_model::Model;
use quarry_scene::Scene;
use std::path::Path;

/// Bytes inspected when sniffing a file's format
const SNIFF_LEN: usize = 4096;

/// Turns model files into [`Model`]s using a set of format readers
pub struct Importer {
    readers: Vec<Box<dyn SceneReader>>,
    config: ImportConfig,
}

impl Default for Importer {
    fn default() -> Self {
        Self::with_config(ImportConfig::default())
    }
}

impl Importer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Importer with the built-in glTF and OBJ readers, plus the Assimp
    /// reader when the `assimp` feature is enabled
    pub fn with_config(config: ImportConfig) -> Self {
        #[allow(unused_mut)]
        let mut readers: Vec<Box<dyn SceneReader>> = vec![Box::new(GltfReader), Box::new(ObjReader)];
        #[cfg(feature = "assimp")]
        readers.push(Box::new(AssimpReader));
        Self { readers, config }
    }

    /// Add a reader; it is consulted after the ones already registered
    pub fn register(&mut self, reader: Box<dyn SceneReader>) {
        self.readers.push(reader);
    }

    pub fn config(&self) -> &ImportConfig {
        &self.config
    }

    /// Pick a reader by content first, then by extension
    pub fn select_reader(&self, path: &Path, head: &[u8]) -> Result<&dyn SceneReader> {
        if let Some(reader) = self.readers.iter().find(|r| r.can_read(head)) {
            return Ok(reader.as_ref());
        }
        let ext = extension_of(path);
        self.readers
            .iter()
            .find(|r| r.extensions().contains(&ext.as_str()))
            .map(|r| r.as_ref())
            .ok_or_else(|| {
                let hint = if looks_like_fbx(head) || ASSIMP_EXTENSIONS.contains(&ext.as_str()) {
                    " (this format needs the `assimp` feature)"
                } else {
                    ""
                };
                QuarryError::UnsupportedFormat(format!(
                    "{}: no reader recognises the contents or the '.{}' extension{}",
                    path.display(),
                    ext,
                    hint
                ))
            })
    }

    /// Read and post-process a file into a generic scene
    pub fn read_scene(&self, path: &Path) -> Result<Scene> {
        if !path.is_file() {
            return Err(QuarryError::FileNotFound(path.to_path_buf()));
        }
        let bytes = std::fs::read(path)?;
        let head = &bytes[..bytes.len().min(SNIFF_LEN)];
        let reader = self.select_reader(path, head)?;

        let mut scene = reader.read(path, &bytes)?;
        postprocess::run(&mut scene, path)?;
        Ok(scene)
    }

    /// Import `path` into an owned model.
    ///
    /// Failures are logged with the file name before being returned; a
    /// failed import yields no partial model.
    pub fn load_from_file(&self, path: impl AsRef<Path>) -> Result<Model> {
        let path = path.as_ref();
        let result = self.read_scene(path).and_then(|scene| {
            let model = populate::build_model(&scene, path)?;
            report::log_reports(&self.config.report, &scene, &model);
            Ok(model)
        });

        match &result {
            Ok(model) => info!(
                "Imported {}: {} meshes, {} materials, {} nodes, {} animated",
                path.display(),
                model.meshes.len(),
                model.materials.len(),
                model.nodes.len(),
                model.animated_node_count()
            ),
            Err(e) => error!("Failed to import {}: {}", path.display(), e),
        }
        result
    }
}

/// Import `path` with the default readers and configuration
pub fn load_from_file(path: impl AsRef<Path>) -> Result<Model> {
    Importer::default().load_from_file(path)
}
