//! Debug-level reporting of what an import kept and dropped

use crate::config::ReportConfig;
use log::{debug, log_enabled, Level};
use quarry_model::Model;
use quarry_scene::{Scene, TextureKind};

/// One line per piece of scene data the model does not carry
pub fn ignored_data(scene: &Scene) -> Vec<String> {
    let mut lines = Vec::new();
    if scene.camera_count > 0 {
        lines.push(format!("{} camera(s)", scene.camera_count));
    }
    if scene.light_count > 0 {
        lines.push(format!("{} light(s)", scene.light_count));
    }

    for (i, mesh) in scene.meshes.iter().enumerate() {
        let label = format!("mesh {} '{}'", i, mesh.name);
        if mesh.has_bones() {
            lines.push(format!("{}: {} bone(s)", label, mesh.bone_count));
        }
        if mesh.color_channel_count() > 0 {
            lines.push(format!("{}: {} colour channel(s)", label, mesh.color_channel_count()));
        }
        if mesh.uv_channel_count() > 1 {
            lines.push(format!("{}: {} extra uv channel(s)", label, mesh.uv_channel_count() - 1));
        }
        if mesh.has_tangents() {
            lines.push(format!("{}: tangents", label));
        }
    }

    for anim in &scene.animations {
        if anim.mesh_channel_count > 0 {
            lines.push(format!(
                "animation '{}': {} mesh channel(s)",
                anim.name, anim.mesh_channel_count
            ));
        }
    }

    for (i, material) in scene.materials.iter().enumerate() {
        for slot in &material.textures {
            let kept = slot.index == 0
                && matches!(slot.kind, TextureKind::Diffuse | TextureKind::Specular);
            if !kept {
                lines.push(format!(
                    "material {} '{}': {:?} texture {} '{}'",
                    i,
                    material.name().unwrap_or_default(),
                    slot.kind,
                    slot.index,
                    slot.path
                ));
            }
        }
    }
    lines
}

/// Scene metadata as `key: value` lines
pub fn metadata(scene: &Scene) -> Vec<String> {
    scene
        .metadata
        .iter()
        .map(|(key, value)| format!("{}: {}", key, value))
        .collect()
}

/// Log the reports `config` enables
pub fn log_reports(config: &ReportConfig, scene: &Scene, model: &Model) {
    if !log_enabled!(Level::Debug) {
        return;
    }
    if config.ignored {
        for line in ignored_data(scene) {
            debug!("Ignoring: {}", line);
        }
    }
    if config.metadata {
        for line in metadata(scene) {
            debug!("Metadata: {}", line);
        }
    }
    if config.hierarchy {
        debug!("Hierarchy of {}:\n{}", model.filename.display(), model.nodes.display_hierarchy());
    }
}
