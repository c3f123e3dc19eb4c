//! Node animation extraction

use log::{debug, warn};
use quarry_core::math::quat_to_euler;
use quarry_model::{AnimationKey, Model};
use quarry_scene::Scene;

/// Copy every node channel of every animation onto the model node with the
/// same name. Rotations are stored as Euler angles.
///
/// Channels whose node cannot be found are skipped with a warning; the
/// number skipped is returned.
pub fn attach_animations(scene: &Scene, model: &mut Model) -> usize {
    let mut skipped = 0;
    for anim in &scene.animations {
        if anim.mesh_channel_count > 0 {
            debug!(
                "Ignoring: {} mesh animation channel(s) in '{}'",
                anim.mesh_channel_count, anim.name
            );
        }
        for channel in &anim.channels {
            let node = model
                .nodes
                .find_by_name(&channel.node_name)
                .and_then(|id| model.nodes.get_mut(id));
            let Some(node) = node else {
                warn!(
                    "Animation '{}': no node named '{}' in {}, channel skipped",
                    anim.name,
                    channel.node_name,
                    model.filename.display()
                );
                skipped += 1;
                continue;
            };

            node.translation_keys.extend(
                channel
                    .position_keys
                    .iter()
                    .map(|k| AnimationKey::new(k.time as f32, k.value)),
            );
            node.rotation_keys.extend(
                channel
                    .rotation_keys
                    .iter()
                    .map(|k| AnimationKey::new(k.time as f32, quat_to_euler(k.value))),
            );
            node.scaling_keys.extend(
                channel
                    .scaling_keys
                    .iter()
                    .map(|k| AnimationKey::new(k.time as f32, k.value)),
            );
        }
    }
    skipped
}
