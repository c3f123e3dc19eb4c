//! Node animation tracks

use glam::{Quat, Vec3};

/// A keyed vector sample; time is in the animation's ticks
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VectorKey {
    pub time: f64,
    pub value: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuatKey {
    pub time: f64,
    pub value: Quat,
}

/// All keys an animation holds for one node, addressed by node name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeChannel {
    pub node_name: String,
    pub position_keys: Vec<VectorKey>,
    pub rotation_keys: Vec<QuatKey>,
    pub scaling_keys: Vec<VectorKey>,
}

impl NodeChannel {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            node_name: node_name.into(),
            ..Default::default()
        }
    }

    pub fn key_count(&self) -> usize {
        self.position_keys.len() + self.rotation_keys.len() + self.scaling_keys.len()
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SceneAnimation {
    pub name: String,
    pub duration: f64,
    pub ticks_per_second: f64,
    pub channels: Vec<NodeChannel>,
    /// Morph/vertex animation channels, counted but not carried
    pub mesh_channel_count: usize,
}

impl SceneAnimation {
    /// Channel for `node_name`, created on first use
    pub fn channel_mut(&mut self, node_name: &str) -> &mut NodeChannel {
        let pos = match self.channels.iter().position(|c| c.node_name == node_name) {
            Some(pos) => pos,
            None => {
                self.channels.push(NodeChannel::new(node_name));
                self.channels.len() - 1
            }
        };
        &mut self.channels[pos]
    }
}
