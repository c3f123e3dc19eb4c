use glam::Vec3;
use serde::Serialize;

/// A (time, value) sample on one animated channel of a node.
///
/// Time stays in the source's native ticks. Rotation keys hold Euler angles
/// in radians (x roll, y pitch, z yaw).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AnimationKey {
    pub time: f32,
    pub value: Vec3,
}

impl AnimationKey {
    pub fn new(time: f32, value: Vec3) -> Self {
        Self { time, value }
    }
}
