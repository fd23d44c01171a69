use crowd_core::{Transform, Vec3};
use crowd_graph::OutputChannel;

/// What one brain evaluation asks the simulation to do with its agent.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BrainOutputs {
    /// Per-frame translation in the agent's local frame.
    pub translation: Vec3,
    /// Rotation delta in degrees.
    pub rotation: Vec3,
    pub animation: Option<u32>,
    /// Blackboard writes in plan order; the simulation stages them.
    pub writes: Vec<(String, f32)>,
}

impl BrainOutputs {
    pub(crate) fn emit(&mut self, channel: OutputChannel, value: f32) {
        match channel {
            OutputChannel::Px => self.translation.x += value,
            OutputChannel::Py => self.translation.y += value,
            OutputChannel::Pz => self.translation.z += value,
            OutputChannel::Rx => self.rotation.x += value,
            OutputChannel::Ry => self.rotation.y += value,
            OutputChannel::Rz => self.rotation.z += value,
            OutputChannel::Animation => self.animation = Some(value.max(0.0).round() as u32),
        }
    }

    /// Rotate first, then move along the new heading.
    pub fn apply(&self, transform: &mut Transform) {
        transform.rotation += self.rotation;
        transform.translate_local(self.translation);
    }

    pub fn is_idle(&self) -> bool {
        self.translation == Vec3::ZERO
            && self.rotation == Vec3::ZERO
            && self.animation.is_none()
            && self.writes.is_empty()
    }
}
